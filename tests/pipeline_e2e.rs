// tests/pipeline_e2e.rs
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use citeflag::config::options::AppOptions;
use citeflag::engine::Classifier;
use citeflag::progress::Transcript;
use citeflag::store::load_dataset;
use citeflag::{runner, specs, Error};
use pretty_assertions::assert_eq;

const HEADER: &str = "hash_id,narrative\n";

fn workspace(history: &str, upstream: &str) -> (tempfile::TempDir, AppOptions) {
    let dir = tempfile::tempdir().unwrap();
    let opts = {
        let mut o = AppOptions::default();
        o.paths.set_root(dir.path());
        o
    };
    for (path, body) in [(opts.paths.history(), history), (opts.paths.upstream(), upstream)] {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("{HEADER}{body}")).unwrap();
    }
    (dir, opts)
}

fn all_domains() -> Vec<Classifier> {
    let domains: Vec<String> = specs::BUILTIN.iter().map(|d| d.to_string()).collect();
    specs::classifiers(&domains, &[] as &[&Path]).unwrap()
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(rd) => rd.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn up_to_date_run_writes_nothing() {
    let body = "a1,airport kennel\na2,95 degrees\n";
    let (_dir, opts) = workspace(body, body);
    let before = fs::read(opts.paths.history()).unwrap();

    let mut t = Transcript::default();
    let summary = runner::pipeline(&opts, &all_domains(), Some(&mut t)).unwrap();

    assert!(summary.extract.is_up_to_date());
    assert!(summary.flagged.is_empty());
    assert!(files_in(&opts.paths.new_rows_dir()).is_empty());
    assert!(files_in(&opts.paths.flagged_dir()).is_empty());
    assert_eq!(fs::read(opts.paths.history()).unwrap(), before);
    assert!(t.lines.iter().any(|l| l.contains("Up to date")));
}

#[test]
fn full_run_flags_each_domain_and_advances_history() {
    let (_dir, opts) = workspace(
        "a1,routine inspection\n",
        "a1,routine inspection\n\
         a2,The dog was transported via airline cargo to the airport\n\
         a3,Kennel measured 101 degrees with no shade\n\
         a4,\"A responsible adult was not available to accompany APHIS officials, hot weather\"\n",
    );

    let summary = runner::pipeline(&opts, &all_domains(), None).unwrap();
    assert_eq!(summary.extract.new_rows, 3);

    let counts: Vec<(String, usize)> = summary
        .flagged
        .iter()
        .map(|f| (f.summary.domain.clone(), f.summary.flagged))
        .collect();
    assert_eq!(
        counts,
        [("air_transport".to_string(), 1), ("extreme_temperatures".to_string(), 1)]
    );

    let air = load_dataset(&opts.paths.flagged_file("air_transport"), opts.format).unwrap();
    assert_eq!(air.len(), 3);
    let flag = air.require_column("air_transport_flag").unwrap();
    assert_eq!(air.cell(0, flag), "1");

    let temps = load_dataset(&opts.paths.flagged_history("extreme_temperatures"), opts.format).unwrap();
    let expl = temps.require_column("classification_explanation").unwrap();
    assert_eq!(
        temps.cell(2, expl),
        "Initially matched positive rules ['heat_terms'] but overridden by negative rules ['no_adult']"
    );

    let history = load_dataset(&opts.paths.history(), opts.format).unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history.headers, ["hash_id", "narrative"]);

    let verified = runner::verify(&opts, None).unwrap();
    assert_eq!(verified.history_shape, (4, 2));
}

#[test]
fn prefix_mismatch_aborts_without_writes() {
    let (_dir, opts) = workspace("a1,x\na2,y\n", "a2,y\na1,x\na3,z\n");
    let err = runner::pipeline(&opts, &all_domains(), None).unwrap_err();
    assert!(matches!(err, Error::PrefixMismatch { row: 1 }));
    assert!(files_in(&opts.paths.new_rows_dir()).is_empty());

    let mut keyed = opts.clone();
    keyed.diff.policy = citeflag::diff::DiffPolicy::Key("hash_id".into());
    let summary = runner::pipeline(&keyed, &all_domains(), None).unwrap();
    assert_eq!(summary.extract.new_rows, 1);
}

#[test]
fn flag_picks_the_newest_new_rows_file() {
    let (_dir, opts) = workspace("", "");
    let dir = opts.paths.new_rows_dir();
    fs::create_dir_all(&dir).unwrap();

    let old = dir.join("inspections_citations_new_rows_20240101_000000.csv");
    let new = dir.join("inspections_citations_new_rows_20240301_000000.csv");
    fs::write(&new, format!("{HEADER}n1,air freight\n")).unwrap();
    fs::write(&old, format!("{HEADER}o1,nothing\no2,nothing\n")).unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let now = SystemTime::now();
    File::options().write(true).open(&old).unwrap()
        .set_modified(now - Duration::from_secs(3600)).unwrap();
    File::options().write(true).open(&new).unwrap().set_modified(now).unwrap();

    assert_eq!(runner::resolve_input(&opts, None).unwrap(), new);

    let outcomes = runner::flag(&opts, None, &all_domains()[..1], None).unwrap();
    assert_eq!(outcomes[0].summary.total, 1);
    assert_eq!(outcomes[0].summary.flagged, 1);
}

#[test]
fn timestamped_extract_then_append() {
    let (_dir, mut opts) = workspace("a1,x\n", "a1,x\na2,y\n");
    opts.diff.timestamped = true;

    let (summary, _) = runner::extract(&opts, None).unwrap();
    let written = summary.written.unwrap();
    let name = written.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("inspections_citations_new_rows_"));
    assert_eq!(name.len(), "inspections_citations_new_rows_".len() + 15 + 4);

    let report = runner::append(&opts, None, None, None).unwrap();
    assert_eq!((report.before, report.added, report.after), (1, 1, 2));
    runner::verify(&opts, None).unwrap();
}
