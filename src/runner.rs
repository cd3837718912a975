// src/runner.rs
//! One function per batch step, plus the full pipeline. Each step loads its
//! inputs from disk, computes, writes its outputs and returns a summary; no
//! state survives between calls.

use std::path::{Path, PathBuf};

use crate::{
    append::{self, AppendReport},
    classify::{classify_dataset, ClassifySummary},
    config::options::AppOptions,
    diff::{self, DiffPolicy, RowDiff},
    engine::Classifier,
    error::{Error, Result},
    file,
    progress::Progress,
    store::{self, DataSet},
};

/* ---------------- Summaries ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractSummary {
    pub policy: DiffPolicy,
    pub history_shape: (usize, usize),
    pub upstream_shape: (usize, usize),
    pub new_rows: usize,
    /// `None` when up to date: no new-rows file is written then.
    pub written: Option<PathBuf>,
}

impl ExtractSummary {
    pub fn is_up_to_date(&self) -> bool { self.new_rows == 0 }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlagOutcome {
    pub summary: ClassifySummary,
    pub written: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PipelineSummary {
    pub extract: ExtractSummary,
    pub flagged: Vec<FlagOutcome>,
    /// Per-domain flagged histories, then the diff-base history.
    pub appended: Vec<AppendReport>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifySummary {
    pub history_shape: (usize, usize),
    pub upstream_shape: (usize, usize),
}

/* ---------------- Helpers ---------------- */

fn report(progress: &mut Option<&mut dyn Progress>, f: impl FnOnce(&mut dyn Progress)) {
    if let Some(p) = progress.as_deref_mut() {
        f(p);
    }
}

/// Lend the sink to a nested step for a shorter lifetime than our own.
fn reborrow<'b>(progress: &'b mut Option<&mut dyn Progress>) -> Option<&'b mut dyn Progress> {
    progress.as_mut().map(|p| &mut **p as &mut dyn Progress)
}

/// Bracket `body` with `begin`/`finish`; `finish` runs on failure too.
fn step<'p, T>(
    progress: &mut Option<&'p mut (dyn Progress + 'p)>,
    title: &str,
    body: impl FnOnce(&mut Option<&'p mut (dyn Progress + 'p)>) -> Result<T>,
) -> Result<T> {
    report(progress, |p| p.begin(title));
    let result = body(progress);
    if let Err(e) = &result {
        report(progress, |p| p.log(&format!("Failed: {e}")));
    }
    report(progress, |p| p.finish());
    result
}

/// Explicit path (must exist), else the newest new-rows file.
pub fn resolve_input(opts: &AppOptions, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        if !p.exists() {
            return Err(Error::MissingFile { path: p.to_path_buf() });
        }
        return Ok(p.to_path_buf());
    }
    let dir = opts.paths.new_rows_dir();
    let picked = file::latest_modified(&dir, opts.format.ext())?
        .ok_or(Error::NoInput { dir })?;
    logd!("Picked newest new-rows file {}", picked.display());
    Ok(picked)
}

fn load_diff(opts: &AppOptions) -> Result<(DataSet, DataSet, RowDiff)> {
    let history = store::load_dataset(&opts.paths.history(), opts.format)?;
    let upstream = store::load_dataset(&opts.paths.upstream(), opts.format)?;
    let diff = diff::diff(&history, &upstream, &opts.diff.policy)?;
    Ok((history, upstream, diff))
}

fn write_new_rows(opts: &AppOptions, diff: &RowDiff) -> Result<PathBuf> {
    let stamp = opts.diff.timestamped.then(file::capture_stamp);
    let path = opts.paths.new_rows_file(stamp.as_deref(), opts.format);
    let ds = DataSet::new(diff.headers.clone(), diff.rows.clone());
    store::save_dataset(&path, &ds, opts.format)?;
    Ok(path)
}

fn append_line(r: &AppendReport) -> String {
    format!(
        "{} {}: {} + {} → {} rows",
        if r.created { "Created" } else { "Updated" },
        r.path.display(),
        r.before,
        r.added,
        r.after
    )
}

/* ---------------- Steps ---------------- */

/// Diff upstream against the history and write the new rows, if any.
pub fn extract(
    opts: &AppOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Result<(ExtractSummary, RowDiff)> {
    step(&mut progress, "extract", |progress| {
        let (history, upstream, diff) = load_diff(opts)?;
        report(progress, |p| {
            p.shape(&format!("history {}", opts.paths.history().display()), history.shape());
            p.shape(&format!("upstream {}", opts.paths.upstream().display()), upstream.shape());
            p.shape("extracted new rows", (diff.len(), diff.headers.len()));
        });

        let written = if diff.is_up_to_date() {
            logf!("Up to date: no new rows (policy={})", opts.diff.policy);
            report(progress, |p| p.log("Up to date: no new rows, nothing written."));
            None
        } else {
            let path = write_new_rows(opts, &diff)?;
            logf!("Extracted {} new rows → {}", diff.len(), path.display());
            report(progress, |p| p.log(&format!("Wrote {}", path.display())));
            Some(path)
        };

        let summary = ExtractSummary {
            policy: opts.diff.policy.clone(),
            history_shape: history.shape(),
            upstream_shape: upstream.shape(),
            new_rows: diff.len(),
            written,
        };
        Ok((summary, diff))
    })
}

/// Classify `rows` once per classifier and write each domain's flagged file.
pub fn flag_rows(
    opts: &AppOptions,
    rows: &DataSet,
    classifiers: &[Classifier],
    mut progress: Option<&mut dyn Progress>,
) -> Result<Vec<(FlagOutcome, DataSet)>> {
    let mut out = Vec::with_capacity(classifiers.len());

    for classifier in classifiers {
        let domain = classifier.rules().name();
        let flagged = step(&mut progress, &format!("flag {domain}"), |progress| {
            let (flagged, results) = classify_dataset(rows, classifier, &opts.narrative_column)?;
            let summary = ClassifySummary::build(domain, rows, &opts.narrative_column, &results);

            let path = opts.paths.flagged_file(domain);
            store::save_dataset(&path, &flagged, opts.format)?;
            logf!(
                "Flagged {}/{} rows for {} → {}",
                summary.flagged, summary.total, domain, path.display()
            );

            report(progress, |p| {
                p.log(&format!("Total records: {}", summary.total));
                p.log(&format!("Records flagged: {}", summary.flagged));
                p.log(&format!("Percentage flagged: {:.2}%", summary.percent()));
                for ex in &summary.examples {
                    p.log("");
                    p.log(&format!("Narrative: {}...", ex.narrative));
                    p.log(&format!("Matched Rules: {}", crate::csv::format_list(&ex.matched_positive)));
                    p.log(&format!("Classification Explanation: {}", ex.explanation));
                }
                p.log(&format!("Wrote {}", path.display()));
            });
            Ok((FlagOutcome { summary, written: path }, flagged))
        })?;
        out.push(flagged);
    }
    Ok(out)
}

/// Load the new-rows file (explicit or newest) and flag it.
pub fn flag(
    opts: &AppOptions,
    input: Option<&Path>,
    classifiers: &[Classifier],
    mut progress: Option<&mut dyn Progress>,
) -> Result<Vec<FlagOutcome>> {
    let input = resolve_input(opts, input)?;
    let rows = store::load_dataset(&input, opts.format)?;
    report(&mut progress, |p| p.shape(&format!("input {}", input.display()), rows.shape()));

    Ok(flag_rows(opts, &rows, classifiers, progress)?
        .into_iter()
        .map(|(outcome, _)| outcome)
        .collect())
}

/// Append a rows file (explicit or newest new-rows file) to `target`
/// (default: the diff-base history).
pub fn append(
    opts: &AppOptions,
    input: Option<&Path>,
    target: Option<&Path>,
    mut progress: Option<&mut dyn Progress>,
) -> Result<AppendReport> {
    step(&mut progress, "append", |progress| {
        let input = resolve_input(opts, input)?;
        let target = target.map(Path::to_path_buf).unwrap_or_else(|| opts.paths.history());
        let rows = store::load_dataset(&input, opts.format)?;
        report(progress, |p| p.shape(&format!("new rows {}", input.display()), rows.shape()));

        let done = append::append(&target, &rows, opts.format)?;
        report(progress, |p| p.log(&append_line(&done)));
        Ok(done)
    })
}

/// History must now mirror upstream exactly in shape.
pub fn verify(opts: &AppOptions, mut progress: Option<&mut dyn Progress>) -> Result<VerifySummary> {
    step(&mut progress, "verify", |progress| {
        let history = store::load_dataset(&opts.paths.history(), opts.format)?;
        let upstream = store::load_dataset(&opts.paths.upstream(), opts.format)?;
        report(progress, |p| {
            p.shape("history", history.shape());
            p.shape("upstream (should match)", upstream.shape());
        });

        if history.shape() != upstream.shape() {
            return Err(Error::ShapeMismatch {
                history: history.shape(),
                upstream: upstream.shape(),
            });
        }
        Ok(VerifySummary { history_shape: history.shape(), upstream_shape: upstream.shape() })
    })
}

/// extract → flag (every classifier) → append flagged histories → append
/// history. Every append is staged before the first write, and a failed
/// write rolls back the targets already written, so a failed run leaves the
/// histories as they were and is redone in full next time.
pub fn pipeline(
    opts: &AppOptions,
    classifiers: &[Classifier],
    mut progress: Option<&mut dyn Progress>,
) -> Result<PipelineSummary> {
    let (extracted, diff) = extract(opts, reborrow(&mut progress))?;
    if extracted.is_up_to_date() {
        return Ok(PipelineSummary { extract: extracted, flagged: Vec::new(), appended: Vec::new() });
    }

    let new_rows = diff.into_dataset();
    let flagged = flag_rows(opts, &new_rows, classifiers, reborrow(&mut progress))?;

    let appended = step(&mut progress, "append", |progress| {
        let mut staged = Vec::with_capacity(flagged.len() + 1);
        for (outcome, ds) in &flagged {
            let target = opts.paths.flagged_history(&outcome.summary.domain);
            staged.push(append::stage(&target, ds, opts.format)?);
        }
        // diff-base history last
        staged.push(append::stage(&opts.paths.history(), &new_rows, opts.format)?);

        let appended = append::commit_all(&staged)?;
        report(progress, |p| appended.iter().for_each(|r| p.log(&append_line(r))));
        Ok(appended)
    })?;

    Ok(PipelineSummary {
        extract: extracted,
        flagged: flagged.into_iter().map(|(outcome, _)| outcome).collect(),
        appended,
    })
}
