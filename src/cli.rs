// src/cli.rs
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::options::AppOptions;
use crate::csv::Delim;
use crate::diff::DiffPolicy;
use crate::engine::Classifier;
use crate::progress::Progress;
use crate::{runner, specs};

#[derive(Parser, Debug)]
#[command(name = "citeflag", version, about = "Extract new inspection citations and flag them by rule set")]
pub struct Cli {
    /// Data root; relative paths resolve against it
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Table format for every file read or written
    #[arg(long, global = true, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Csv,
    Tsv,
}

impl From<Format> for Delim {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => Delim::Csv,
            Format::Tsv => Delim::Tsv,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write upstream rows missing from the history to the new-rows file
    Extract(DiffArgs),
    /// Append a rows file to the history (or --target)
    Append {
        /// Rows to append; default is the newest new-rows file
        #[arg(long)]
        input: Option<PathBuf>,
        /// File to append to; default is the diff-base history
        #[arg(long)]
        target: Option<PathBuf>,
    },
    /// Classify a rows file and write each domain's flagged file
    Flag {
        /// Rows to classify; default is the newest new-rows file
        #[arg(long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        rules: RuleArgs,
    },
    /// extract, flag and append in one go
    Run {
        #[command(flatten)]
        diff: DiffArgs,
        #[command(flatten)]
        rules: RuleArgs,
    },
    /// Check that the history now has the same shape as upstream
    Verify {
        #[arg(long)]
        history: Option<PathBuf>,
        #[arg(long)]
        upstream: Option<PathBuf>,
    },
    /// List built-in domains and their patterns
    Rules {
        /// Also list these rule files
        #[arg(long = "rules", value_name = "TOML")]
        files: Vec<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct DiffArgs {
    /// Diff by this key column instead of by position
    #[arg(long, value_name = "COLUMN", conflicts_with = "whole_row")]
    pub key: Option<String>,
    /// Diff by full-row equality
    #[arg(long)]
    pub whole_row: bool,
    /// Add a capture timestamp to the new-rows file name
    #[arg(long)]
    pub timestamp: bool,
    #[arg(long)]
    pub history: Option<PathBuf>,
    #[arg(long)]
    pub upstream: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct RuleArgs {
    /// Built-in domain to run (repeatable)
    #[arg(long = "domain", value_name = "NAME")]
    pub domains: Vec<String>,
    /// Run every built-in domain
    #[arg(long)]
    pub all: bool,
    /// Extra domain from a TOML rule file (repeatable)
    #[arg(long = "rules", value_name = "TOML")]
    pub files: Vec<PathBuf>,
    #[arg(long, default_value = crate::config::consts::NARRATIVE_COLUMN)]
    pub narrative: String,
}

impl DiffArgs {
    fn policy(&self) -> DiffPolicy {
        match (&self.key, self.whole_row) {
            (Some(col), _) => DiffPolicy::Key(col.clone()),
            (None, true) => DiffPolicy::WholeRow,
            (None, false) => DiffPolicy::Position,
        }
    }

    fn apply(&self, opts: &mut AppOptions) {
        opts.diff.policy = self.policy();
        opts.diff.timestamped = self.timestamp;
        if let Some(p) = &self.history { opts.paths.set_history(p); }
        if let Some(p) = &self.upstream { opts.paths.set_upstream(p); }
    }
}

impl RuleArgs {
    /// Selected domains; no selection at all means every built-in one.
    fn classifiers(&self) -> crate::Result<Vec<Classifier>> {
        let domains: Vec<String> = if self.all || (self.domains.is_empty() && self.files.is_empty()) {
            specs::BUILTIN.iter().map(|d| s!(*d)).collect()
        } else {
            self.domains.clone()
        };
        specs::classifiers(&domains, &self.files)
    }
}

impl Cli {
    pub fn options(&self) -> AppOptions {
        let mut opts = AppOptions::default();
        opts.paths.set_root(&self.root);
        opts.format = self.format.into();
        opts
    }
}

/* ---------------- Console progress ---------------- */

/// Prints the sanity-check blocks operators read after each step.
pub struct ConsoleProgress<W: Write> {
    out: W,
}

impl ConsoleProgress<io::Stdout> {
    pub fn stdout() -> Self { Self { out: io::stdout() } }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self { Self { out } }
    pub fn into_inner(self) -> W { self.out }
}

// Console writes are best effort; a closed stdout must not fail the run.
impl<W: Write> Progress for ConsoleProgress<W> {
    fn begin(&mut self, title: &str) {
        let _ = writeln!(self.out, "\n---- {title} ----");
    }
    fn log(&mut self, msg: &str) {
        let _ = writeln!(self.out, "{msg}");
    }
    fn shape(&mut self, label: &str, shape: (usize, usize)) {
        let _ = writeln!(self.out, "{label}: ({}, {})", shape.0, shape.1);
    }
    fn finish(&mut self) {
        let _ = writeln!(self.out, "--------");
        let _ = self.out.flush();
    }
}

/* ---------------- Dispatch ---------------- */

fn list_rules(files: &[PathBuf]) -> crate::Result<()> {
    let mut sets = specs::BUILTIN.iter().map(|d| specs::builtin(d)).collect::<crate::Result<Vec<_>>>()?;
    for f in files {
        sets.push(specs::load_rule_file(f)?);
    }
    for spec in sets {
        println!("{} ({})", spec.name, spec.flag_column);
        for (kind, rules) in [("+", &spec.positive), ("-", &spec.negative)] {
            for r in rules {
                match &r.exclude {
                    Some(ex) => println!("  {kind} {:<20} {}  (not {ex})", r.name, r.pattern),
                    None => println!("  {kind} {:<20} {}", r.name, r.pattern),
                }
            }
        }
    }
    Ok(())
}

/// Execute a parsed command line. Logging must already be set up.
pub fn execute(cli: Cli) -> crate::Result<()> {
    let mut opts = cli.options();
    let mut console = ConsoleProgress::stdout();
    let progress: Option<&mut dyn Progress> = Some(&mut console);

    match cli.command {
        Command::Extract(diff) => {
            diff.apply(&mut opts);
            runner::extract(&opts, progress)?;
        }
        Command::Append { input, target } => {
            runner::append(&opts, input.as_deref(), target.as_deref(), progress)?;
        }
        Command::Flag { input, rules } => {
            opts.narrative_column = rules.narrative.clone();
            let classifiers = rules.classifiers()?;
            runner::flag(&opts, input.as_deref(), &classifiers, progress)?;
        }
        Command::Run { diff, rules } => {
            diff.apply(&mut opts);
            opts.narrative_column = rules.narrative.clone();
            let classifiers = rules.classifiers()?;
            runner::pipeline(&opts, &classifiers, progress)?;
        }
        Command::Verify { history, upstream } => {
            if let Some(p) = history { opts.paths.set_history(p); }
            if let Some(p) = upstream { opts.paths.set_upstream(p); }
            runner::verify(&opts, progress)?;
        }
        Command::Rules { files } => list_rules(&files)?,
    }
    Ok(())
}

pub fn run() -> color_eyre::Result<()> {
    let cli = Cli::parse();
    crate::log::init(cli.verbose, cli.log_file.as_deref())?;
    execute(cli)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("citeflag").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn extract_policy_flags() {
        let Command::Extract(d) = parse(&["extract"]).command else { panic!() };
        assert_eq!(d.policy(), DiffPolicy::Position);
        let Command::Extract(d) = parse(&["extract", "--key", "hash_id"]).command else { panic!() };
        assert_eq!(d.policy(), DiffPolicy::Key(s!("hash_id")));
        let Command::Extract(d) = parse(&["extract", "--whole-row"]).command else { panic!() };
        assert_eq!(d.policy(), DiffPolicy::WholeRow);
        assert!(Cli::try_parse_from(["citeflag", "extract", "--key", "a", "--whole-row"]).is_err());
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = parse(&["verify", "--root", "/data", "--format", "tsv"]);
        let opts = cli.options();
        assert_eq!(opts.format, Delim::Tsv);
        assert_eq!(opts.paths.root(), std::path::Path::new("/data"));
    }

    #[test]
    fn no_domain_selection_means_all_builtins() {
        let Command::Flag { rules, .. } = parse(&["flag"]).command else { panic!() };
        let names: Vec<String> = rules.classifiers().unwrap().iter().map(|c| s!(c.rules().name())).collect();
        assert_eq!(names, specs::BUILTIN.iter().map(|d| s!(*d)).collect::<Vec<_>>());

        let Command::Flag { rules, .. } = parse(&["flag", "--domain", "air_transport"]).command else { panic!() };
        assert_eq!(rules.classifiers().unwrap().len(), 1);

        let Command::Flag { rules, .. } = parse(&["flag", "--domain", "volcanoes"]).command else { panic!() };
        assert!(rules.classifiers().is_err());
    }

    #[test]
    fn console_progress_blocks() {
        let mut p = ConsoleProgress::new(Vec::new());
        p.begin("extract");
        p.shape("history", (3, 2));
        p.finish();
        let text = String::from_utf8(p.into_inner()).unwrap();
        assert_eq!(text, "\n---- extract ----\nhistory: (3, 2)\n--------\n");
    }
}
