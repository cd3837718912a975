// src/config/options.rs
use std::path::{Path, PathBuf};

use super::consts::*;
use crate::csv::Delim;
use crate::diff::DiffPolicy;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppOptions {
    pub paths: PathOptions,
    pub diff: DiffOptions,
    pub format: Delim,
    pub narrative_column: String,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            paths: PathOptions::default(),
            diff: DiffOptions::default(),
            format: Delim::Csv,
            narrative_column: s!(NARRATIVE_COLUMN),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffOptions {
    pub policy: DiffPolicy,
    /// Embed a capture timestamp in the new-rows file name.
    pub timestamped: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            policy: DiffPolicy::Position,
            timestamped: false,
        }
    }
}

/// File layout of one data root. Relative paths resolve against `root`,
/// absolute ones are used as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathOptions {
    root: PathBuf,
    history: PathBuf,
    upstream: PathBuf,
    new_rows_dir: PathBuf,
    flagged_dir: PathBuf,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            history: PathBuf::from(HISTORY_FILE),
            upstream: PathBuf::from(UPSTREAM_FILE),
            new_rows_dir: PathBuf::from(NEW_ROWS_DIR),
            flagged_dir: PathBuf::from(FLAGGED_DIR),
        }
    }
}

impl PathOptions {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), ..Self::default() }
    }

    pub fn root(&self) -> &Path { &self.root }
    pub fn set_root(&mut self, root: impl Into<PathBuf>) { self.root = root.into(); }
    pub fn set_history(&mut self, p: impl Into<PathBuf>) { self.history = p.into(); }
    pub fn set_upstream(&mut self, p: impl Into<PathBuf>) { self.upstream = p.into(); }
    pub fn set_new_rows_dir(&mut self, p: impl Into<PathBuf>) { self.new_rows_dir = p.into(); }
    pub fn set_flagged_dir(&mut self, p: impl Into<PathBuf>) { self.flagged_dir = p.into(); }

    pub fn history(&self) -> PathBuf { self.resolve(&self.history) }
    pub fn upstream(&self) -> PathBuf { self.resolve(&self.upstream) }
    pub fn new_rows_dir(&self) -> PathBuf { self.resolve(&self.new_rows_dir) }
    pub fn flagged_dir(&self) -> PathBuf { self.resolve(&self.flagged_dir) }

    /// `<new_rows_dir>/<stem>[_<stamp>].<ext>`
    pub fn new_rows_file(&self, stamp: Option<&str>, format: Delim) -> PathBuf {
        let name = match stamp {
            Some(stamp) => crate::file::timestamped_name(NEW_ROWS_STEM, stamp, format.ext()),
            None => join!(NEW_ROWS_STEM, ".", format.ext()),
        };
        self.new_rows_dir().join(name)
    }

    /// `<flagged_dir>/<domain>/initial_flagged.csv`
    pub fn flagged_file(&self, domain: &str) -> PathBuf {
        self.flagged_dir().join(domain).join(FLAGGED_FILE)
    }

    /// `<flagged_dir>/<domain>/flagged_history.csv`
    pub fn flagged_history(&self, domain: &str) -> PathBuf {
        self.flagged_dir().join(domain).join(FLAGGED_HISTORY_FILE)
    }

    fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() { p.to_path_buf() } else { self.root.join(p) }
    }
}
