// src/error.rs
//! Error taxonomy for every fatal condition a run can hit.
//!
//! An empty diff is not an error, and neither is a malformed narrative
//! (the classifier maps it to `Invalid input`). Everything here aborts the
//! current run before any history file is touched.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("required file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("file has no header row: {}", path.display())]
    EmptyFile { path: PathBuf },

    #[error(
        "schema mismatch for {}: expected columns [{}], found [{}]",
        path.display(),
        expected.join(", "),
        found.join(", ")
    )]
    SchemaMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("column '{column}' not found in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error(
        "{}: row {row} has {found} fields, header has {expected}",
        path.display()
    )]
    RaggedRow {
        path: PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("upstream has {upstream} rows but {saved} are already saved; upstream is not append-only")]
    UpstreamShrank { saved: usize, upstream: usize },

    #[error("saved rows are not a prefix of upstream: first difference at data row {row}")]
    PrefixMismatch { row: usize },

    #[error(
        "row count check failed for {}: expected {expected} data rows, found {found}",
        path.display()
    )]
    CountMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error(
        "history shape ({}, {}) does not match upstream shape ({}, {})",
        history.0, history.1, upstream.0, upstream.1
    )]
    ShapeMismatch {
        history: (usize, usize),
        upstream: (usize, usize),
    },

    #[error("rule '{rule}' has an invalid pattern")]
    Rule {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("could not parse rule file {}", path.display())]
    RuleFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown flagging domain: {0}")]
    UnknownDomain(String),

    #[error("no new-rows file found in {}", dir.display())]
    NoInput { dir: PathBuf },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}
