// src/append.rs
//! Append rows to a running history file without ever leaving it half-written.
//!
//! An append is two steps. [`stage`] reads the history, checks the schema,
//! assembles the new contents in memory (existing bytes untouched, new rows
//! after them) and re-parses them to confirm the row count. [`commit`] writes
//! the staged contents to a temp file next to the history, renames it over
//! the history and reloads it to count again. Nothing touches the disk before
//! `commit`, so staging several targets first means a bad one is caught
//! before any of them changes.

use std::fs;
use std::path::{Path, PathBuf};

use crate::csv::{self, Delim};
use crate::error::{Error, Result};
use crate::file;
use crate::store::{self, DataSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendReport {
    pub path: PathBuf,
    /// History was missing or empty and got bootstrapped from the new rows' header.
    pub created: bool,
    pub before: usize,
    pub added: usize,
    /// Data rows found when reloading the history after the write.
    pub after: usize,
}

/// A verified history update that has not been written yet.
#[derive(Clone, Debug)]
pub struct Staged {
    path: PathBuf,
    delim: Delim,
    /// File contents before the update; `None` if there was no file.
    original: Option<String>,
    contents: String,
    created: bool,
    before: usize,
    added: usize,
}

impl Staged {
    pub fn expected(&self) -> usize { self.before + self.added }
}

pub fn stage(history: &Path, new_rows: &DataSet, delim: Delim) -> Result<Staged> {
    let sep = delim.sep();
    let original = match history.exists() {
        true => Some(store::read_text(history)?),
        false => None,
    };

    let (mut contents, before, created) = match original.as_deref() {
        Some(text) if !text.trim().is_empty() => {
            let existing = store::parse_dataset(history, text, delim)?;
            store::check_schema(history, &existing.headers, &new_rows.headers)?;
            (s!(text), existing.len(), false)
        }
        _ => {
            logf!("Bootstrapping {} with {} columns", history.display(), new_rows.headers.len());
            (csv::rows_to_string(Some(new_rows.headers.as_slice()), &[], sep), 0, true)
        }
    };

    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(&csv::rows_to_string(None, &new_rows.rows, sep));

    let expected = before + new_rows.len();
    let staged = store::parse_dataset(history, &contents, delim)?;
    if staged.len() != expected {
        return Err(Error::CountMismatch {
            path: history.to_path_buf(),
            expected,
            found: staged.len(),
        });
    }

    Ok(Staged {
        path: history.to_path_buf(),
        delim,
        original,
        contents,
        created,
        before,
        added: new_rows.len(),
    })
}

/// Write a staged update and verify it on disk. If the reload disagrees, the
/// previous contents are put back before the error is returned.
pub fn commit(staged: &Staged) -> Result<AppendReport> {
    let path = &staged.path;
    file::write_atomic(path, staged.contents.as_bytes())?;

    let expected = staged.expected();
    let after = match store::load_dataset(path, staged.delim) {
        Ok(ds) => ds.len(),
        Err(e) => {
            restore(staged);
            return Err(e);
        }
    };
    if after != expected {
        loge!("{} reloaded with {} rows, expected {}", path.display(), after, expected);
        restore(staged);
        return Err(Error::CountMismatch { path: path.clone(), expected, found: after });
    }

    logf!(
        "Appended {} rows to {} ({} → {})",
        staged.added, path.display(), staged.before, after
    );

    Ok(AppendReport {
        path: path.clone(),
        created: staged.created,
        before: staged.before,
        added: staged.added,
        after,
    })
}

/// Commit in order. On the first failure every target already committed is
/// put back the way it was.
pub fn commit_all(staged: &[Staged]) -> Result<Vec<AppendReport>> {
    let mut done = Vec::with_capacity(staged.len());
    for (i, s) in staged.iter().enumerate() {
        match commit(s) {
            Ok(report) => done.push(report),
            Err(e) => {
                loge!("Append to {} failed; rolling back {} earlier target(s)", s.path.display(), i);
                staged[..i].iter().rev().for_each(restore);
                return Err(e);
            }
        }
    }
    Ok(done)
}

// Best effort: the error that triggered the rollback is the one reported.
fn restore(staged: &Staged) {
    let result = match &staged.original {
        Some(text) => file::write_atomic(&staged.path, text.as_bytes()),
        None => fs::remove_file(&staged.path).map_err(|e| Error::io(&staged.path, e)),
    };
    if let Err(e) = result {
        loge!("Could not restore {}: {}", staged.path.display(), e);
    }
}

pub fn append(history: &Path, new_rows: &DataSet, delim: Delim) -> Result<AppendReport> {
    commit(&stage(history, new_rows, delim)?)
}
