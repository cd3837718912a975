// src/diff.rs
//! Which upstream rows are new?
//!
//! Three policies, not interchangeable:
//! - `Position`: upstream only ever grows at the end. New rows are everything
//!   past the saved row count. The saved rows must be an exact prefix of
//!   upstream, otherwise the run fails instead of guessing.
//! - `Key(column)`: a row is new when its key is not among the saved keys.
//!   Edits to non-key cells of an existing row are not picked up.
//! - `WholeRow`: a row is new when no saved row is identical to it. An edit
//!   in place looks like a brand-new row; duplicates inside upstream are
//!   emitted once.
//!
//! All three keep upstream order.

use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::store::{self, DataSet};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DiffPolicy {
    #[default]
    Position,
    Key(String),
    WholeRow,
}

impl fmt::Display for DiffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffPolicy::Position => write!(f, "position"),
            DiffPolicy::Key(col) => write!(f, "key({col})"),
            DiffPolicy::WholeRow => write!(f, "whole-row"),
        }
    }
}

/// Rows of `upstream` that `saved` does not have yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowDiff {
    pub policy: DiffPolicy,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RowDiff {
    /// Nothing new upstream. A normal outcome, not a failure.
    pub fn is_up_to_date(&self) -> bool { self.rows.is_empty() }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn into_dataset(self) -> DataSet {
        DataSet::new(self.headers, self.rows)
    }
}

pub fn diff(saved: &DataSet, upstream: &DataSet, policy: &DiffPolicy) -> Result<RowDiff> {
    store::check_schema(&upstream.origin(), &saved.headers, &upstream.headers)?;

    let rows = match policy {
        DiffPolicy::Position => by_position(saved, upstream)?,
        DiffPolicy::Key(column) => by_key(saved, upstream, column)?,
        DiffPolicy::WholeRow => by_whole_row(saved, upstream),
    };

    logd!(
        "Diff policy={} saved={} upstream={} new={}",
        policy, saved.len(), upstream.len(), rows.len()
    );

    Ok(RowDiff {
        policy: policy.clone(),
        headers: upstream.headers.clone(),
        rows,
    })
}

fn by_position(saved: &DataSet, upstream: &DataSet) -> Result<Vec<Vec<String>>> {
    if upstream.len() < saved.len() {
        return Err(Error::UpstreamShrank { saved: saved.len(), upstream: upstream.len() });
    }
    if let Some(row) = saved.rows.iter().zip(&upstream.rows).position(|(s, u)| s != u) {
        return Err(Error::PrefixMismatch { row: row + 1 });
    }
    Ok(upstream.rows[saved.len()..].to_vec())
}

fn by_key(saved: &DataSet, upstream: &DataSet, column: &str) -> Result<Vec<Vec<String>>> {
    // Same headers on both sides, so one lookup serves both.
    let col = upstream.require_column(column)?;

    let known: HashSet<&str> = (0..saved.len()).map(|i| saved.cell(i, col)).collect();

    Ok(upstream
        .rows
        .iter()
        .enumerate()
        .filter(|(i, _)| !known.contains(upstream.cell(*i, col)))
        .map(|(_, r)| r.clone())
        .collect())
}

fn by_whole_row(saved: &DataSet, upstream: &DataSet) -> Vec<Vec<String>> {
    let known: HashSet<&[String]> = saved.rows.iter().map(Vec::as_slice).collect();
    let mut emitted: HashSet<&[String]> = HashSet::new();

    upstream
        .rows
        .iter()
        .filter(|r| !known.contains(r.as_slice()) && emitted.insert(r.as_slice()))
        .cloned()
        .collect()
}
