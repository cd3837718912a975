// src/store.rs
use std::{fs, path::{Path, PathBuf}};

use crate::csv::{self, parse_rows, Delim};
use crate::error::{Error, Result};
use crate::file;

/// One table: header row plus data rows. `origin` is the file it came from,
/// used only to name the file in error messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataSet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    origin: Option<PathBuf>,
}

impl DataSet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows, origin: None }
    }

    pub fn with_origin(mut self, path: impl Into<PathBuf>) -> Self {
        self.origin = Some(path.into());
        self
    }

    pub fn origin(&self) -> PathBuf {
        self.origin.clone().unwrap_or_else(|| PathBuf::from("<in-memory>"))
    }

    /// (data rows, columns), as printed by the sanity checks.
    pub fn shape(&self) -> (usize, usize) { (self.rows.len(), self.headers.len()) }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like `column_index`, but a missing column is an error naming the file.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| Error::MissingColumn {
            path: self.origin(),
            column: s!(name),
        })
    }

    /// Cell text; rows shorter than the header read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn to_text(&self, delim: Delim) -> String {
        csv::rows_to_string(Some(self.headers.as_slice()), &self.rows, delim.sep())
    }
}

/// Header names and order must be identical.
pub fn check_schema(path: &Path, expected: &[String], found: &[String]) -> Result<()> {
    if expected == found { return Ok(()); }
    Err(Error::SchemaMismatch {
        path: path.to_path_buf(),
        expected: expected.to_vec(),
        found: found.to_vec(),
    })
}

/// Parse file text into a DataSet. First row is the header; short rows are
/// padded with empty cells, rows wider than the header are rejected.
pub fn parse_dataset(path: &Path, text: &str, delim: Delim) -> Result<DataSet> {
    let mut rows = parse_rows(text, delim.sep());
    if rows.is_empty() {
        return Err(Error::EmptyFile { path: path.to_path_buf() });
    }
    let headers = rows.remove(0);
    let width = headers.len();

    for (i, row) in rows.iter_mut().enumerate() {
        if row.len() > width {
            return Err(Error::RaggedRow {
                path: path.to_path_buf(),
                row: i + 1,
                expected: width,
                found: row.len(),
            });
        }
        row.resize(width, s!());
    }

    Ok(DataSet::new(headers, rows).with_origin(path))
}

pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::MissingFile { path: path.to_path_buf() });
    }
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Load a required table. A missing file is fatal.
pub fn load_dataset(path: &Path, delim: Delim) -> Result<DataSet> {
    let text = read_text(path)?;
    let ds = parse_dataset(path, &text, delim)?;
    logd!("Loaded {} shape={:?}", path.display(), ds.shape());
    Ok(ds)
}

/// Write a whole table (header included), replacing any previous file.
pub fn save_dataset(path: &Path, ds: &DataSet, delim: Delim) -> Result<()> {
    file::write_atomic(path, ds.to_text(delim).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_are_padded() {
        let ds = parse_dataset(Path::new("t.csv"), "a,b,c\n1,2\n", Delim::Csv).unwrap();
        assert_eq!(ds.rows[0], row!["1", "2", ""]);
        assert_eq!(ds.shape(), (1, 3));
    }

    #[test]
    fn wide_rows_are_rejected() {
        let err = parse_dataset(Path::new("t.csv"), "a,b\n1,2,3\n", Delim::Csv).unwrap_err();
        assert!(matches!(err, Error::RaggedRow { row: 1, expected: 2, found: 3, .. }));
    }

    #[test]
    fn empty_text_has_no_header() {
        let err = parse_dataset(Path::new("t.csv"), "", Delim::Csv).unwrap_err();
        assert!(matches!(err, Error::EmptyFile { .. }));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_dataset(Path::new("/definitely/not/here.csv"), Delim::Csv).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }

    #[test]
    fn missing_column_error() {
        let ds = DataSet::new(row!["id"], vec![]).with_origin("h.csv");
        let err = ds.require_column("narrative").unwrap_err();
        assert_eq!(err.to_string(), "column 'narrative' not found in h.csv");
    }

    #[test]
    fn schema_check_is_order_sensitive() {
        let p = Path::new("h.csv");
        assert!(check_schema(p, &row!["a", "b"], &row!["a", "b"]).is_ok());
        assert!(check_schema(p, &row!["a", "b"], &row!["b", "a"]).is_err());
    }
}
