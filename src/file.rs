// src/file.rs

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::SystemTime,
};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Create `dir` (and parents) unless it already exists. Empty paths are a no-op.
pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() { return Ok(()); }
    if dir.exists() && !dir.is_dir() {
        return Err(Error::io(
            dir,
            std::io::Error::other("path exists but is not a directory"),
        ));
    }
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    Ok(())
}

pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => ensure_directory(parent),
        None => Ok(()),
    }
}

/// Replace `path` with `contents` all-or-nothing: write a temp file in the
/// same directory, fsync it, then rename it over the target.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(contents).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

    logd!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// `<stem>_<stamp>.<ext>`
pub fn timestamped_name(stem: &str, stamp: &str, ext: &str) -> String {
    join!(stem, "_", stamp, ".", ext)
}

/// Local capture time, sortable and file-name safe.
pub fn capture_stamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Most recently modified file with extension `ext` directly inside `dir`.
/// Missing directory → `None`.
pub fn latest_modified(dir: &Path, ext: &str) -> Result<Option<PathBuf>> {
    if !dir.is_dir() { return Ok(None); }

    let mut best: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if !path.is_file() { continue; }
        if path.extension().and_then(|s| s.to_str()).unwrap_or("") != ext { continue; }

        let mtime = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| Error::io(&path, e))?;
        let newer = match &best {
            Some((seen, _)) => mtime > *seen,
            None => true,
        };
        if newer { best = Some((mtime, path)); }
    }
    Ok(best.map(|(_, p)| p))
}
