//! Writing stage outputs to disk.

use std::{
    fs::File,
    path::Path,
};

use tempfile::NamedTempFile;

use crate::error::{PipelineError, Result};

/// Writes `path` through a temporary file in the same directory and renames it
/// into place once `write` succeeds. A failed write leaves any previous file
/// at `path` untouched.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PipelineError::Io(e.error))?;

    Ok(())
}
