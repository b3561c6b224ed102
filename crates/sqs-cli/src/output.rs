use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Path of the backup kept for `dir`, i.e. `dir~`.
pub fn backup_path(dir: &Path) -> PathBuf {
    let mut name = dir.as_os_str().to_os_string();
    name.push("~");
    PathBuf::from(name)
}

/// Moves the results of a previous run out of the way.
///
/// An existing `dir~` is deleted and an existing `dir` is renamed to `dir~`,
/// so only one generation of old results is kept. Returns the backup path
/// when a rotation happened.
pub fn rotate_previous_output(dir: &Path) -> Result<Option<PathBuf>> {
    if !dir.exists() {
        return Ok(None);
    }
    let backup = backup_path(dir);
    if backup.exists() {
        info!("Removing old backup {:?}", backup);
        if backup.is_dir() {
            fs::remove_dir_all(&backup)?;
        } else {
            fs::remove_file(&backup)?;
        }
    }
    info!("Moving previous output {:?} to {:?}", dir, backup);
    fs::rename(dir, &backup)?;
    Ok(Some(backup))
}
