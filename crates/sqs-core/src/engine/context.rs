use super::error::EngineError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of the per-record sub-directories inside the output directory.
pub const RECORD_DIR_PREFIX: &str = "poscar_";

/// Mutable state of one conversion run.
///
/// Holds the output directory and the number of records written so far. The
/// context is created once per run and threaded through every record, so no
/// run state lives outside of it.
#[derive(Debug)]
pub struct ConversionContext {
    output_dir: PathBuf,
    records_written: usize,
}

impl ConversionContext {
    /// Opens `output_dir` for a new run, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OutputNotEmpty`] if the directory already holds
    /// entries; earlier results must be moved away before a new run.
    pub fn prepare(output_dir: &Path) -> Result<Self, EngineError> {
        fs::create_dir_all(output_dir)?;
        if fs::read_dir(output_dir)?.next().is_some() {
            return Err(EngineError::OutputNotEmpty {
                path: output_dir.to_path_buf(),
            });
        }
        debug!("Prepared output directory {:?}", output_dir);
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            records_written: 0,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn record_dir(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}{}", RECORD_DIR_PREFIX, index))
    }

    /// Creates the sub-directory for record `index`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OutputCollision`] if it already exists.
    pub fn create_record_dir(&self, index: usize) -> Result<PathBuf, EngineError> {
        let dir = self.record_dir(index);
        match fs::create_dir(&dir) {
            Ok(()) => Ok(dir),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(EngineError::OutputCollision { path: dir })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn mark_written(&mut self, index: usize) {
        debug_assert_eq!(index, self.records_written + 1);
        self.records_written += 1;
    }
}
