use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::mcsqs::RecordError;
use crate::core::io::poscar::PoscarError;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Error while reading record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: RecordError,
    },

    #[error("Error while writing record {index} to {path}: {source}", path = path.display())]
    Write {
        index: usize,
        path: PathBuf,
        #[source]
        source: PoscarError,
    },

    #[error("Failed to read '{path}': {source}", path = path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output directory '{path}' is not empty", path = path.display())]
    OutputNotEmpty { path: PathBuf },

    #[error("Output location '{path}' already exists", path = path.display())]
    OutputCollision { path: PathBuf },

    #[error("Failed to read cell file '{path}': {source}", path = path.display())]
    CellFile {
        path: PathBuf,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// The 1-based record a failure belongs to, if any.
    pub fn record_index(&self) -> Option<usize> {
        match self {
            EngineError::Record { index, .. } | EngineError::Write { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub(crate) fn cell_file(path: &Path, err: impl StdError + Send + Sync + 'static) -> Self {
        EngineError::CellFile {
            path: path.to_path_buf(),
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::sqscell::SqsCellError;

    #[test]
    fn record_error_message_names_the_record() {
        let err = EngineError::Record {
            index: 7,
            source: RecordError::EmptyStructure,
        };
        assert_eq!(
            err.to_string(),
            "Error while reading record 7: Record contains no atoms"
        );
        assert_eq!(err.record_index(), Some(7));
    }

    #[test]
    fn cell_file_error_keeps_its_source() {
        let err = EngineError::cell_file(
            Path::new("sqscell.out"),
            SqsCellError::CountMismatch {
                expected: 2,
                found: 1,
            },
        );
        assert_eq!(
            err.to_string(),
            "Failed to read cell file 'sqscell.out': Header announces 2 cell(s) but 1 were found"
        );
        let source = err.source().unwrap();
        assert!(source.downcast_ref::<SqsCellError>().is_some());
    }

    #[test]
    fn config_errors_convert_into_engine_errors() {
        let err: EngineError = ConfigError::EmptyAtomType.into();
        assert!(matches!(err, EngineError::Config(ConfigError::EmptyAtomType)));
        assert_eq!(err.record_index(), None);
    }

    #[test]
    fn non_record_errors_have_no_index() {
        let err = EngineError::OutputNotEmpty {
            path: PathBuf::from("out"),
        };
        assert_eq!(err.record_index(), None);
    }
}
