// Error types for report assembly
//
// Everything here is fatal for the current assembly. Typesetting problems are
// not errors: they are reported through CompileReport and degrade to "no PDF".

use std::path::{Path, PathBuf};

use awardbench_schemas::ValidationError;
use thiserror::Error;

/// Result type alias for assembly operations
pub type Result<T> = std::result::Result<T, AssemblyError>;

/// Errors raised while turning a record into document text
#[derive(Debug, Error)]
pub enum RenderError {
    /// The record is missing a field or metric score the document references
    #[error("invalid benchmark record: {0}")]
    InvalidRecord(#[from] ValidationError),

    /// The document template failed to compile or render
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Errors that abort an assembly
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Rendering failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Filesystem operation failed
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be written
    #[error("failed to write archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Benchmark record file is not valid JSON for the record shape
    #[error("failed to parse benchmark record {}: {source}", path.display())]
    Record {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AssemblyError {
    /// Adapter for `map_err` on filesystem calls
    pub fn io(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| AssemblyError::Io {
            action,
            path,
            source,
        }
    }

    /// Whether the failure came from the record itself rather than the environment
    pub fn is_invalid_record(&self) -> bool {
        matches!(
            self,
            AssemblyError::Render(RenderError::InvalidRecord(_)) | AssemblyError::Record { .. }
        )
    }
}

impl From<ValidationError> for AssemblyError {
    fn from(err: ValidationError) -> Self {
        AssemblyError::Render(RenderError::InvalidRecord(err))
    }
}
