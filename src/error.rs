//! Error taxonomy. Every variant belongs to exactly one user-visible category.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Artifact bundle missing or malformed. The process cannot serve predictions.
    #[error("cannot load artifact bundle {}: {reason}", .path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    /// Route or booking origin the encoder was never fit on
    #[error("unknown {field} '{value}': not among the categories the encoder was fit on")]
    UnknownCategory { field: &'static str, value: String },

    /// Reconstructed vector does not match the training schema (artifact version skew)
    #[error("feature schema mismatch: {0}")]
    SchemaAlignment(String),

    /// Raw attribute outside its allowed domain
    #[error("invalid {field}: {reason}")]
    InvalidAttribute { field: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Classifier failed at run time
    #[error("inference failed: {0}")]
    Inference(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    ArtifactLoad,
    UnknownCategory,
    SchemaAlignment,
    InvalidAttribute,
    InvalidConfig,
    Inference,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::ArtifactLoad => "artifact_load",
            ErrorCategory::UnknownCategory => "unknown_category",
            ErrorCategory::SchemaAlignment => "schema_alignment",
            ErrorCategory::InvalidAttribute => "invalid_attribute",
            ErrorCategory::InvalidConfig => "invalid_config",
            ErrorCategory::Inference => "inference",
        }
    }

    /// Process exit code used by the CLI
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorCategory::ArtifactLoad => 3,
            ErrorCategory::UnknownCategory => 4,
            ErrorCategory::SchemaAlignment => 5,
            ErrorCategory::InvalidAttribute => 6,
            ErrorCategory::InvalidConfig => 7,
            ErrorCategory::Inference => 8,
        }
    }

    /// Fatal categories mean the artifact/schema is unusable, not that the input was bad.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorCategory::ArtifactLoad | ErrorCategory::SchemaAlignment | ErrorCategory::InvalidConfig
        )
    }
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::ArtifactLoad { .. } => ErrorCategory::ArtifactLoad,
            Error::UnknownCategory { .. } => ErrorCategory::UnknownCategory,
            Error::SchemaAlignment(_) => ErrorCategory::SchemaAlignment,
            Error::InvalidAttribute { .. } => ErrorCategory::InvalidAttribute,
            Error::InvalidConfig(_) => ErrorCategory::InvalidConfig,
            Error::Inference(_) => ErrorCategory::Inference,
        }
    }

    pub(crate) fn artifact(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Error::ArtifactLoad {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidAttribute {
            field,
            reason: reason.into(),
        }
    }
}
