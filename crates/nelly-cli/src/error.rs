//! Error types for nelly-cli

use nelly::error::{ErrorCategory, NellyError};
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Failure reported by the evaluation library
    #[error(transparent)]
    Nelly(#[from] NellyError),

    /// No input given and no home directory to derive the default from
    #[error("no input file given and the home directory cannot be determined")]
    NoHomeDirectory,

    /// IO error while writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Summary could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Numeric process status for this error
    pub(crate) fn status(&self) -> u8 {
        match self {
            Self::Nelly(e) => match e.category() {
                ErrorCategory::Configuration => 3,
                ErrorCategory::Schema => 4,
                ErrorCategory::Learner => 5,
                ErrorCategory::Source => 6,
            },
            Self::NoHomeDirectory => 3,
            Self::Io(_) | Self::Json(_) => 7,
        }
    }

    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }
}
