//! Error types for Nelly operations.
//!
//! Every failure of a prequential pass is fatal: nothing is retried, because
//! a learner that has already been trained cannot be rewound to replay the
//! stream. Errors are grouped into categories so callers can tell a bad
//! configuration apart from a fault discovered mid-stream.

use std::path::PathBuf;
use thiserror::Error;

/// Learner operation that was being attempted when a learner failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnerOp {
    /// Binding the learner to the stream schema.
    Initialize,
    /// Requesting a prediction for a test record.
    Predict,
    /// Updating the learner with a training record.
    Train,
}

impl std::fmt::Display for LearnerOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LearnerOp::Initialize => "initialize",
            LearnerOp::Predict => "predict",
            LearnerOp::Train => "train",
        };
        f.write_str(name)
    }
}

/// Coarse grouping of [`NellyError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Detected before the pass starts; the pass never begins.
    Configuration,
    /// A column is absent or a required value is missing mid-stream.
    Schema,
    /// The learner failed to initialize, predict or train.
    Learner,
    /// The record source could not be read or parsed.
    Source,
}

/// Main error type for Nelly operations.
///
/// # Examples
///
/// ```
/// use nelly::error::{ErrorCategory, NellyError};
///
/// let err = NellyError::IndexOutOfBounds { record: 7, index: 4, len: 3 };
/// assert_eq!(err.category(), ErrorCategory::Schema);
/// assert!(err.to_string().contains("record 7"));
/// ```
#[derive(Debug, Error)]
pub enum NellyError {
    /// A column index is syntactically valid but cannot be used.
    #[error("invalid {option}: {reason}")]
    InvalidColumn {
        /// Option that carried the index (e.g. `target_column`)
        option: &'static str,
        /// Why the index was rejected
        reason: String,
    },

    /// Any other configuration value that cannot be honoured.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The record source does not exist.
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// No learner is registered under the requested name.
    #[error("unknown learner '{name}' (available: {available})")]
    UnknownLearner {
        /// Requested name
        name: String,
        /// Comma separated list of registered names
        available: String,
    },

    /// A column position does not exist in the record being processed.
    #[error("record {record}: column index {index} out of bounds (len={len})")]
    IndexOutOfBounds {
        /// 1-based position of the record in the stream
        record: u64,
        /// 0-based column position that was requested
        index: usize,
        /// Number of attributes the record actually has
        len: usize,
    },

    /// A record routed to the learner has no target value.
    #[error("record {record}: target value is missing")]
    MissingTarget {
        /// 1-based position of the record in the stream
        record: u64,
    },

    /// A record does not match the schema it was declared under.
    #[error("schema mismatch: expected {expected} attributes, found {actual}")]
    SchemaMismatch {
        /// Attribute count of the header
        expected: usize,
        /// Attribute count of the record
        actual: usize,
    },

    /// The learner failed while processing a record.
    #[error("record {record}: learner failed to {operation}: {source}")]
    Learner {
        /// 1-based position of the record in the stream (0 before the first record)
        record: u64,
        /// Operation that failed
        operation: LearnerOp,
        /// Underlying learner error
        #[source]
        source: Box<NellyError>,
    },

    /// Failure reported by a learner implementation itself.
    #[error("{0}")]
    Model(String),

    /// The source content is malformed.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number in the source file
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// I/O error while reading a source or writing results.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NellyError {
    /// Wrap a learner failure with the stream position and operation.
    #[must_use]
    pub fn learner(record: u64, operation: LearnerOp, source: NellyError) -> Self {
        Self::Learner {
            record,
            operation,
            source: Box::new(source),
        }
    }

    /// Create an error raised from inside a learner implementation.
    #[must_use]
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }

    /// Category this error belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidColumn { .. }
            | Self::InvalidConfig(_)
            | Self::SourceNotFound(_)
            | Self::UnknownLearner { .. } => ErrorCategory::Configuration,
            Self::IndexOutOfBounds { .. }
            | Self::MissingTarget { .. }
            | Self::SchemaMismatch { .. } => ErrorCategory::Schema,
            Self::Learner { .. } | Self::Model(_) => ErrorCategory::Learner,
            Self::Parse { .. } | Self::Io(_) | Self::Csv(_) | Self::Json(_) => {
                ErrorCategory::Source
            }
        }
    }

    /// Stream position the error is attached to, if any.
    #[must_use]
    pub fn record(&self) -> Option<u64> {
        match self {
            Self::IndexOutOfBounds { record, .. }
            | Self::MissingTarget { record }
            | Self::Learner { record, .. } => Some(*record),
            _ => None,
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, NellyError>;
