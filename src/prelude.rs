//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use nelly::prelude::*;
//! ```

pub use crate::config::{ColumnIndex, EvaluationConfig, RawOptions, ThresholdSubject};
pub use crate::error::{NellyError, Result};
pub use crate::evaluator::{EvaluationSummary, PrequentialEvaluator, ResultRow};
pub use crate::harness::{evaluate_file, EvaluationReport, PrequentialRun};
pub use crate::instance::{Attribute, Instance, InstanceHeader};
pub use crate::learner::{LearnerRegistry, Regressor};
pub use crate::metrics::RunningStats;
pub use crate::router::{Route, StreamRouter};
pub use crate::sink::{CsvSink, JsonLinesSink, ResultSink, RowLayout};
pub use crate::stream::{open_source, InstanceStream, VecStream};
