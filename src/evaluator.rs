//! Prequential (test-then-train) evaluator.
//!
//! The evaluator owns the running counters and error accumulators of one
//! pass. For every routed record it either scores a prediction, trains the
//! learner or counts a drop. Records are numbered from 1 in the order they
//! were pulled from the source, drops included.
//!
//! # Example
//!
//! ```
//! use nelly::evaluator::PrequentialEvaluator;
//! use nelly::instance::{Attribute, Instance, InstanceHeader};
//! use nelly::learner::TargetMean;
//! use nelly::router::Route;
//!
//! let header = InstanceHeader::new(
//!     "demo",
//!     vec![Attribute::numeric("y"), Attribute::numeric("x")],
//!     0,
//! )
//! .unwrap();
//! let mut evaluator = PrequentialEvaluator::new(TargetMean::new(), &header).unwrap();
//!
//! let train = Instance::new(vec![4.0, 1.0], 0).unwrap();
//! assert!(evaluator.process(Route::Train, &train).unwrap().is_none());
//!
//! let test = Instance::new(vec![6.0, 1.0], 0).unwrap();
//! let row = evaluator.process(Route::Test, &test).unwrap().unwrap();
//! assert_eq!(row.predicted, 4.0);
//! assert_eq!(row.mae, 2.0);
//! ```

use crate::error::{LearnerOp, NellyError, Result};
use crate::instance::{is_missing, Instance, InstanceHeader};
use crate::learner::Regressor;
use crate::metrics::RunningStats;
use crate::router::Route;
use crate::sink::RowLayout;
use serde::{Deserialize, Serialize};

/// Outcome of one test record. Immutable once emitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    /// 1-based index of the test record among test records
    pub test_index: u64,
    /// Training records consumed before this prediction
    pub train_count: u64,
    /// Learner output
    pub predicted: f64,
    /// True target value
    pub actual: f64,
    /// Absolute error of this prediction
    pub error: f64,
    /// Running mean absolute error, this prediction included
    pub mae: f64,
    /// Running root mean squared error, this prediction included
    pub rmse: f64,
}

impl ResultRow {
    /// Field values in column order for `layout`.
    #[must_use]
    pub fn fields(&self, layout: RowLayout) -> Vec<String> {
        let mut fields = vec![
            self.test_index.to_string(),
            self.train_count.to_string(),
            self.predicted.to_string(),
            self.actual.to_string(),
        ];
        if layout == RowLayout::Extended {
            fields.extend([
                self.error.to_string(),
                self.mae.to_string(),
                self.rmse.to_string(),
            ]);
        }
        fields
    }

    /// Comma separated line for `layout`, without a line terminator.
    ///
    /// ```
    /// use nelly::evaluator::ResultRow;
    /// use nelly::sink::RowLayout;
    ///
    /// let row = ResultRow {
    ///     test_index: 3,
    ///     train_count: 10,
    ///     predicted: 1.5,
    ///     actual: 2.0,
    ///     error: 0.5,
    ///     mae: 0.25,
    ///     rmse: 0.5,
    /// };
    /// assert_eq!(row.to_csv_line(RowLayout::Basic), "3,10,1.5,2");
    /// assert_eq!(row.to_csv_line(RowLayout::Extended), "3,10,1.5,2,0.5,0.25,0.5");
    /// ```
    #[must_use]
    pub fn to_csv_line(&self, layout: RowLayout) -> String {
        self.fields(layout).join(",")
    }
}

/// Final counters of a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    /// Registered name of the learner
    pub learner: String,
    /// Records pulled from the source
    pub records: u64,
    /// Records used as test records
    pub test_count: u64,
    /// Records used for training
    pub train_count: u64,
    /// Records neither tested nor trained on
    pub dropped: u64,
    /// Final MAE, `None` without test records
    pub mae: Option<f64>,
    /// Final RMSE, `None` without test records
    pub rmse: Option<f64>,
}

/// Drives a learner through routed records and accumulates its error.
#[derive(Debug)]
pub struct PrequentialEvaluator<L> {
    learner: L,
    stats: RunningStats,
    records: u64,
    dropped: u64,
}

impl<L: Regressor> PrequentialEvaluator<L> {
    /// Bind `learner` to the schema it will see (the indicator removed).
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::Learner`] with record 0 if the learner rejects
    /// the schema.
    pub fn new(mut learner: L, header: &InstanceHeader) -> Result<Self> {
        learner
            .set_model_context(header)
            .map_err(|e| NellyError::learner(0, LearnerOp::Initialize, e))?;
        Ok(Self {
            learner,
            stats: RunningStats::new(),
            records: 0,
            dropped: 0,
        })
    }

    /// Process the next record of the stream.
    ///
    /// `instance` must already be stripped of its indicator. Returns the
    /// result row for a test record and `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::MissingTarget`] for a test or train record
    /// without target value, and [`NellyError::Learner`] if the learner
    /// fails. The counters are left as they were before the failing call.
    pub fn process(&mut self, route: Route, instance: &Instance) -> Result<Option<ResultRow>> {
        let record = self.records + 1;
        let row = match route {
            Route::Test => {
                let actual = instance.class_value();
                if is_missing(actual) {
                    return Err(NellyError::MissingTarget { record });
                }
                let predicted = self
                    .learner
                    .predict(instance)
                    .map_err(|e| NellyError::learner(record, LearnerOp::Predict, e))?;
                let scored = self.stats.record_test(predicted, actual);
                tracing::trace!(record, predicted, actual, error = scored.error, "scored");
                Some(ResultRow {
                    test_index: self.stats.test_count(),
                    train_count: self.stats.train_count(),
                    predicted,
                    actual,
                    error: scored.error,
                    mae: scored.mae,
                    rmse: scored.rmse,
                })
            }
            Route::Train => {
                if is_missing(instance.class_value()) {
                    return Err(NellyError::MissingTarget { record });
                }
                self.learner
                    .train_on_instance(instance)
                    .map_err(|e| NellyError::learner(record, LearnerOp::Train, e))?;
                self.stats.record_train();
                None
            }
            Route::Drop => {
                self.dropped += 1;
                None
            }
        };
        self.records = record;
        Ok(row)
    }

    /// Running statistics.
    #[must_use]
    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    /// Records processed so far.
    #[must_use]
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Records dropped so far.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// The learner under evaluation.
    #[must_use]
    pub fn learner(&self) -> &L {
        &self.learner
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn summary(&self) -> EvaluationSummary {
        EvaluationSummary {
            learner: self.learner.name().to_string(),
            records: self.records,
            test_count: self.stats.test_count(),
            train_count: self.stats.train_count(),
            dropped: self.dropped,
            mae: self.stats.mae(),
            rmse: self.stats.rmse(),
        }
    }

    /// Give the learner back.
    pub fn into_learner(self) -> L {
        self.learner
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
