//! Stream router: classifies each record as test, train or drop.
//!
//! The indicator column decides the role of a record. A value of exactly
//! zero marks a held-out test record. Any other value marks a training
//! candidate, which becomes a training record only when the threshold
//! subject strictly exceeds the threshold; otherwise it is dropped.
//!
//! The indicator attribute is always removed from the record, whatever the
//! outcome, so the learner never sees the routing column.

use crate::config::ThresholdSubject;
use crate::error::{NellyError, Result};
use crate::instance::Instance;
use std::fmt;

/// Role of a record in the prequential pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Predict, then score against the true target.
    Test,
    /// Feed to the learner's incremental update.
    Train,
    /// Ignore: neither predicted nor trained on.
    Drop,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Test => f.write_str("test"),
            Route::Train => f.write_str("train"),
            Route::Drop => f.write_str("drop"),
        }
    }
}

/// Routes records using a resolved indicator position and a threshold.
///
/// # Examples
///
/// ```
/// use nelly::instance::Instance;
/// use nelly::router::{Route, StreamRouter};
///
/// // indicator in the third column, threshold 0
/// let router = StreamRouter::new(2, 0.0);
///
/// let mut record = Instance::new(vec![1.5, 4.0, 0.0], 1).unwrap();
/// assert_eq!(router.route(&mut record, 1).unwrap(), Route::Test);
/// assert_eq!(record.values(), &[1.5, 4.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamRouter {
    indicator: usize,
    threshold: f64,
    subject: ThresholdSubject,
}

impl StreamRouter {
    /// Create a router for the 0-based `indicator` position.
    ///
    /// The position must already be resolved against the schema the
    /// records arrive in (the "last column" sentinel included).
    #[must_use]
    pub fn new(indicator: usize, threshold: f64) -> Self {
        Self {
            indicator,
            threshold,
            subject: ThresholdSubject::Indicator,
        }
    }

    /// Compare the threshold against `subject` instead of the indicator.
    #[must_use]
    pub fn with_threshold_subject(mut self, subject: ThresholdSubject) -> Self {
        self.subject = subject;
        self
    }

    /// 0-based position of the indicator attribute.
    #[must_use]
    pub fn indicator(&self) -> usize {
        self.indicator
    }

    /// Training threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify from the indicator value and the threshold subject value.
    ///
    /// NaN (a missing indicator) is neither zero nor above any threshold,
    /// so it drops.
    #[must_use]
    pub fn classify(&self, indicator: f64, subject: f64) -> Route {
        if indicator == 0.0 {
            Route::Test
        } else if subject > self.threshold {
            Route::Train
        } else {
            Route::Drop
        }
    }

    /// Classify `instance` and strip its indicator attribute.
    ///
    /// `record` is the 1-based stream position, used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::IndexOutOfBounds`] if the indicator position
    /// does not exist in the record, and [`NellyError::InvalidColumn`] if it
    /// collides with the target position. Both are fatal misconfigurations.
    pub fn route(&self, instance: &mut Instance, record: u64) -> Result<Route> {
        let len = instance.num_attributes();
        if self.indicator >= len {
            return Err(NellyError::IndexOutOfBounds {
                record,
                index: self.indicator,
                len,
            });
        }
        if self.indicator == instance.class_index() {
            return Err(NellyError::InvalidColumn {
                option: "indicator_column",
                reason: format!(
                    "record {record}: position {} is the target column",
                    self.indicator + 1
                ),
            });
        }

        let indicator = instance
            .delete_attribute_at(self.indicator)
            .ok_or(NellyError::IndexOutOfBounds {
                record,
                index: self.indicator,
                len,
            })?;
        let subject = match self.subject {
            ThresholdSubject::Indicator => indicator,
            ThresholdSubject::Target => instance.class_value(),
        };

        let route = self.classify(indicator, subject);
        tracing::debug!(record, indicator, %route, "routed record");
        Ok(route)
    }
}
