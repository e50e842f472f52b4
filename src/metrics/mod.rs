//! Error metrics for regression streams.
//!
//! [`RunningStats`] accumulates the error of a prequential pass one test
//! record at a time. The batch functions [`mae`], [`mse`] and [`rmse`]
//! recompute the same statistics from the full list of (predicted, actual)
//! pairs; after every update the running values agree with a batch
//! recomputation over the pairs seen so far.

use serde::{Deserialize, Serialize};

/// Computes the Mean Squared Error (MSE).
///
/// MSE = (1/n) * `Σ(y_true - y_pred)²`
///
/// # Examples
///
/// ```
/// use nelly::metrics::mse;
///
/// let y_true = [3.0, -0.5, 2.0, 7.0];
/// let y_pred = [2.5, 0.0, 2.0, 8.0];
/// assert!((mse(&y_pred, &y_true) - 0.375).abs() < 1e-12);
/// ```
///
/// # Panics
///
/// Panics if the slices have different lengths or are empty.
#[must_use]
pub fn mse(y_pred: &[f64], y_true: &[f64]) -> f64 {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    assert!(!y_true.is_empty(), "Slices cannot be empty");

    let sum_sq_error: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    sum_sq_error / y_true.len() as f64
}

/// Computes the Mean Absolute Error (MAE).
///
/// MAE = (1/n) * `Σ|y_true - y_pred|`
///
/// # Examples
///
/// ```
/// use nelly::metrics::mae;
///
/// let y_true = [3.0, -0.5, 2.0, 7.0];
/// let y_pred = [2.5, 0.0, 2.0, 8.0];
/// assert!((mae(&y_pred, &y_true) - 0.5).abs() < 1e-12);
/// ```
///
/// # Panics
///
/// Panics if the slices have different lengths or are empty.
#[must_use]
pub fn mae(y_pred: &[f64], y_true: &[f64]) -> f64 {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    assert!(!y_true.is_empty(), "Slices cannot be empty");

    let sum_abs_error: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum();

    sum_abs_error / y_true.len() as f64
}

/// Computes the Root Mean Squared Error (RMSE).
///
/// RMSE = sqrt(MSE)
///
/// # Panics
///
/// Panics if the slices have different lengths or are empty.
#[must_use]
pub fn rmse(y_pred: &[f64], y_true: &[f64]) -> f64 {
    mse(y_pred, y_true).sqrt()
}

/// Error of one scored prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scored {
    /// Absolute error `|predicted - actual|`
    pub error: f64,
    /// Running MAE including this prediction
    pub mae: f64,
    /// Running RMSE including this prediction
    pub rmse: f64,
}

/// Counters and error accumulators of one prequential pass.
///
/// Only the evaluator writes to it; it is never reset during a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    test_count: u64,
    train_count: u64,
    sum_abs_error: f64,
    sum_sq_error: f64,
}

impl RunningStats {
    /// Fresh, zero-valued statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Score a prediction and fold its error into the accumulators.
    pub fn record_test(&mut self, predicted: f64, actual: f64) -> Scored {
        let error = (predicted - actual).abs();
        self.test_count += 1;
        self.sum_abs_error += error;
        self.sum_sq_error += error * error;

        let n = self.test_count as f64;
        Scored {
            error,
            mae: self.sum_abs_error / n,
            rmse: (self.sum_sq_error / n).sqrt(),
        }
    }

    /// Count one record handed to the learner for training.
    pub fn record_train(&mut self) {
        self.train_count += 1;
    }

    /// Number of test records scored.
    #[must_use]
    pub fn test_count(&self) -> u64 {
        self.test_count
    }

    /// Number of records used for training.
    #[must_use]
    pub fn train_count(&self) -> u64 {
        self.train_count
    }

    /// Cumulative absolute error.
    #[must_use]
    pub fn sum_abs_error(&self) -> f64 {
        self.sum_abs_error
    }

    /// Cumulative squared error.
    #[must_use]
    pub fn sum_sq_error(&self) -> f64 {
        self.sum_sq_error
    }

    /// Running MAE, `None` before the first test record.
    #[must_use]
    pub fn mae(&self) -> Option<f64> {
        (self.test_count > 0).then(|| self.sum_abs_error / self.test_count as f64)
    }

    /// Running RMSE, `None` before the first test record.
    #[must_use]
    pub fn rmse(&self) -> Option<f64> {
        (self.test_count > 0).then(|| (self.sum_sq_error / self.test_count as f64).sqrt())
    }
}

#[cfg(test)]
#[path = "tests_regression_contract.rs"]
mod tests_regression_contract;
