//! Target-mean baselines.
//!
//! Both ignore the inputs and predict a (possibly faded) average of the
//! targets seen during training. They predict 0 before any training.

use super::Regressor;
use crate::error::{NellyError, Result};
use crate::instance::{Instance, InstanceHeader};

/// Predicts the running mean of the training targets.
#[derive(Debug, Clone, Default)]
pub struct TargetMean {
    sum: f64,
    n_samples: u64,
}

impl TargetMean {
    /// Registered name.
    pub const NAME: &'static str = "targetmean";

    /// Create an untrained model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Regressor for TargetMean {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn set_model_context(&mut self, _header: &InstanceHeader) -> Result<()> {
        Ok(())
    }

    fn predict(&self, _instance: &Instance) -> Result<f64> {
        if self.n_samples == 0 {
            return Ok(0.0);
        }
        Ok(self.sum / self.n_samples as f64)
    }

    fn train_on_instance(&mut self, instance: &Instance) -> Result<()> {
        let y = instance.class_value();
        if !y.is_finite() {
            return Err(NellyError::model(format!("non-finite target {y}")));
        }
        self.sum += y;
        self.n_samples += 1;
        Ok(())
    }

    fn n_samples_seen(&self) -> u64 {
        self.n_samples
    }
}

/// Predicts an exponentially faded mean of the training targets.
///
/// After each target `y`: `sum = alpha * sum + y`, `weight = alpha * weight + 1`;
/// the prediction is `sum / weight`.
#[derive(Debug, Clone)]
pub struct FadingTargetMean {
    alpha: f64,
    sum: f64,
    weight: f64,
    n_samples: u64,
}

impl FadingTargetMean {
    /// Registered name.
    pub const NAME: &'static str = "fadingtarget";

    /// Fading factor of the registered variant.
    pub const DEFAULT_ALPHA: f64 = 0.99;

    /// Create with fading factor `alpha`.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::InvalidConfig`] unless `0 < alpha <= 1`.
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(NellyError::InvalidConfig(format!(
                "fading factor must be in (0, 1], got {alpha}"
            )));
        }
        Ok(Self {
            alpha,
            sum: 0.0,
            weight: 0.0,
            n_samples: 0,
        })
    }

    /// Fading factor.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Default for FadingTargetMean {
    fn default() -> Self {
        Self {
            alpha: Self::DEFAULT_ALPHA,
            sum: 0.0,
            weight: 0.0,
            n_samples: 0,
        }
    }
}

impl Regressor for FadingTargetMean {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn set_model_context(&mut self, _header: &InstanceHeader) -> Result<()> {
        Ok(())
    }

    fn predict(&self, _instance: &Instance) -> Result<f64> {
        if self.weight == 0.0 {
            return Ok(0.0);
        }
        Ok(self.sum / self.weight)
    }

    fn train_on_instance(&mut self, instance: &Instance) -> Result<()> {
        let y = instance.class_value();
        if !y.is_finite() {
            return Err(NellyError::model(format!("non-finite target {y}")));
        }
        self.sum = self.alpha * self.sum + y;
        self.weight = self.alpha * self.weight + 1.0;
        self.n_samples += 1;
        Ok(())
    }

    fn n_samples_seen(&self) -> u64 {
        self.n_samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(y: f64) -> Instance {
        Instance::new(vec![y, 1.0], 0).unwrap()
    }

    #[test]
    fn test_target_mean_predicts_zero_untrained() {
        let model = TargetMean::new();
        assert_eq!(model.predict(&target(9.0)).unwrap(), 0.0);
    }

    #[test]
    fn test_target_mean_averages() {
        let mut model = TargetMean::new();
        for y in [1.0, 2.0, 6.0] {
            model.train_on_instance(&target(y)).unwrap();
        }
        assert_eq!(model.predict(&target(0.0)).unwrap(), 3.0);
        assert_eq!(model.n_samples_seen(), 3);
    }

    #[test]
    fn test_target_mean_rejects_missing_target() {
        let mut model = TargetMean::new();
        assert!(model.train_on_instance(&target(f64::NAN)).is_err());
        assert_eq!(model.n_samples_seen(), 0);
    }

    #[test]
    fn test_fading_mean_with_alpha_one_is_plain_mean() {
        let mut model = FadingTargetMean::new(1.0).unwrap();
        for y in [2.0, 4.0] {
            model.train_on_instance(&target(y)).unwrap();
        }
        assert!((model.predict(&target(0.0)).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_fading_mean_favours_recent_targets() {
        let mut model = FadingTargetMean::new(0.5).unwrap();
        model.train_on_instance(&target(0.0)).unwrap();
        model.train_on_instance(&target(10.0)).unwrap();
        // sum = 10, weight = 1.5
        let pred = model.predict(&target(0.0)).unwrap();
        assert!((pred - 10.0 / 1.5).abs() < 1e-12);
        assert!(pred > 5.0);
    }

    #[test]
    fn test_fading_mean_validates_alpha() {
        assert!(FadingTargetMean::new(0.0).is_err());
        assert!(FadingTargetMean::new(1.5).is_err());
        assert_eq!(FadingTargetMean::default().alpha(), 0.99);
    }
}
