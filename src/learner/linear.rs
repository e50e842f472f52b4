//! Online linear regression trained by stochastic gradient descent.
//!
//! Reference: [Bottou 2010] "Large-Scale Machine Learning with Stochastic
//! Gradient Descent"; [Duchi et al. 2011] "Adaptive Subgradient Methods".
//!
//! Nominal inputs enter the model as their category index and missing inputs
//! as 0. With `standardize` enabled, every input is centred and scaled by a
//! running mean and variance before it reaches the weights.

use super::Regressor;
use crate::error::{NellyError, Result};
use crate::instance::{is_missing, Instance, InstanceHeader};

/// Learning rate decay schedules.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LearningRateDecay {
    /// No decay (constant learning rate)
    Constant,
    /// lr = `lr_0` / sqrt(t)
    #[default]
    InverseSqrt,
    /// lr = `lr_0` / t
    Inverse,
    /// lr = `lr_0` / (1 + `decay_rate` * t)
    Step { decay_rate: f64 },
    /// AdaGrad-style per-parameter adaptive decay
    AdaGrad { epsilon: f64 },
}

/// Configuration of an [`SgdRegressor`].
#[derive(Debug, Clone, PartialEq)]
pub struct SgdConfig {
    /// Base learning rate
    pub learning_rate: f64,
    /// Learning rate decay schedule
    pub decay: LearningRateDecay,
    /// L2 regularization strength
    pub l2_reg: f64,
    /// Clip gradients to this magnitude
    pub gradient_clip: Option<f64>,
    /// Standardize inputs with running statistics
    pub standardize: bool,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            decay: LearningRateDecay::InverseSqrt,
            l2_reg: 0.0,
            gradient_clip: None,
            standardize: false,
        }
    }
}

/// Running mean and variance of one input (Welford).
#[derive(Debug, Clone, Copy, Default)]
struct RunningMoments {
    count: f64,
    mean: f64,
    m2: f64,
}

impl RunningMoments {
    fn update(&mut self, x: f64) {
        self.count += 1.0;
        let delta = x - self.mean;
        self.mean += delta / self.count;
        self.m2 += delta * (x - self.mean);
    }

    fn scale(&self, x: f64) -> f64 {
        if self.count < 2.0 {
            return x - self.mean;
        }
        let std = (self.m2 / (self.count - 1.0)).sqrt();
        if std > f64::EPSILON {
            (x - self.mean) / std
        } else {
            x - self.mean
        }
    }
}

/// Linear model `y = w·x + b` updated one record at a time.
#[derive(Debug, Clone)]
pub struct SgdRegressor {
    name: &'static str,
    weights: Vec<f64>,
    bias: f64,
    accum_grad: Vec<f64>,
    moments: Vec<RunningMoments>,
    n_samples: u64,
    initialized: bool,
    config: SgdConfig,
}

impl SgdRegressor {
    /// Create an unbound model; [`Regressor::set_model_context`] sizes it.
    #[must_use]
    pub fn with_config(name: &'static str, config: SgdConfig) -> Self {
        Self {
            name,
            weights: Vec::new(),
            bias: 0.0,
            accum_grad: Vec::new(),
            moments: Vec::new(),
            n_samples: 0,
            initialized: false,
            config,
        }
    }

    /// Plain SGD, base rate 0.01, inverse-sqrt decay.
    #[must_use]
    pub fn sgd() -> Self {
        Self::with_config("sgd", SgdConfig::default())
    }

    /// AdaGrad per-feature rates, base rate 0.1.
    #[must_use]
    pub fn adagrad() -> Self {
        Self::with_config(
            "adagrad",
            SgdConfig {
                learning_rate: 0.1,
                decay: LearningRateDecay::AdaGrad { epsilon: 1e-8 },
                ..SgdConfig::default()
            },
        )
    }

    /// Standardized inputs, constant rate 0.01.
    #[must_use]
    pub fn perceptron() -> Self {
        Self::with_config(
            "perceptron",
            SgdConfig {
                learning_rate: 0.01,
                decay: LearningRateDecay::Constant,
                standardize: true,
                ..SgdConfig::default()
            },
        )
    }

    /// Get model weights
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Get bias term
    #[must_use]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &SgdConfig {
        &self.config
    }

    /// Current effective (pre-AdaGrad) learning rate.
    #[must_use]
    pub fn current_learning_rate(&self) -> f64 {
        let base = self.config.learning_rate;
        let t = self.n_samples.max(1) as f64;

        match self.config.decay {
            LearningRateDecay::InverseSqrt => base / t.sqrt(),
            LearningRateDecay::Inverse => base / t,
            LearningRateDecay::Step { decay_rate } => base / (1.0 + decay_rate * t),
            LearningRateDecay::Constant | LearningRateDecay::AdaGrad { .. } => base,
        }
    }

    fn inputs(&self, instance: &Instance) -> Result<Vec<f64>> {
        if !self.initialized {
            return Err(NellyError::model(format!(
                "{}: model used before set_model_context",
                self.name
            )));
        }
        let inputs: Vec<f64> = instance
            .features()
            .zip(&self.moments)
            .map(|(x, moments)| {
                let x = if is_missing(x) { 0.0 } else { x };
                if self.config.standardize {
                    moments.scale(x)
                } else {
                    x
                }
            })
            .collect();
        if instance.num_attributes() - 1 != self.weights.len() {
            return Err(NellyError::SchemaMismatch {
                expected: self.weights.len() + 1,
                actual: instance.num_attributes(),
            });
        }
        Ok(inputs)
    }

    fn dot(&self, inputs: &[f64]) -> f64 {
        let pred: f64 = inputs.iter().zip(&self.weights).map(|(xi, wi)| xi * wi).sum();
        pred + self.bias
    }
}

impl Regressor for SgdRegressor {
    fn name(&self) -> &str {
        self.name
    }

    fn set_model_context(&mut self, header: &InstanceHeader) -> Result<()> {
        let n_features = header.num_features();
        self.weights = vec![0.0; n_features];
        self.accum_grad = vec![1e-8; n_features]; // Small value to avoid div by zero
        self.moments = vec![RunningMoments::default(); n_features];
        self.bias = 0.0;
        self.n_samples = 0;
        self.initialized = true;
        Ok(())
    }

    fn predict(&self, instance: &Instance) -> Result<f64> {
        let inputs = self.inputs(instance)?;
        let pred = self.dot(&inputs);
        if !pred.is_finite() {
            return Err(NellyError::model(format!(
                "{}: prediction diverged ({pred})",
                self.name
            )));
        }
        Ok(pred)
    }

    fn train_on_instance(&mut self, instance: &Instance) -> Result<()> {
        let y = instance.class_value();
        if !y.is_finite() {
            return Err(NellyError::model(format!("non-finite target {y}")));
        }
        if self.config.standardize && self.initialized {
            for (x, moments) in instance.features().zip(self.moments.iter_mut()) {
                moments.update(if is_missing(x) { 0.0 } else { x });
            }
        }

        let inputs = self.inputs(instance)?;
        let lr = self.current_learning_rate();
        // Gradient: 2 * error * x (we drop the 2 and absorb into lr)
        let error = self.dot(&inputs) - y;

        for (j, &xj) in inputs.iter().enumerate() {
            let grad = error * xj + self.config.l2_reg * self.weights[j];
            let grad = match self.config.gradient_clip {
                Some(clip) => grad.clamp(-clip, clip),
                None => grad,
            };

            let effective_lr = match self.config.decay {
                LearningRateDecay::AdaGrad { epsilon } => {
                    self.accum_grad[j] += grad * grad;
                    lr / (self.accum_grad[j].sqrt() + epsilon)
                }
                _ => lr,
            };

            self.weights[j] -= effective_lr * grad;
        }

        self.bias -= lr * error;
        self.n_samples += 1;

        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(NellyError::model(format!(
                "{}: weights diverged after {} samples",
                self.name, self.n_samples
            )));
        }
        Ok(())
    }

    fn n_samples_seen(&self) -> u64 {
        self.n_samples
    }
}
