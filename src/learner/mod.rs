//! Pluggable online regression models.
//!
//! The evaluator only depends on the [`Regressor`] capability: bind to a
//! schema once, predict a scalar for a record, and update incrementally from
//! a record. Concrete models are looked up by name in a [`LearnerRegistry`];
//! callers can register their own alongside the built-in baselines.
//!
//! # Example
//!
//! ```
//! use nelly::instance::{Attribute, Instance, InstanceHeader};
//! use nelly::learner::{LearnerRegistry, Regressor};
//!
//! let header = InstanceHeader::new(
//!     "demo",
//!     vec![Attribute::numeric("y"), Attribute::numeric("x")],
//!     0,
//! )
//! .unwrap();
//!
//! let mut model = LearnerRegistry::with_builtins().create("targetmean").unwrap();
//! model.set_model_context(&header).unwrap();
//! model.train_on_instance(&Instance::new(vec![4.0, 1.0], 0).unwrap()).unwrap();
//! model.train_on_instance(&Instance::new(vec![6.0, 2.0], 0).unwrap()).unwrap();
//!
//! let query = Instance::new(vec![f64::NAN, 3.0], 0).unwrap();
//! assert_eq!(model.predict(&query).unwrap(), 5.0);
//! ```

pub mod linear;
pub mod mean;

pub use linear::{LearningRateDecay, SgdConfig, SgdRegressor};
pub use mean::{FadingTargetMean, TargetMean};

use crate::error::{NellyError, Result};
use crate::instance::{Instance, InstanceHeader};
use std::collections::BTreeMap;
use std::fmt;

/// Online regression capability driven by the prequential evaluator.
///
/// Calls always arrive sequentially and in stream order:
/// `set_model_context` once, then any interleaving of `predict` and
/// `train_on_instance`.
pub trait Regressor {
    /// Registered name of the model.
    fn name(&self) -> &str;

    /// Bind the model to the schema of the records it will see.
    ///
    /// The header no longer contains the indicator column.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot handle the schema.
    fn set_model_context(&mut self, header: &InstanceHeader) -> Result<()>;

    /// Predict the target of `instance`. The target value must not be read.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not initialized or fails.
    fn predict(&self, instance: &Instance) -> Result<f64>;

    /// Update the model with a labelled record.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not initialized or fails.
    fn train_on_instance(&mut self, instance: &Instance) -> Result<()>;

    /// Number of training records consumed so far.
    fn n_samples_seen(&self) -> u64;
}

impl<R: Regressor + ?Sized> Regressor for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn set_model_context(&mut self, header: &InstanceHeader) -> Result<()> {
        (**self).set_model_context(header)
    }

    fn predict(&self, instance: &Instance) -> Result<f64> {
        (**self).predict(instance)
    }

    fn train_on_instance(&mut self, instance: &Instance) -> Result<()> {
        (**self).train_on_instance(instance)
    }

    fn n_samples_seen(&self) -> u64 {
        (**self).n_samples_seen()
    }
}

impl<R: Regressor + ?Sized> Regressor for &mut R {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn set_model_context(&mut self, header: &InstanceHeader) -> Result<()> {
        (**self).set_model_context(header)
    }

    fn predict(&self, instance: &Instance) -> Result<f64> {
        (**self).predict(instance)
    }

    fn train_on_instance(&mut self, instance: &Instance) -> Result<()> {
        (**self).train_on_instance(instance)
    }

    fn n_samples_seen(&self) -> u64 {
        (**self).n_samples_seen()
    }
}

/// Constructor of a boxed learner.
pub type LearnerFactory = Box<dyn Fn() -> Box<dyn Regressor> + Send + Sync>;

/// Name to constructor map of available learners.
pub struct LearnerRegistry {
    factories: BTreeMap<String, LearnerFactory>,
}

impl LearnerRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding the built-in baselines.
    ///
    /// | name | model |
    /// |---|---|
    /// | `targetmean` | running mean of the target |
    /// | `fadingtarget` | exponentially faded mean (factor 0.99) |
    /// | `sgd` | linear model, SGD with inverse-sqrt decay |
    /// | `adagrad` | linear model, AdaGrad per-feature rates |
    /// | `perceptron` | linear model on standardized inputs |
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(TargetMean::NAME, || Box::new(TargetMean::new()));
        registry.register(FadingTargetMean::NAME, || Box::new(FadingTargetMean::default()));
        registry.register("sgd", || Box::new(SgdRegressor::sgd()));
        registry.register("adagrad", || Box::new(SgdRegressor::adagrad()));
        registry.register("perceptron", || Box::new(SgdRegressor::perceptron()));
        registry
    }

    /// Register (or replace) a learner under `name`. Names are case-insensitive.
    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Regressor> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.to_ascii_lowercase(), Box::new(factory));
        self
    }

    /// Whether a learner is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build a fresh learner.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::UnknownLearner`] if nothing is registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Regressor>> {
        self.factories
            .get(&name.to_ascii_lowercase())
            .map(|factory| factory())
            .ok_or_else(|| NellyError::UnknownLearner {
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
    }
}

impl Default for LearnerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for LearnerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LearnerRegistry")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
