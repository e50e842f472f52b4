//! Nelly: prequential evaluation of online regression models.
//!
//! Nelly replays a labelled stream through an incremental regressor in
//! test-then-train order. An indicator column marks each record as a
//! held-out test record (indicator `0`) or a training candidate; candidates
//! train the learner only when they exceed a threshold. Every test record
//! yields a result row with the prediction, the true value and the running
//! MAE/RMSE.
//!
//! # Quick Start
//!
//! ```
//! use nelly::prelude::*;
//!
//! // columns: target, feature, indicator
//! let header = InstanceHeader::new(
//!     "quickstart",
//!     vec![
//!         Attribute::numeric("y"),
//!         Attribute::numeric("x"),
//!         Attribute::numeric("is_train"),
//!     ],
//!     0,
//! )
//! .unwrap();
//! let stream = VecStream::from_values(
//!     header,
//!     vec![
//!         vec![1.0, 0.5, 1.0],
//!         vec![3.0, 1.5, 1.0],
//!         vec![2.5, 1.0, 0.0],
//!         vec![9.0, 9.0, -1.0],
//!     ],
//! )
//! .unwrap();
//!
//! let config = EvaluationConfig::default(); // target 1, indicator last, threshold 0
//! let learner = LearnerRegistry::with_builtins().create("targetmean").unwrap();
//! let report = PrequentialRun::new(stream, learner, &config).unwrap().run().unwrap();
//!
//! assert_eq!(report.rows.len(), 1);
//! assert_eq!(report.rows[0].predicted, 2.0);
//! assert_eq!(report.summary.dropped, 1);
//! assert_eq!(report.summary.mae, Some(0.5));
//! ```
//!
//! # Modules
//!
//! - [`config`]: column indices, pass configuration and lenient option parsing
//! - [`instance`]: records and their schema
//! - [`stream`]: record sources (ARFF, CSV, in-memory)
//! - [`router`]: test/train/drop classification
//! - [`evaluator`]: prequential scoring and counters
//! - [`metrics`]: running and batch regression error
//! - [`learner`]: the regressor capability and built-in baselines
//! - [`sink`]: result row destinations
//! - [`harness`]: a complete pass

pub mod config;
pub mod error;
pub mod evaluator;
pub mod harness;
pub mod instance;
pub mod learner;
pub mod metrics;
pub mod prelude;
pub mod router;
pub mod sink;
pub mod stream;

pub use error::{NellyError, Result};
