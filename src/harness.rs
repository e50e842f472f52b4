//! One prequential pass, from configuration to summary.
//!
//! [`PrequentialRun`] binds a configuration to a source schema, initializes
//! the learner and then pulls records one at a time until the source is
//! exhausted or the record cap is reached. Each record goes through the
//! router and then the evaluator; test rows go to a [`ResultSink`].
//!
//! # Example
//!
//! ```
//! use nelly::config::{ColumnIndex, EvaluationConfig};
//! use nelly::harness::PrequentialRun;
//! use nelly::instance::{Attribute, InstanceHeader};
//! use nelly::learner::TargetMean;
//! use nelly::stream::VecStream;
//!
//! // columns: target, feature, indicator
//! let header = InstanceHeader::new(
//!     "demo",
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
//!     vec![vec![2.0, 0.1, 1.0], vec![4.0, 0.2, 1.0], vec![5.0, 0.3, 0.0]],
//! )
//! .unwrap();
//!
//! let config = EvaluationConfig::default().with_indicator_column(ColumnIndex::new(3));
//! let report = PrequentialRun::new(stream, TargetMean::new(), &config)
//!     .unwrap()
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(report.rows.len(), 1);
//! assert_eq!(report.rows[0].predicted, 3.0);
//! assert_eq!(report.summary.train_count, 2);
//! ```

use crate::config::EvaluationConfig;
use crate::error::{NellyError, Result};
use crate::evaluator::{EvaluationSummary, PrequentialEvaluator, ResultRow};
use crate::instance::InstanceHeader;
use crate::learner::{LearnerRegistry, Regressor};
use crate::router::StreamRouter;
use crate::sink::ResultSink;
use crate::stream::{open_source, InstanceStream};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column positions of a configuration resolved against a source schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// 0-based indicator position in the source schema
    pub indicator: usize,
    /// 0-based target position in the source schema
    pub target: usize,
    /// Schema presented to the learner: the source schema without the indicator
    pub learner_header: InstanceHeader,
}

/// Resolve the configured columns against the source `header`.
///
/// # Errors
///
/// Returns [`NellyError::InvalidColumn`] if either index does not designate
/// a column, if the target differs from the target the source was opened
/// with, or if both indices name the same column.
pub fn bind(config: &EvaluationConfig, header: &InstanceHeader) -> Result<Binding> {
    let n = header.num_attributes();
    let target = config.target_column.resolve(n, "target_column")?;
    if target != header.class_index() {
        return Err(NellyError::InvalidColumn {
            option: "target_column",
            reason: format!(
                "column {} does not match the source target column {}",
                target + 1,
                header.class_index() + 1
            ),
        });
    }

    let indicator = config.indicator_column.resolve(n, "indicator_column")?;
    if indicator == target {
        return Err(NellyError::InvalidColumn {
            option: "indicator_column",
            reason: format!("column {} is also the target column", indicator + 1),
        });
    }

    let mut learner_header = header.clone();
    learner_header.delete_attribute_at(indicator)?;

    Ok(Binding {
        indicator,
        target,
        learner_header,
    })
}

/// Rows and summary of a completed pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// One row per test record, in stream order
    pub rows: Vec<ResultRow>,
    /// Final counters
    pub summary: EvaluationSummary,
}

/// A configured pass over one source with one learner.
#[derive(Debug)]
pub struct PrequentialRun<S, L> {
    stream: S,
    router: StreamRouter,
    evaluator: PrequentialEvaluator<L>,
    max_records: Option<u64>,
}

impl<S: InstanceStream, L: Regressor> PrequentialRun<S, L> {
    /// Validate `config`, bind it to the schema of `stream` and initialize
    /// `learner`. No record is pulled.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configuration cannot be bound,
    /// or [`NellyError::Learner`] if the learner rejects the schema.
    pub fn new(stream: S, learner: L, config: &EvaluationConfig) -> Result<Self> {
        config.validate()?;
        let binding = bind(config, stream.header())?;
        let router = StreamRouter::new(binding.indicator, config.threshold)
            .with_threshold_subject(config.threshold_on);
        let evaluator = PrequentialEvaluator::new(learner, &binding.learner_header)?;

        tracing::info!(
            relation = stream.header().relation(),
            learner = evaluator.learner().name(),
            target = binding.target + 1,
            indicator = binding.indicator + 1,
            threshold = config.threshold,
            threshold_on = %config.threshold_on,
            max_records = ?config.max_records,
            "starting prequential evaluation"
        );

        Ok(Self {
            stream,
            router,
            evaluator,
            max_records: config.max_records,
        })
    }

    /// Run the pass to completion, handing every result row to `sink`.
    ///
    /// # Errors
    ///
    /// The first error aborts the pass; rows already accepted by `sink`
    /// stay there and [`ResultSink::finish`] is not called.
    pub fn run_into<K: ResultSink + ?Sized>(&mut self, sink: &mut K) -> Result<EvaluationSummary> {
        while self
            .max_records
            .map_or(true, |cap| self.evaluator.records() < cap)
        {
            let Some(next) = self.stream.next_instance() else {
                break;
            };
            let mut instance = next?;
            let record = self.evaluator.records() + 1;
            let route = self.router.route(&mut instance, record)?;
            if let Some(row) = self.evaluator.process(route, &instance)? {
                sink.accept(&row)?;
            }
        }
        sink.finish()?;

        let summary = self.evaluator.summary();
        tracing::info!(
            records = summary.records,
            test = summary.test_count,
            train = summary.train_count,
            dropped = summary.dropped,
            mae = ?summary.mae,
            rmse = ?summary.rmse,
            "prequential evaluation finished"
        );
        Ok(summary)
    }

    /// Run the pass to completion, collecting the rows.
    ///
    /// # Errors
    ///
    /// See [`PrequentialRun::run_into`].
    pub fn run(mut self) -> Result<EvaluationReport> {
        let mut rows = Vec::new();
        let summary = self.run_into(&mut rows)?;
        Ok(EvaluationReport { rows, summary })
    }

    /// The evaluator, with its counters and learner.
    #[must_use]
    pub fn evaluator(&self) -> &PrequentialEvaluator<L> {
        &self.evaluator
    }

    /// The router built from the configuration.
    #[must_use]
    pub fn router(&self) -> &StreamRouter {
        &self.router
    }

    /// Give the learner back.
    pub fn into_learner(self) -> L {
        self.evaluator.into_learner()
    }
}

/// Evaluate the learner named in `config` over the file at `path`.
///
/// # Errors
///
/// Returns any configuration, source, schema or learner error.
pub fn evaluate_file(
    path: impl AsRef<Path>,
    config: &EvaluationConfig,
    registry: &LearnerRegistry,
) -> Result<EvaluationReport> {
    config.validate()?;
    let learner = registry.create(&config.learner)?;
    let stream = open_source(path, config.target_column)?;
    PrequentialRun::new(stream, learner, config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnIndex, ThresholdSubject};
    use crate::instance::{Attribute, Instance};
    use crate::learner::TargetMean;
    use crate::stream::VecStream;

    fn header(class_index: usize) -> InstanceHeader {
        InstanceHeader::new(
            "t",
            vec![
                Attribute::numeric("a"),
                Attribute::numeric("b"),
                Attribute::numeric("c"),
            ],
            class_index,
        )
        .unwrap()
    }

    #[test]
    fn test_bind_defaults() {
        let binding = bind(&EvaluationConfig::default(), &header(0)).unwrap();
        assert_eq!(binding.target, 0);
        assert_eq!(binding.indicator, 2);
        assert_eq!(binding.learner_header.num_attributes(), 2);
        assert_eq!(binding.learner_header.class_index(), 0);
    }

    #[test]
    fn test_bind_indicator_before_target() {
        let config = EvaluationConfig::default()
            .with_target_column(ColumnIndex::LAST)
            .with_indicator_column(ColumnIndex::FIRST);
        let binding = bind(&config, &header(2)).unwrap();
        assert_eq!(binding.indicator, 0);
        assert_eq!(binding.learner_header.class_index(), 1);
        assert_eq!(binding.learner_header.class_attribute().name(), "c");
    }

    #[test]
    fn test_bind_rejects_bad_columns() {
        let same = EvaluationConfig::default().with_indicator_column(ColumnIndex::FIRST);
        assert!(matches!(
            bind(&same, &header(0)),
            Err(NellyError::InvalidColumn {
                option: "indicator_column",
                ..
            })
        ));

        let zero = EvaluationConfig::default().with_indicator_column(ColumnIndex::new(0));
        assert!(bind(&zero, &header(0)).is_err());

        let beyond = EvaluationConfig::default().with_indicator_column(ColumnIndex::new(4));
        assert!(bind(&beyond, &header(0)).is_err());

        let mismatch = EvaluationConfig::default().with_target_column(ColumnIndex::new(2));
        assert!(matches!(
            bind(&mismatch, &header(0)),
            Err(NellyError::InvalidColumn {
                option: "target_column",
                ..
            })
        ));
    }

    #[test]
    fn test_cap_limits_records_pulled() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![f64::from(i), 0.0, 1.0]).collect();
        let mut stream = VecStream::from_values(header(0), rows).unwrap();
        let config = EvaluationConfig::default().with_max_records(4);

        let summary = PrequentialRun::new(&mut stream, TargetMean::new(), &config)
            .unwrap()
            .run()
            .unwrap()
            .summary;
        assert_eq!(summary.records, 4);
        assert_eq!(summary.train_count, 4);
        assert_eq!(stream.pulled(), 4);
    }

    #[test]
    fn test_zero_cap_pulls_nothing() {
        let mut stream = VecStream::from_values(header(0), vec![vec![1.0, 0.0, 0.0]]).unwrap();
        let config = EvaluationConfig::default().with_max_records(0);
        let report = PrequentialRun::new(&mut stream, TargetMean::new(), &config)
            .unwrap()
            .run()
            .unwrap();
        assert!(report.rows.is_empty());
        assert_eq!(stream.pulled(), 0);
    }

    #[test]
    fn test_threshold_subject_reaches_router() {
        let stream = VecStream::from_values(
            header(0),
            vec![vec![1.0, 0.0, 5.0], vec![20.0, 0.0, 5.0], vec![3.0, 0.0, 0.0]],
        )
        .unwrap();
        let config = EvaluationConfig::default()
            .with_threshold(10.0)
            .with_threshold_subject(ThresholdSubject::Target);

        let run = PrequentialRun::new(stream, TargetMean::new(), &config).unwrap();
        assert_eq!(run.router().threshold(), 10.0);
        let report = run.run().unwrap();
        assert_eq!(report.summary.train_count, 1);
        assert_eq!(report.summary.dropped, 1);
        assert_eq!(report.rows[0].predicted, 20.0);
    }

    #[test]
    fn test_error_aborts_with_position() {
        let rows = vec![
            Instance::new(vec![1.0, 0.0, 1.0], 0).unwrap(),
            Instance::new(vec![f64::NAN, 0.0, 0.0], 0).unwrap(),
            Instance::new(vec![1.0, 0.0, 0.0], 0).unwrap(),
        ];
        let mut stream = VecStream::new(header(0), rows);
        let err = PrequentialRun::new(&mut stream, TargetMean::new(), &EvaluationConfig::default())
            .unwrap()
            .run()
            .unwrap_err();
        assert!(matches!(err, NellyError::MissingTarget { record: 2 }));
        assert_eq!(stream.remaining(), 1);
    }

    #[test]
    fn test_invalid_config_fails_before_pulling() {
        let mut stream = VecStream::from_values(header(0), vec![vec![1.0, 0.0, 0.0]]).unwrap();
        let config = EvaluationConfig::default().with_threshold(f64::NAN);
        assert!(PrequentialRun::new(&mut stream, TargetMean::new(), &config).is_err());
        assert_eq!(stream.pulled(), 0);
    }
}
