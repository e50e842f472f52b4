//! Integration tests for Nelly.
//!
//! These tests drive complete passes from files and in-memory streams.

use nelly::prelude::*;
use nelly::error::LearnerOp;
use nelly::learner::TargetMean;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use tempfile::NamedTempFile;

fn arff_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".arff").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Target, two features, indicator; `n` records alternating train/test.
fn alternating_arff(n: usize) -> String {
    let mut content = String::from(
        "@relation alt\n@attribute y numeric\n@attribute x1 numeric\n@attribute x2 {a,b}\n@attribute flag numeric\n@data\n",
    );
    for i in 0..n {
        let flag = if i % 2 == 0 { 1 } else { 0 };
        let label = if i % 3 == 0 { "a" } else { "b" };
        content.push_str(&format!("{},{},{label},{flag}\n", i % 7, (i % 5) as f64 * 0.5));
    }
    content
}

#[test]
fn test_arff_pass_end_to_end() {
    let file = arff_file(&alternating_arff(10));
    let config = EvaluationConfig::default();
    let report = evaluate_file(file.path(), &config, &LearnerRegistry::with_builtins()).unwrap();

    assert_eq!(report.summary.records, 10);
    assert_eq!(report.summary.test_count, 5);
    assert_eq!(report.summary.train_count, 5);
    assert_eq!(report.summary.dropped, 0);
    assert_eq!(report.rows.len(), 5);

    // rows are in arrival order and interleave with training
    for (i, row) in report.rows.iter().enumerate() {
        assert_eq!(row.test_index, i as u64 + 1);
        assert_eq!(row.train_count, i as u64 + 1);
    }
}

#[test]
fn test_cap_of_100_on_longer_stream() {
    let file = arff_file(&alternating_arff(250));
    let config = EvaluationConfig::default().with_max_records(100);
    let report = evaluate_file(file.path(), &config, &LearnerRegistry::with_builtins()).unwrap();

    assert_eq!(report.summary.records, 100);
    assert_eq!(report.summary.test_count + report.summary.train_count, 100);
}

#[test]
fn test_unbounded_by_default() {
    let file = arff_file(&alternating_arff(250));
    let report = evaluate_file(
        file.path(),
        &EvaluationConfig::default(),
        &LearnerRegistry::with_builtins(),
    )
    .unwrap();
    assert_eq!(report.summary.records, 250);
}

#[test]
fn test_unparsable_target_index_falls_back_to_first_column() {
    let raw = RawOptions {
        target_column: Some("abc".to_string()),
        ..RawOptions::default()
    };
    let (config, warnings) = raw.resolve();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].option, "target_column");
    assert_eq!(config.target_column, ColumnIndex::FIRST);

    let file = arff_file(&alternating_arff(6));
    let report = evaluate_file(file.path(), &config, &LearnerRegistry::with_builtins()).unwrap();
    assert_eq!(report.summary.test_count, 3);
    // targetmean over y = 0, 2, 4 seen before the last test record
    assert_eq!(report.rows[2].predicted, 2.0);
}

#[test]
fn test_every_builtin_learner_completes_a_pass() {
    let registry = LearnerRegistry::with_builtins();
    let file = arff_file(&alternating_arff(40));
    for name in registry.names() {
        let config = EvaluationConfig::default().with_learner(name);
        let report = evaluate_file(file.path(), &config, &registry).unwrap();
        assert_eq!(report.summary.learner, name);
        assert_eq!(report.rows.len(), 20);
        assert!(report.summary.rmse.unwrap() + 1e-9 >= report.summary.mae.unwrap());
    }
}

#[test]
fn test_zero_length_stream() {
    let file = arff_file("@relation empty\n@attribute y numeric\n@attribute flag numeric\n@data\n");
    let report = evaluate_file(
        file.path(),
        &EvaluationConfig::default(),
        &LearnerRegistry::with_builtins(),
    )
    .unwrap();
    assert!(report.rows.is_empty());
    assert_eq!(report.summary.records, 0);
    assert_eq!(report.summary.test_count, 0);
    assert_eq!(report.summary.train_count, 0);
    assert_eq!(report.summary.mae, None);
}

/// Shared log of the values the learner was given.
#[derive(Default)]
struct Calls {
    predicted: Vec<Vec<f64>>,
    trained: Vec<Vec<f64>>,
    schema: Vec<String>,
}

struct Recorder(Rc<RefCell<Calls>>);

impl Regressor for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn set_model_context(&mut self, header: &InstanceHeader) -> Result<()> {
        self.0.borrow_mut().schema = header
            .attributes()
            .iter()
            .map(|a| a.name().to_string())
            .collect();
        Ok(())
    }

    fn predict(&self, instance: &Instance) -> Result<f64> {
        self.0.borrow_mut().predicted.push(instance.values().to_vec());
        Ok(0.0)
    }

    fn train_on_instance(&mut self, instance: &Instance) -> Result<()> {
        self.0.borrow_mut().trained.push(instance.values().to_vec());
        Ok(())
    }

    fn n_samples_seen(&self) -> u64 {
        self.0.borrow().trained.len() as u64
    }
}

#[test]
fn test_learner_never_sees_indicator_or_dropped_records() {
    let header = InstanceHeader::new(
        "net",
        vec![
            Attribute::numeric("flag"),
            Attribute::numeric("x"),
            Attribute::numeric("y"),
        ],
        2,
    )
    .unwrap();
    let stream = VecStream::from_values(
        header,
        vec![
            vec![0.0, 1.0, 10.0],
            vec![1.0, 2.0, 20.0],
            vec![-3.0, 3.0, 30.0],
            vec![0.5, 4.0, 40.0],
        ],
    )
    .unwrap();
    let config = EvaluationConfig::default()
        .with_target_column(ColumnIndex::LAST)
        .with_indicator_column(ColumnIndex::FIRST)
        .with_threshold(0.75);

    let calls = Rc::new(RefCell::new(Calls::default()));
    let summary = PrequentialRun::new(stream, Recorder(Rc::clone(&calls)), &config)
        .unwrap()
        .run()
        .unwrap()
        .summary;

    let calls = calls.borrow();
    assert_eq!(calls.schema, vec!["x", "y"]);
    assert_eq!(calls.predicted, vec![vec![1.0, 10.0]]);
    assert_eq!(calls.trained, vec![vec![2.0, 20.0]]);
    assert_eq!(summary.dropped, 2);
}

#[test]
fn test_learner_failure_reports_record() {
    struct Exploding;
    impl Regressor for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }
        fn set_model_context(&mut self, _header: &InstanceHeader) -> Result<()> {
            Ok(())
        }
        fn predict(&self, _instance: &Instance) -> Result<f64> {
            Err(NellyError::model("boom"))
        }
        fn train_on_instance(&mut self, _instance: &Instance) -> Result<()> {
            Ok(())
        }
        fn n_samples_seen(&self) -> u64 {
            0
        }
    }

    let file = arff_file(&alternating_arff(4));
    let stream = open_source(file.path(), ColumnIndex::FIRST).unwrap();
    let err = PrequentialRun::new(stream, Exploding, &EvaluationConfig::default())
        .unwrap()
        .run()
        .unwrap_err();
    match err {
        NellyError::Learner {
            record, operation, ..
        } => {
            assert_eq!(record, 2);
            assert_eq!(operation, LearnerOp::Predict);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_csv_sink_output_file() {
    let source = arff_file(&alternating_arff(4));
    let out = NamedTempFile::new().unwrap();

    let stream = open_source(source.path(), ColumnIndex::FIRST).unwrap();
    let mut run =
        PrequentialRun::new(stream, TargetMean::new(), &EvaluationConfig::default()).unwrap();
    let mut sink = CsvSink::new(std::fs::File::create(out.path()).unwrap(), RowLayout::Basic);
    let summary = run.run_into(&mut sink).unwrap();
    assert_eq!(summary.test_count, 2);

    let content = std::fs::read_to_string(out.path()).unwrap();
    assert_eq!(
        content,
        "testIndex,trainCount,predicted,actual\n1,1,0,1\n2,2,1,3\n"
    );
}

#[test]
fn test_config_from_json_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"indicator_column": 4, "threshold": 0.5, "max_records": 10, "learner": "sgd"}}"#
    )
    .unwrap();

    let config = EvaluationConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.indicator_column, ColumnIndex::new(4));
    assert_eq!(config.threshold, 0.5);
    assert_eq!(config.max_records, Some(10));
    assert_eq!(config.learner, "sgd");
    assert_eq!(config.target_column, ColumnIndex::FIRST);
}
