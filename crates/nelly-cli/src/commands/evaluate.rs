//! Evaluate command: one prequential pass over a source file

use crate::error::{CliError, Result};
use crate::{output, EvaluateArgs, RowFormat};
use nelly::config::{ConfigWarning, EvaluationConfig, RawOptions};
use nelly::evaluator::EvaluationSummary;
use nelly::harness::PrequentialRun;
use nelly::learner::LearnerRegistry;
use nelly::sink::{CsvSink, JsonLinesSink, ResultSink};
use nelly::stream::open_source;
use std::fs::File;
use std::io::{BufWriter, Write};
use serde::Serialize;
use std::path::PathBuf;

/// Summary printed by `--json`.
#[derive(Serialize)]
struct JsonSummary<'a> {
    #[serde(flatten)]
    summary: &'a EvaluationSummary,
    warnings: Vec<String>,
}

/// Source used when `--arff` is not given.
fn default_input() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join("data.arff"))
        .ok_or(CliError::NoHomeDirectory)
}

fn raw_options(args: &EvaluateArgs) -> RawOptions {
    RawOptions {
        target_column: args.idx_class.clone(),
        indicator_column: args.idx_train.clone(),
        threshold: args.thr_train.clone(),
        threshold_on: args.threshold_on.clone(),
        max_records: args.max_records.clone(),
        learner: args.learner.clone(),
    }
}

fn open_sink(args: &EvaluateArgs) -> Result<Box<dyn ResultSink>> {
    let writer: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    let sink: Box<dyn ResultSink> = match args.format {
        RowFormat::Csv => {
            let sink = CsvSink::new(writer, args.layout);
            if args.no_header {
                Box::new(sink.without_header())
            } else {
                Box::new(sink)
            }
        }
        RowFormat::Jsonl => Box::new(JsonLinesSink::new(writer, args.layout)),
    };
    Ok(sink)
}

pub(crate) fn run(args: &EvaluateArgs, quiet: bool) -> Result<()> {
    let (base, mut warnings) = match &args.config {
        Some(path) => RawOptions::from_json_file(path)?.resolve(),
        None => (EvaluationConfig::default(), Vec::new()),
    };
    let (config, flag_warnings) = raw_options(args).apply_to(base);
    warnings.extend(flag_warnings);
    if quiet && !args.json {
        print_warnings(&warnings);
    }

    let input = match &args.input {
        Some(path) => path.clone(),
        None => default_input()?,
    };

    let registry = LearnerRegistry::with_builtins();
    let learner = registry.create(&config.learner)?;
    let stream = open_source(&input, config.target_column)?;
    let mut run = PrequentialRun::new(stream, learner, &config)?;

    let mut sink = open_sink(args)?;
    let summary = run.run_into(sink.as_mut())?;

    if args.json {
        let json = JsonSummary {
            summary: &summary,
            warnings: warnings.iter().map(ToString::to_string).collect(),
        };
        eprintln!("{}", serde_json::to_string(&json)?);
    } else if !quiet {
        output::summary(&summary, &warnings);
    }
    Ok(())
}

fn print_warnings(warnings: &[ConfigWarning]) {
    for w in warnings {
        output::warning(&w.to_string());
    }
}
