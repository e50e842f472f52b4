//! nelly - prequential evaluation of online regressors
//!
//! Usage:
//!   nelly evaluate --arff flows.arff                  # learner targetmean, rows to stdout
//!   nelly evaluate --arff flows.arff -o rows.csv      # rows to a file
//!   nelly evaluate --idx-train 5 --thr-train 0.5      # indicator column 5, threshold 0.5
//!   nelly evaluate --learner sgd --max-records 1000   # stop after 1000 records
//!   nelly learners                                    # list built-in learners

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use nelly::sink::RowLayout;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

mod commands;
mod error;
mod output;

/// nelly - Prequential evaluation tool
///
/// Replays a labelled stream through an online regressor in test-then-train
/// order and reports one row per test record.
#[derive(Parser, Debug)]
#[command(name = "nelly")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one prequential pass over a source file
    Evaluate(EvaluateArgs),

    /// List the built-in learners
    Learners {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Encoding of the result rows.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RowFormat {
    /// Comma separated lines
    Csv,
    /// One JSON object per line
    Jsonl,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Source file, ARFF or CSV (default: $HOME/data.arff)
    #[arg(long = "arff", visible_alias = "input", value_name = "FILE")]
    pub(crate) input: Option<PathBuf>,

    /// Write result rows to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub(crate) out: Option<PathBuf>,

    /// JSON configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    /// Learner name (see `nelly learners`)
    #[arg(short, long)]
    pub(crate) learner: Option<String>,

    /// 1-based target column, -1 for the last column (default: 1)
    #[arg(long = "idx-class", value_name = "INDEX", allow_hyphen_values = true)]
    pub(crate) idx_class: Option<String>,

    /// 1-based indicator column, -1 for the last column (default: -1)
    #[arg(long = "idx-train", value_name = "INDEX", allow_hyphen_values = true)]
    pub(crate) idx_train: Option<String>,

    /// Training threshold (default: 0)
    #[arg(long = "thr-train", value_name = "VALUE", allow_hyphen_values = true)]
    pub(crate) thr_train: Option<String>,

    /// Compare the threshold against the indicator or the target
    #[arg(long, value_name = "SUBJECT")]
    pub(crate) threshold_on: Option<String>,

    /// Stop after N records (default: the whole source)
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    pub(crate) max_records: Option<String>,

    /// Row columns: basic or extended (adds error, mae, rmse)
    #[arg(long, default_value_t = RowLayout::Extended)]
    pub(crate) layout: RowLayout,

    /// Row encoding
    #[arg(long, value_enum, default_value_t = RowFormat::Csv)]
    pub(crate) format: RowFormat,

    /// Omit the CSV header line
    #[arg(long)]
    pub(crate) no_header: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Evaluate(args) => commands::evaluate::run(args, cli.quiet),
        Commands::Learners { json } => commands::learners::run(*json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            e.exit_code()
        }
    }
}
