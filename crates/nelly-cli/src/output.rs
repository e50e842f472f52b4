//! Output formatting utilities
//!
//! Result rows go to stdout or `--out`; everything meant for the operator
//! goes to stderr.

use colored::Colorize;
use nelly::config::ConfigWarning;
use nelly::evaluator::EvaluationSummary;

/// Print a section header
pub(crate) fn section(title: &str) {
    eprintln!("\n{}", format!("=== {title} ===").cyan().bold());
}

/// Print a key-value pair
pub(crate) fn kv(key: &str, value: impl std::fmt::Display) {
    eprintln!("  {}: {}", key.white().bold(), value);
}

/// Print a warning message
pub(crate) fn warning(msg: &str) {
    eprintln!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// Print an error message
pub(crate) fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

fn metric(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.6}"))
}

/// Print the summary of a pass as a table
pub(crate) fn summary(summary: &EvaluationSummary, warnings: &[ConfigWarning]) {
    section("Prequential evaluation");
    kv("learner", &summary.learner);
    kv("records", summary.records);
    kv("test records", summary.test_count);
    kv("train records", summary.train_count);
    kv("dropped", summary.dropped);
    kv("MAE", metric(summary.mae));
    kv("RMSE", metric(summary.rmse));
    for w in warnings {
        warning(&w.to_string());
    }
}
