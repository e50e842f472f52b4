//! Configuration of a prequential pass.
//!
//! [`EvaluationConfig`] is the validated, immutable configuration handed to
//! the harness. [`RawOptions`] holds option values exactly as an operator
//! typed them; resolving it never fails. A value that cannot be parsed is
//! replaced by its documented default and reported as a [`ConfigWarning`].
//!
//! # Column indices
//!
//! Column indices are 1-based and refer to the columns of the source as
//! read, before any column is deleted. `-1` means "last column". Indices are
//! resolved to 0-based positions once, against the source header, by
//! [`ColumnIndex::resolve`].

use crate::error::{NellyError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A 1-based column index, or the "last column" sentinel `-1`.
///
/// # Examples
///
/// ```
/// use nelly::config::ColumnIndex;
///
/// assert_eq!(ColumnIndex::new(1).resolve(4, "target_column").unwrap(), 0);
/// assert_eq!(ColumnIndex::LAST.resolve(4, "indicator_column").unwrap(), 3);
/// assert!(ColumnIndex::new(0).resolve(4, "target_column").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnIndex(i64);

impl ColumnIndex {
    /// The "last column" sentinel.
    pub const LAST: ColumnIndex = ColumnIndex(-1);

    /// The first column.
    pub const FIRST: ColumnIndex = ColumnIndex(1);

    /// Wrap a raw index. Validity is only checked by [`ColumnIndex::resolve`].
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw index as supplied.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether this is the "last column" sentinel.
    #[must_use]
    pub const fn is_last(self) -> bool {
        self.0 == -1
    }

    /// Resolve to a 0-based position in a schema of `num_attributes` columns.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::InvalidColumn`] naming `option` when the index
    /// does not designate an existing column.
    pub fn resolve(self, num_attributes: usize, option: &'static str) -> Result<usize> {
        if num_attributes == 0 {
            return Err(NellyError::InvalidColumn {
                option,
                reason: "the schema has no columns".to_string(),
            });
        }
        if self.is_last() {
            return Ok(num_attributes - 1);
        }
        match usize::try_from(self.0) {
            Ok(position) if (1..=num_attributes).contains(&position) => Ok(position - 1),
            _ => Err(NellyError::InvalidColumn {
                option,
                reason: format!(
                    "{} is not a column of a schema with {num_attributes} columns (valid: 1..={num_attributes} or -1)",
                    self.0
                ),
            }),
        }
    }
}

impl Default for ColumnIndex {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for ColumnIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ColumnIndex {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// Value the training threshold is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdSubject {
    /// The indicator value of the record.
    #[default]
    Indicator,
    /// The target value of the record, once the indicator is removed.
    Target,
}

impl fmt::Display for ThresholdSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdSubject::Indicator => f.write_str("indicator"),
            ThresholdSubject::Target => f.write_str("target"),
        }
    }
}

impl FromStr for ThresholdSubject {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indicator" => Ok(ThresholdSubject::Indicator),
            "target" | "class" => Ok(ThresholdSubject::Target),
            other => Err(format!("unknown threshold subject '{other}'")),
        }
    }
}

/// Name of the learner used when none is configured.
pub const DEFAULT_LEARNER: &str = "targetmean";

/// Validated configuration of one prequential pass.
///
/// # Examples
///
/// ```
/// use nelly::config::{ColumnIndex, EvaluationConfig};
///
/// let config = EvaluationConfig::default()
///     .with_indicator_column(ColumnIndex::new(3))
///     .with_threshold(0.5)
///     .with_max_records(100);
/// assert_eq!(config.target_column, ColumnIndex::FIRST);
/// assert_eq!(config.max_records, Some(100));
/// ```
///
/// Deserializing goes through [`RawOptions`], so a value of the wrong type
/// falls back to its default instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawOptions")]
pub struct EvaluationConfig {
    /// Column holding the value to predict (default: first column)
    pub target_column: ColumnIndex,
    /// Column deciding test vs train (default: last column)
    pub indicator_column: ColumnIndex,
    /// Records with a non-zero indicator train only above this value (default: 0)
    pub threshold: f64,
    /// What the threshold is compared against (default: the indicator)
    pub threshold_on: ThresholdSubject,
    /// Maximum number of records pulled from the source (default: unbounded)
    pub max_records: Option<u64>,
    /// Registered learner name
    pub learner: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            target_column: ColumnIndex::FIRST,
            indicator_column: ColumnIndex::LAST,
            threshold: 0.0,
            threshold_on: ThresholdSubject::Indicator,
            max_records: None,
            learner: DEFAULT_LEARNER.to_string(),
        }
    }
}

impl EvaluationConfig {
    /// Set the target column.
    #[must_use]
    pub fn with_target_column(mut self, column: ColumnIndex) -> Self {
        self.target_column = column;
        self
    }

    /// Set the indicator column.
    #[must_use]
    pub fn with_indicator_column(mut self, column: ColumnIndex) -> Self {
        self.indicator_column = column;
        self
    }

    /// Set the training threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set what the threshold is compared against.
    #[must_use]
    pub fn with_threshold_subject(mut self, subject: ThresholdSubject) -> Self {
        self.threshold_on = subject;
        self
    }

    /// Stop after `max_records` records have been pulled from the source.
    #[must_use]
    pub fn with_max_records(mut self, max_records: u64) -> Self {
        self.max_records = Some(max_records);
        self
    }

    /// Process the source until it is exhausted.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.max_records = None;
        self
    }

    /// Select the learner by registered name.
    #[must_use]
    pub fn with_learner(mut self, learner: impl Into<String>) -> Self {
        self.learner = learner.into();
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults
    /// and unparsable values fall back as in [`RawOptions::resolve`].
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the result is invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let (config, _warnings) = RawOptions::from_json_str(json)?.resolve();
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check the values that can be checked without a schema.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::InvalidConfig`] for a NaN threshold or an empty
    /// learner name.
    pub fn validate(&self) -> Result<()> {
        if self.threshold.is_nan() {
            return Err(NellyError::InvalidConfig(
                "threshold must be a number".to_string(),
            ));
        }
        if self.learner.trim().is_empty() {
            return Err(NellyError::InvalidConfig(
                "learner name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A configuration value that could not be parsed and was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Option name
    pub option: &'static str,
    /// Value as supplied
    pub value: String,
    /// Description of the default that was substituted
    pub fallback: &'static str,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not parse {} '{}'; using {}",
            self.option, self.value, self.fallback
        )
    }
}

/// Option values as typed by an operator, before parsing.
///
/// `None` leaves the corresponding field of the base configuration alone.
/// In JSON every field may be a string, a number or a boolean; `null` is
/// the same as leaving the field out.
///
/// # Examples
///
/// ```
/// use nelly::config::{ColumnIndex, RawOptions};
///
/// let raw = RawOptions::from_json_str(r#"{ "target_column": "abc", "max_records": 10 }"#).unwrap();
/// let (config, warnings) = raw.resolve();
/// assert_eq!(config.target_column, ColumnIndex::FIRST);
/// assert_eq!(config.max_records, Some(10));
/// assert_eq!(warnings.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawOptions {
    /// 1-based target column, or `-1`
    #[serde(deserialize_with = "scalar_text")]
    pub target_column: Option<String>,
    /// 1-based indicator column, or `-1`
    #[serde(deserialize_with = "scalar_text")]
    pub indicator_column: Option<String>,
    /// Training threshold
    #[serde(deserialize_with = "scalar_text")]
    pub threshold: Option<String>,
    /// `indicator` or `target`
    #[serde(deserialize_with = "scalar_text")]
    pub threshold_on: Option<String>,
    /// Maximum records, or `unbounded`
    #[serde(deserialize_with = "scalar_text")]
    pub max_records: Option<String>,
    /// Learner name
    #[serde(deserialize_with = "scalar_text")]
    pub learner: Option<String>,
}

/// A JSON scalar as written in a configuration file.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

fn scalar_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Number(number) => number.to_string(),
        Scalar::Flag(flag) => flag.to_string(),
    }))
}

impl From<RawOptions> for EvaluationConfig {
    fn from(raw: RawOptions) -> Self {
        raw.resolve().0
    }
}

impl RawOptions {
    /// Parse option values from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::Json`] if the JSON is malformed or a field holds
    /// an array or an object.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load option values from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Resolve against the default configuration.
    #[must_use]
    pub fn resolve(&self) -> (EvaluationConfig, Vec<ConfigWarning>) {
        self.apply_to(EvaluationConfig::default())
    }

    /// Override fields of `base` with the supplied values.
    ///
    /// Unparsable values fall back to the documented defaults (not to the
    /// value in `base`); every fallback is returned and logged at warn level.
    #[must_use]
    pub fn apply_to(&self, base: EvaluationConfig) -> (EvaluationConfig, Vec<ConfigWarning>) {
        let mut config = base;
        let mut warnings = Vec::new();

        if let Some(raw) = &self.target_column {
            config.target_column = parse_or(raw, "target_column", "the first column", &mut warnings)
                .unwrap_or(ColumnIndex::FIRST);
        }
        if let Some(raw) = &self.indicator_column {
            config.indicator_column =
                parse_or(raw, "indicator_column", "the last column", &mut warnings)
                    .unwrap_or(ColumnIndex::LAST);
        }
        if let Some(raw) = &self.threshold {
            config.threshold = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|t| !t.is_nan())
                .unwrap_or_else(|| {
                    warn(&mut warnings, "threshold", raw, "0 as training threshold");
                    0.0
                });
        }
        if let Some(raw) = &self.threshold_on {
            config.threshold_on =
                parse_or(raw, "threshold_on", "the indicator value", &mut warnings)
                    .unwrap_or_default();
        }
        if let Some(raw) = &self.max_records {
            config.max_records = parse_max_records(raw, &mut warnings);
        }
        if let Some(raw) = &self.learner {
            let name = raw.trim().to_ascii_lowercase();
            config.learner = if name.is_empty() {
                warn(&mut warnings, "learner", raw, DEFAULT_LEARNER);
                DEFAULT_LEARNER.to_string()
            } else {
                name
            };
        }

        (config, warnings)
    }
}

fn parse_or<T: FromStr>(
    raw: &str,
    option: &'static str,
    fallback: &'static str,
    warnings: &mut Vec<ConfigWarning>,
) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn(warnings, option, raw, fallback);
            None
        }
    }
}

fn parse_max_records(raw: &str, warnings: &mut Vec<ConfigWarning>) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("unbounded") || trimmed.eq_ignore_ascii_case("all") {
        return None;
    }
    match trimmed.parse::<u64>() {
        Ok(cap) => Some(cap),
        Err(_) => {
            warn(warnings, "max_records", raw, "no record limit");
            None
        }
    }
}

fn warn(
    warnings: &mut Vec<ConfigWarning>,
    option: &'static str,
    value: &str,
    fallback: &'static str,
) {
    let warning = ConfigWarning {
        option,
        value: value.to_string(),
        fallback,
    };
    tracing::warn!(option, value, fallback, "{warning}");
    warnings.push(warning);
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
