//! Destinations for result rows.
//!
//! Rows arrive in stream order, one per test record. A sink may buffer; the
//! harness calls [`ResultSink::finish`] once after the last row.

use crate::error::{NellyError, Result};
use crate::evaluator::ResultRow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Column set of an emitted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowLayout {
    /// `testIndex,trainCount,predicted,actual`
    Basic,
    /// Basic columns followed by `error,mae,rmse`
    #[default]
    Extended,
}

impl RowLayout {
    /// Column names, in order.
    #[must_use]
    pub fn columns(self) -> &'static [&'static str] {
        const COLUMNS: [&str; 7] = [
            "testIndex",
            "trainCount",
            "predicted",
            "actual",
            "error",
            "mae",
            "rmse",
        ];
        match self {
            RowLayout::Basic => &COLUMNS[..4],
            RowLayout::Extended => &COLUMNS,
        }
    }
}

impl fmt::Display for RowLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLayout::Basic => f.write_str("basic"),
            RowLayout::Extended => f.write_str("extended"),
        }
    }
}

impl FromStr for RowLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(RowLayout::Basic),
            "extended" => Ok(RowLayout::Extended),
            other => Err(format!("unknown row layout '{other}' (basic, extended)")),
        }
    }
}

/// Receives result rows in stream order.
pub trait ResultSink {
    /// Consume one row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    fn accept(&mut self, row: &ResultRow) -> Result<()>;

    /// Flush buffered output. Called once after the last row.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered output cannot be written.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl ResultSink for Vec<ResultRow> {
    fn accept(&mut self, row: &ResultRow) -> Result<()> {
        self.push(*row);
        Ok(())
    }
}

impl<K: ResultSink + ?Sized> ResultSink for &mut K {
    fn accept(&mut self, row: &ResultRow) -> Result<()> {
        (**self).accept(row)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

impl<K: ResultSink + ?Sized> ResultSink for Box<K> {
    fn accept(&mut self, row: &ResultRow) -> Result<()> {
        (**self).accept(row)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Writes rows as comma separated lines.
///
/// # Examples
///
/// ```
/// use nelly::evaluator::ResultRow;
/// use nelly::sink::{CsvSink, ResultSink, RowLayout};
///
/// let mut sink = CsvSink::new(Vec::new(), RowLayout::Basic);
/// sink.accept(&ResultRow {
///     test_index: 1,
///     train_count: 0,
///     predicted: 0.0,
///     actual: 2.5,
///     error: 2.5,
///     mae: 2.5,
///     rmse: 2.5,
/// })
/// .unwrap();
/// sink.finish().unwrap();
///
/// let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
/// assert_eq!(out, "testIndex,trainCount,predicted,actual\n1,0,0,2.5\n");
/// ```
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    layout: RowLayout,
    header: bool,
    header_written: bool,
    rows: u64,
}

impl<W: Write> CsvSink<W> {
    /// Create a sink that starts with a header line.
    pub fn new(writer: W, layout: RowLayout) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
            layout,
            header: true,
            header_written: false,
            rows: 0,
        }
    }

    /// Do not write a header line.
    #[must_use]
    pub fn without_header(mut self) -> Self {
        self.header = false;
        self
    }

    /// Rows written so far.
    #[must_use]
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered rows cannot be flushed.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| NellyError::Io(e.into_error()))
    }

    fn write_header(&mut self) -> Result<()> {
        if self.header && !self.header_written {
            self.writer.write_record(self.layout.columns())?;
            self.header_written = true;
        }
        Ok(())
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn accept(&mut self, row: &ResultRow) -> Result<()> {
        self.write_header()?;
        self.writer.write_record(row.fields(self.layout))?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.write_header()?;
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BasicRow {
    test_index: u64,
    train_count: u64,
    predicted: f64,
    actual: f64,
}

/// Writes one JSON object per row and line.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    layout: RowLayout,
}

impl<W: Write> JsonLinesSink<W> {
    /// Create a sink emitting the columns of `layout`.
    pub fn new(writer: W, layout: RowLayout) -> Self {
        Self { writer, layout }
    }

    /// Return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn accept(&mut self, row: &ResultRow) -> Result<()> {
        match self.layout {
            RowLayout::Basic => serde_json::to_writer(
                &mut self.writer,
                &BasicRow {
                    test_index: row.test_index,
                    train_count: row.train_count,
                    predicted: row.predicted,
                    actual: row.actual,
                },
            )?,
            RowLayout::Extended => serde_json::to_writer(&mut self.writer, row)?,
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
