//! CSV reader for all-numeric streams.
//!
//! The first row names the attributes; every column is numeric. Empty cells
//! and `?` are missing values. The relation is named after the file stem.

use super::InstanceStream;
use crate::config::ColumnIndex;
use crate::error::{NellyError, Result};
use crate::instance::{Attribute, Instance, InstanceHeader, MISSING};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Lazy CSV record source.
pub struct CsvStream<R> {
    records: csv::StringRecordsIntoIter<R>,
    header: InstanceHeader,
}

impl CsvStream<File> {
    /// Open a CSV file with the target at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or has no header row.
    pub fn open(path: impl AsRef<Path>, target: ColumnIndex) -> Result<Self> {
        let path = path.as_ref();
        let relation = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();
        let file = File::open(path)?;
        Self::from_reader(file, relation, target)
    }
}

impl<R: Read> CsvStream<R> {
    /// Read the header row from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::Parse`] when there is no header row and
    /// [`NellyError::InvalidColumn`] if `target` is not a column.
    pub fn from_reader(reader: R, relation: impl Into<String>, target: ColumnIndex) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let attributes: Vec<Attribute> = reader.headers()?.iter().map(Attribute::numeric).collect();
        if attributes.is_empty() || attributes.iter().all(|a| a.name().is_empty()) {
            return Err(NellyError::Parse {
                line: 1,
                message: "missing header row".to_string(),
            });
        }

        let class_index = target.resolve(attributes.len(), "target_column")?;
        let header = InstanceHeader::new(relation, attributes, class_index)?;

        Ok(Self {
            records: reader.into_records(),
            header,
        })
    }

    fn parse_record(&self, record: &csv::StringRecord) -> Result<Instance> {
        let line = record.position().map_or(0, |p| p.line() as usize);
        let values = record
            .iter()
            .zip(self.header.attributes())
            .map(|(cell, attribute)| match cell {
                "" | "?" => Ok(MISSING),
                _ => cell.parse::<f64>().map_err(|_| NellyError::Parse {
                    line,
                    message: format!("'{cell}' is not a number ({})", attribute.name()),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Instance::with_header(values, &self.header)
    }
}

impl<R: Read> InstanceStream for CsvStream<R> {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn next_instance(&mut self) -> Option<Result<Instance>> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        Some(self.parse_record(&record))
    }
}
