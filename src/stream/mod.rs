//! Record sources.
//!
//! A source yields its schema up front and then its records one at a time,
//! lazily and exactly once. The harness pulls synchronously; nothing here
//! buffers beyond the current line.

pub mod arff;
pub mod delimited;

pub use arff::ArffStream;
pub use delimited::CsvStream;

use crate::config::ColumnIndex;
use crate::error::{NellyError, Result};
use crate::instance::{Instance, InstanceHeader};
use std::path::Path;

/// A single-pass sequence of records sharing one schema.
pub trait InstanceStream {
    /// Schema of every record, with the target position set.
    fn header(&self) -> &InstanceHeader;

    /// Pull the next record; `None` once the source is exhausted.
    fn next_instance(&mut self) -> Option<Result<Instance>>;
}

impl<S: InstanceStream + ?Sized> InstanceStream for Box<S> {
    fn header(&self) -> &InstanceHeader {
        (**self).header()
    }

    fn next_instance(&mut self) -> Option<Result<Instance>> {
        (**self).next_instance()
    }
}

impl<S: InstanceStream + ?Sized> InstanceStream for &mut S {
    fn header(&self) -> &InstanceHeader {
        (**self).header()
    }

    fn next_instance(&mut self) -> Option<Result<Instance>> {
        (**self).next_instance()
    }
}

/// In-memory source.
///
/// # Examples
///
/// ```
/// use nelly::instance::{Attribute, InstanceHeader};
/// use nelly::stream::{InstanceStream, VecStream};
///
/// let header = InstanceHeader::new(
///     "mem",
///     vec![Attribute::numeric("y"), Attribute::numeric("flag")],
///     0,
/// )
/// .unwrap();
/// let mut stream = VecStream::from_values(header, vec![vec![1.0, 0.0]]).unwrap();
/// assert!(stream.next_instance().is_some());
/// assert!(stream.next_instance().is_none());
/// assert_eq!(stream.pulled(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct VecStream {
    header: InstanceHeader,
    rows: std::vec::IntoIter<Instance>,
    pulled: usize,
}

impl VecStream {
    /// Wrap already-built instances.
    #[must_use]
    pub fn new(header: InstanceHeader, rows: Vec<Instance>) -> Self {
        Self {
            header,
            rows: rows.into_iter(),
            pulled: 0,
        }
    }

    /// Build instances from raw rows laid out according to `header`.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::SchemaMismatch`] for a row of the wrong width.
    pub fn from_values(header: InstanceHeader, rows: Vec<Vec<f64>>) -> Result<Self> {
        let rows = rows
            .into_iter()
            .map(|values| Instance::with_header(values, &header))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(header, rows))
    }

    /// Number of records pulled so far.
    #[must_use]
    pub fn pulled(&self) -> usize {
        self.pulled
    }

    /// Number of records not pulled yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl InstanceStream for VecStream {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn next_instance(&mut self) -> Option<Result<Instance>> {
        let next = self.rows.next()?;
        self.pulled += 1;
        Some(Ok(next))
    }
}

/// Open a file source with the target at `target`.
///
/// Files with a `.csv` extension are read as CSV, everything else as ARFF.
///
/// # Errors
///
/// Returns [`NellyError::SourceNotFound`] if `path` does not exist, and any
/// error raised while reading the header.
pub fn open_source(path: impl AsRef<Path>, target: ColumnIndex) -> Result<Box<dyn InstanceStream>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(NellyError::SourceNotFound(path.to_path_buf()));
    }

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let stream: Box<dyn InstanceStream> = if is_csv {
        Box::new(CsvStream::open(path, target)?)
    } else {
        Box::new(ArffStream::open(path, target)?)
    };

    let header = stream.header();
    tracing::info!(
        path = %path.display(),
        relation = header.relation(),
        attributes = header.num_attributes(),
        target = header.class_attribute().name(),
        "opened source"
    );
    Ok(stream)
}
