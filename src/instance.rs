//! Records flowing through a prequential pass and the schema describing them.
//!
//! An [`Instance`] is a dense row of `f64` values: numeric attributes hold
//! their value, nominal attributes hold the index of their category and
//! missing values are stored as NaN. The instance remembers which position
//! holds the target so that deleting another attribute keeps the target
//! addressable without the caller recomputing its index.

use crate::error::{NellyError, Result};
use serde::{Deserialize, Serialize};

/// Value used to represent a missing attribute value.
pub const MISSING: f64 = f64::NAN;

/// Returns `true` if `value` encodes a missing attribute value.
#[inline]
#[must_use]
pub fn is_missing(value: f64) -> bool {
    value.is_nan()
}

/// Type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Real valued attribute.
    Numeric,
    /// Categorical attribute with its declared categories, in order.
    Nominal(Vec<String>),
}

/// A named, typed column of the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    kind: AttributeKind,
}

impl Attribute {
    /// Create a numeric attribute.
    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    /// Create a nominal attribute with the given categories.
    #[must_use]
    pub fn nominal<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Nominal(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute type.
    #[must_use]
    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    /// Whether the attribute is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, AttributeKind::Numeric)
    }

    /// Index of a category label, for nominal attributes.
    #[must_use]
    pub fn index_of_value(&self, label: &str) -> Option<usize> {
        match &self.kind {
            AttributeKind::Nominal(values) => values.iter().position(|v| v == label),
            AttributeKind::Numeric => None,
        }
    }
}

/// Schema of a stream: relation name, attributes and target position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HeaderFields")]
pub struct InstanceHeader {
    relation: String,
    attributes: Vec<Attribute>,
    class_index: usize,
}

impl InstanceHeader {
    /// Create a header whose target sits at the 0-based `class_index`.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::InvalidColumn`] if `class_index` is not a
    /// position of `attributes`.
    pub fn new(
        relation: impl Into<String>,
        attributes: Vec<Attribute>,
        class_index: usize,
    ) -> Result<Self> {
        if class_index >= attributes.len() {
            return Err(NellyError::InvalidColumn {
                option: "target_column",
                reason: format!(
                    "position {} does not exist in a schema of {} attributes",
                    class_index + 1,
                    attributes.len()
                ),
            });
        }
        Ok(Self {
            relation: relation.into(),
            attributes,
            class_index,
        })
    }

    /// Relation name.
    #[must_use]
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// All attributes, in column order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attribute at a 0-based position.
    #[must_use]
    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    /// Number of attributes, target included.
    #[must_use]
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// 0-based position of the target attribute.
    #[must_use]
    pub fn class_index(&self) -> usize {
        self.class_index
    }

    /// The target attribute.
    #[must_use]
    pub fn class_attribute(&self) -> &Attribute {
        &self.attributes[self.class_index]
    }

    /// Number of input attributes (everything but the target).
    #[must_use]
    pub fn num_features(&self) -> usize {
        self.attributes.len() - 1
    }

    /// Remove the attribute at `index`, shifting the target position if needed.
    ///
    /// # Errors
    ///
    /// Fails if `index` is out of range or names the target attribute.
    pub fn delete_attribute_at(&mut self, index: usize) -> Result<()> {
        if index >= self.attributes.len() {
            return Err(NellyError::InvalidColumn {
                option: "indicator_column",
                reason: format!(
                    "position {} does not exist in a schema of {} attributes",
                    index + 1,
                    self.attributes.len()
                ),
            });
        }
        if index == self.class_index {
            return Err(NellyError::InvalidColumn {
                option: "indicator_column",
                reason: format!("position {} is the target column", index + 1),
            });
        }
        self.attributes.remove(index);
        if index < self.class_index {
            self.class_index -= 1;
        }
        Ok(())
    }
}

/// Deserialized form of [`InstanceHeader`], checked by [`InstanceHeader::new`].
#[derive(Deserialize)]
struct HeaderFields {
    relation: String,
    attributes: Vec<Attribute>,
    class_index: usize,
}

impl TryFrom<HeaderFields> for InstanceHeader {
    type Error = NellyError;

    fn try_from(fields: HeaderFields) -> Result<Self> {
        Self::new(fields.relation, fields.attributes, fields.class_index)
    }
}

/// One record of the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InstanceFields")]
pub struct Instance {
    values: Vec<f64>,
    class_index: usize,
}

impl Instance {
    /// Create an instance whose target sits at the 0-based `class_index`.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::SchemaMismatch`] if `class_index` is outside `values`.
    pub fn new(values: Vec<f64>, class_index: usize) -> Result<Self> {
        if class_index >= values.len() {
            return Err(NellyError::SchemaMismatch {
                expected: class_index + 1,
                actual: values.len(),
            });
        }
        Ok(Self {
            values,
            class_index,
        })
    }

    /// Create an instance laid out according to `header`.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::SchemaMismatch`] if the value count differs
    /// from the header's attribute count.
    pub fn with_header(values: Vec<f64>, header: &InstanceHeader) -> Result<Self> {
        if values.len() != header.num_attributes() {
            return Err(NellyError::SchemaMismatch {
                expected: header.num_attributes(),
                actual: values.len(),
            });
        }
        Self::new(values, header.class_index())
    }

    /// All values, target included, in column order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at a 0-based position.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Number of attributes, target included.
    #[must_use]
    pub fn num_attributes(&self) -> usize {
        self.values.len()
    }

    /// 0-based position of the target value.
    #[must_use]
    pub fn class_index(&self) -> usize {
        self.class_index
    }

    /// Target value (NaN when missing).
    #[must_use]
    pub fn class_value(&self) -> f64 {
        self.values[self.class_index]
    }

    /// Input values: every value except the target, in column order.
    pub fn features(&self) -> impl Iterator<Item = f64> + '_ {
        let class_index = self.class_index;
        self.values
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != class_index)
            .map(|(_, v)| *v)
    }

    /// Remove the value at `index` and return it.
    ///
    /// Returns `None` (leaving the instance untouched) when `index` is out of
    /// range or is the target position.
    pub fn delete_attribute_at(&mut self, index: usize) -> Option<f64> {
        if index >= self.values.len() || index == self.class_index {
            return None;
        }
        let removed = self.values.remove(index);
        if index < self.class_index {
            self.class_index -= 1;
        }
        Some(removed)
    }
}

#[derive(Deserialize)]
struct InstanceFields {
    values: Vec<f64>,
    class_index: usize,
}

impl TryFrom<InstanceFields> for Instance {
    type Error = NellyError;

    fn try_from(fields: InstanceFields) -> Result<Self> {
        Self::new(fields.values, fields.class_index)
    }
}
