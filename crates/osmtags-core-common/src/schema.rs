//! Ordered layer schema built on Arrow field definitions.

use std::ops::Deref;

use arrow_schema::{DataType, Field};

/// Ordered set of named, typed columns of a layer.
///
/// Column positions are only stable until the next schema mutation, so
/// callers resolve indices with [`Fields::index_of`] right before using them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<Field>);

impl Fields {
    /// Creates a schema from an ordered list of fields.
    #[must_use]
    pub fn new(fields: Vec<Field>) -> Self {
        Self(fields)
    }

    /// Index of the first column called `name`.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|f| f.name() == name)
    }

    /// Returns `true` when a column called `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Column names in schema order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|f| f.name().as_str()).collect()
    }

    pub(crate) fn push(&mut self, field: Field) {
        self.0.push(field);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Field {
        self.0.remove(index)
    }

    pub(crate) fn replace(&mut self, index: usize, field: Field) {
        self.0[index] = field;
    }
}

impl Deref for Fields {
    type Target = [Field];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Field>> for Fields {
    fn from(fields: Vec<Field>) -> Self {
        Self(fields)
    }
}

/// Nullable text column, the type of every column produced from hstore keys.
#[must_use]
pub fn text_field(name: impl Into<String>) -> Field {
    Field::new(name, DataType::Utf8, true)
}
