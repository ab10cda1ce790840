//! The layer capability through which transforms reach a feature store.
//!
//! Transforms never touch a store directly. They borrow a [`Layer`] for the
//! duration of a call and go through its data operations: listing features,
//! adding columns, converting a column to text, removing a column and writing
//! attribute values.
//! [`MemoryLayer`] is the store used by the file drivers.

use std::collections::BTreeMap;

use arrow_schema::{DataType, Field};
use log::debug;
use thiserror::Error;

use crate::feature::{Feature, FeatureId};
use crate::schema::Fields;
use crate::value::AttributeValue;

/// Errors raised by a layer store when a mutation cannot be applied.
#[derive(Debug, Error, PartialEq)]
pub enum LayerError {
    /// No feature carries the given identifier.
    #[error("Feature {id} does not exist in layer '{layer}'")]
    FeatureNotFound {
        /// Layer name
        layer: String,
        /// Requested feature id
        id: FeatureId,
    },

    /// A column index was outside the current schema.
    #[error("Column index {index} is out of range for layer '{layer}' ({count} columns)")]
    ColumnOutOfRange {
        /// Layer name
        layer: String,
        /// Requested index
        index: usize,
        /// Number of columns in the schema
        count: usize,
    },

    /// A column with the same name already exists.
    #[error("Column '{name}' already exists in layer '{layer}'")]
    DuplicateColumn {
        /// Layer name
        layer: String,
        /// Column name
        name: String,
    },

    /// The store refused the operation.
    #[error("Layer '{layer}' is read-only")]
    ReadOnly {
        /// Layer name
        layer: String,
    },
}

/// Result alias for layer store operations.
pub type LayerResult<T> = std::result::Result<T, LayerError>;

/// Mutable access to a vector layer owned by the caller.
///
/// Implementations must keep every feature's attributes aligned with
/// [`Layer::fields`]: adding columns appends null attributes, removing a
/// column drops the attribute at that position.
pub trait Layer {
    /// Display name of the layer.
    fn name(&self) -> &str;

    /// Whether the layer is usable at all. Stores that can be opened in a
    /// broken state override this.
    fn is_valid(&self) -> bool {
        true
    }

    /// Current schema. Call again after a schema mutation to see the new columns.
    fn fields(&self) -> Fields;

    /// Snapshot of every feature in the layer.
    fn features(&self) -> Vec<Feature>;

    /// Appends columns to the schema.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::DuplicateColumn`] if a name is already taken.
    fn add_columns(&mut self, fields: Vec<Field>) -> LayerResult<()>;

    /// Removes the column at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::ColumnOutOfRange`] for an unknown index.
    fn remove_column(&mut self, index: usize) -> LayerResult<()>;

    /// Retypes the column at `index` as nullable `Utf8` and rewrites its
    /// non-null values as their text form.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::ColumnOutOfRange`] for an unknown index.
    fn convert_column_to_text(&mut self, index: usize) -> LayerResult<()>;

    /// Writes attribute values of one feature, addressed by column index.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::FeatureNotFound`] or [`LayerError::ColumnOutOfRange`].
    fn write_attributes(
        &mut self,
        id: FeatureId,
        values: BTreeMap<usize, AttributeValue>,
    ) -> LayerResult<()>;
}

/// In-memory layer store.
#[derive(Debug, Clone, Default)]
pub struct MemoryLayer {
    name: String,
    fields: Fields,
    features: Vec<Feature>,
    next_id: u64,
}

impl MemoryLayer {
    /// Creates an empty layer with the given schema.
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Fields) -> Self {
        Self {
            name: name.into(),
            fields,
            features: Vec::new(),
            next_id: 0,
        }
    }

    /// Appends a feature and returns its assigned id. The attribute vector is
    /// padded with nulls (or truncated) to the schema width.
    pub fn push_feature(
        &mut self,
        mut attributes: Vec<AttributeValue>,
        geometry: Option<geojson::Geometry>,
    ) -> FeatureId {
        attributes.resize(self.fields.len(), AttributeValue::Null);
        let id = FeatureId(self.next_id);
        self.next_id += 1;
        self.features
            .push(Feature::new(id, attributes).with_geometry(geometry));
        id
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` when the layer holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Borrow a feature by id.
    #[must_use]
    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    /// Iterate the features without cloning them.
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    fn out_of_range(&self, index: usize) -> LayerError {
        LayerError::ColumnOutOfRange {
            layer: self.name.clone(),
            index,
            count: self.fields.len(),
        }
    }
}

impl Layer for MemoryLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> Fields {
        self.fields.clone()
    }

    fn features(&self) -> Vec<Feature> {
        self.features.clone()
    }

    fn add_columns(&mut self, fields: Vec<Field>) -> LayerResult<()> {
        for (i, field) in fields.iter().enumerate() {
            let taken = self.fields.contains(field.name())
                || fields[..i].iter().any(|f| f.name() == field.name());
            if taken {
                return Err(LayerError::DuplicateColumn {
                    layer: self.name.clone(),
                    name: field.name().clone(),
                });
            }
        }

        let added = fields.len();
        for field in fields {
            self.fields.push(field);
        }
        let width = self.fields.len();
        for feature in &mut self.features {
            feature.attributes.resize(width, AttributeValue::Null);
        }
        debug!("Layer '{}': added {added} column(s)", self.name);
        Ok(())
    }

    fn remove_column(&mut self, index: usize) -> LayerResult<()> {
        if index >= self.fields.len() {
            return Err(self.out_of_range(index));
        }
        let removed = self.fields.remove(index);
        for feature in &mut self.features {
            if index < feature.attributes.len() {
                feature.attributes.remove(index);
            }
        }
        debug!("Layer '{}': removed column '{}'", self.name, removed.name());
        Ok(())
    }

    fn convert_column_to_text(&mut self, index: usize) -> LayerResult<()> {
        let field = self
            .fields
            .get(index)
            .ok_or_else(|| self.out_of_range(index))?
            .clone()
            .with_data_type(DataType::Utf8)
            .with_nullable(true);
        self.fields.replace(index, field);
        for feature in &mut self.features {
            if let Some(value) = feature.attributes.get_mut(index) {
                if !value.is_null() && value.as_text().is_none() {
                    *value = AttributeValue::Text(value.to_string());
                }
            }
        }
        debug!("Layer '{}': column {index} converted to text", self.name);
        Ok(())
    }

    fn write_attributes(
        &mut self,
        id: FeatureId,
        values: BTreeMap<usize, AttributeValue>,
    ) -> LayerResult<()> {
        let width = self.fields.len();
        if let Some((&index, _)) = values.iter().find(|(index, _)| **index >= width) {
            return Err(self.out_of_range(index));
        }

        let layer = &self.name;
        let feature = self
            .features
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| LayerError::FeatureNotFound {
                layer: layer.clone(),
                id,
            })?;
        feature.attributes.resize(width, AttributeValue::Null);
        for (index, value) in values {
            feature.attributes[index] = value;
        }
        Ok(())
    }
}
