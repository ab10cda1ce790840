//! Feature records held by a layer.

use std::fmt;

use geojson::Geometry;

use crate::schema::Fields;
use crate::value::AttributeValue;

/// Stable identifier of a feature within its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(pub u64);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A feature: an identifier, positional attributes aligned with the layer
/// schema, and an optional geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub attributes: Vec<AttributeValue>,
    pub geometry: Option<Geometry>,
}

impl Feature {
    #[must_use]
    pub fn new(id: FeatureId, attributes: Vec<AttributeValue>) -> Self {
        Self {
            id,
            attributes,
            geometry: None,
        }
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: Option<Geometry>) -> Self {
        self.geometry = geometry;
        self
    }

    /// Attribute at a column position. Missing trailing attributes read as null.
    #[must_use]
    pub fn attribute(&self, index: usize) -> &AttributeValue {
        const NULL: &AttributeValue = &AttributeValue::Null;
        self.attributes.get(index).unwrap_or(NULL)
    }

    /// Attribute of the column called `name`, or `None` if the column does not exist.
    #[must_use]
    pub fn attribute_by_name<'a>(
        &'a self,
        fields: &Fields,
        name: &str,
    ) -> Option<&'a AttributeValue> {
        fields.index_of(name).map(|index| self.attribute(index))
    }
}
