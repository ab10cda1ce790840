//! Data types describing datasets and discovered tags.

/// Information about a dataset.
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    /// Path to the dataset
    pub dataset: String,
    /// Driver name
    pub driver: String,
    /// Driver long name
    pub driver_long_name: String,
    /// Number of features
    pub feature_count: usize,
    /// Number of features with a geometry
    pub geometry_count: usize,
    /// Schema fields
    pub fields: Vec<FieldInfo>,
}

/// Information about a field/column.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Data type
    pub data_type: String,
    /// Whether the field is nullable
    pub nullable: bool,
}

/// A hstore key and the number of features carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Tag key
    pub key: String,
    /// Number of features with this key
    pub feature_count: usize,
}
