//! Loading `GeoJSON` documents into a [`MemoryLayer`].

use std::path::Path;

use anyhow::Result;
use arrow_schema::{DataType, Field};
use geojson::JsonValue;
use log::{debug, info};
use osmtags_core_common::{AttributeValue, Fields, FormatReadError, LayerReader, MemoryLayer};

use crate::parser::{FeatureRecord, describe_value, parse_geojson_bytes};

/// Reads `GeoJSON` files and `GeoJSON` sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoJsonReader;

impl LayerReader for GeoJsonReader {
    fn read_layer(&self, path: &Path) -> Result<MemoryLayer> {
        let context = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| FormatReadError::Io {
            source,
            context: Some(context.clone()),
        })?;
        let records = parse_geojson_bytes(&bytes, context.as_str())?;
        info!("Parsed {} GeoJSON feature(s) from {context}", records.len());
        Ok(records_to_layer(layer_name(path), records))
    }
}

/// Layer name derived from the file stem.
#[must_use]
pub fn layer_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "layer".to_string(), |s| s.to_string_lossy().into_owned())
}

/// Builds a layer from parsed records.
///
/// Columns are the union of property names in first-seen order. Each column
/// is typed after its values, falling back to text when they disagree; values
/// are then converted to the column type so every cell matches its schema.
#[must_use]
pub fn records_to_layer(name: impl Into<String>, records: Vec<FeatureRecord>) -> MemoryLayer {
    let mut columns: Vec<(String, DataType)> = Vec::new();
    for record in &records {
        for (key, value) in &record.properties {
            let value_type = json_data_type(value);
            match columns.iter_mut().find(|(name, _)| name == key) {
                Some((_, data_type)) => *data_type = merge_types(data_type, &value_type),
                None => {
                    debug!("New GeoJSON property '{key}' ({})", describe_value(value));
                    columns.push((key.clone(), value_type));
                },
            }
        }
    }

    let fields = Fields::new(
        columns
            .iter()
            .map(|(name, data_type)| Field::new(name, data_type.clone(), true))
            .collect(),
    );
    let mut layer = MemoryLayer::new(name, fields);
    for mut record in records {
        let attributes = columns
            .iter()
            .map(|(name, data_type)| {
                let value = record
                    .properties
                    .remove(name)
                    .map_or(AttributeValue::Null, json_to_attribute);
                coerce(value, data_type)
            })
            .collect();
        layer.push_feature(attributes, record.geometry);
    }
    layer
}

/// Converts a JSON property value to an attribute value.
#[must_use]
pub fn json_to_attribute(value: JsonValue) -> AttributeValue {
    match value {
        JsonValue::Null => AttributeValue::Null,
        JsonValue::Bool(v) => AttributeValue::Bool(v),
        JsonValue::Number(n) => match n.as_i64() {
            Some(v) => AttributeValue::Int(v),
            None => n.as_f64().map_or(AttributeValue::Null, AttributeValue::Float),
        },
        JsonValue::String(s) => AttributeValue::Text(s),
        nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => {
            AttributeValue::Text(nested.to_string())
        },
    }
}

fn coerce(value: AttributeValue, data_type: &DataType) -> AttributeValue {
    match (value, data_type) {
        (AttributeValue::Int(v), DataType::Float64) => AttributeValue::Float(v as f64),
        (
            value @ (AttributeValue::Bool(_) | AttributeValue::Int(_) | AttributeValue::Float(_)),
            DataType::Utf8,
        ) => {
            AttributeValue::Text(value.to_string())
        },
        (value, _) => value,
    }
}

fn json_data_type(value: &JsonValue) -> DataType {
    match value {
        JsonValue::Null => DataType::Null,
        JsonValue::Bool(_) => DataType::Boolean,
        JsonValue::Number(n) if n.is_i64() => DataType::Int64,
        JsonValue::Number(_) => DataType::Float64,
        JsonValue::String(_) | JsonValue::Array(_) | JsonValue::Object(_) => DataType::Utf8,
    }
}

fn merge_types(current: &DataType, next: &DataType) -> DataType {
    match (current, next) {
        (a, b) if a == b => a.clone(),
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        },
        _ => DataType::Utf8,
    }
}
