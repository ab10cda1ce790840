//! `GeoJSON` writer for [`MemoryLayer`]s.

use std::fs::File;
use std::io::{BufWriter, Write as IoWrite};
use std::path::Path;

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use log::info;
use osmtags_core_common::{AttributeValue, Layer, LayerWriter, MemoryLayer};

/// Options for `GeoJSON` writing
#[derive(Debug, Clone, Default)]
pub struct GeoJsonWriterOptions {
    /// Pretty-print the output (default: false)
    pub pretty: bool,
    /// Omit properties whose value is null (default: false)
    pub skip_nulls: bool,
}

impl GeoJsonWriterOptions {
    /// Create new writer options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set pretty printing
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set whether null properties are dropped
    #[must_use]
    pub fn with_skip_nulls(mut self, skip_nulls: bool) -> Self {
        self.skip_nulls = skip_nulls;
        self
    }
}

/// Writes layers as a `GeoJSON` `FeatureCollection`.
#[derive(Debug, Default, Clone)]
pub struct GeoJsonWriter {
    options: GeoJsonWriterOptions,
}

impl GeoJsonWriter {
    #[must_use]
    pub fn new(options: GeoJsonWriterOptions) -> Self {
        Self { options }
    }
}

impl LayerWriter for GeoJsonWriter {
    fn write_layer(&self, layer: &MemoryLayer, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_geojson(&mut writer, layer, &self.options)?;
        writer.flush()?;
        info!("Wrote {} feature(s) to {}", layer.len(), path.display());
        Ok(())
    }
}

/// Serializes a layer as a `FeatureCollection`.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn write_geojson<W: IoWrite>(
    writer: &mut W,
    layer: &MemoryLayer,
    options: &GeoJsonWriterOptions,
) -> Result<()> {
    let collection = layer_to_collection(layer, options);
    if options.pretty {
        serde_json::to_writer_pretty(&mut *writer, &collection)?;
    } else {
        serde_json::to_writer(&mut *writer, &collection)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Serializes a layer to an in-memory `GeoJSON` string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn write_geojson_to_string(
    layer: &MemoryLayer,
    options: &GeoJsonWriterOptions,
) -> Result<String> {
    let mut buffer = Vec::new();
    write_geojson(&mut buffer, layer, options)?;
    Ok(String::from_utf8(buffer)?)
}

fn layer_to_collection(layer: &MemoryLayer, options: &GeoJsonWriterOptions) -> FeatureCollection {
    let fields = layer.fields();
    let features = layer
        .iter()
        .map(|feature| {
            let mut properties = JsonObject::new();
            for (index, field) in fields.iter().enumerate() {
                let value = feature.attribute(index);
                if options.skip_nulls && value.is_null() {
                    continue;
                }
                properties.insert(field.name().clone(), attribute_to_json(value));
            }
            Feature {
                bbox: None,
                geometry: feature.geometry.clone(),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Converts an attribute value to its JSON representation.
#[must_use]
pub fn attribute_to_json(value: &AttributeValue) -> JsonValue {
    match value {
        AttributeValue::Null => JsonValue::Null,
        AttributeValue::Bool(v) => JsonValue::Bool(*v),
        AttributeValue::Int(v) => JsonValue::from(*v),
        AttributeValue::Float(v) => serde_json::Number::from_f64(*v)
            .map_or(JsonValue::Null, JsonValue::Number),
        AttributeValue::Text(v) => JsonValue::String(v.clone()),
    }
}
