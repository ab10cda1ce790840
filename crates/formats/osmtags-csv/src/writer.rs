//! CSV writer for [`MemoryLayer`]s.

use std::fs::File;
use std::io::Write as IoWrite;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;
use osmtags_core_common::{Layer, LayerWriter, MemoryLayer};

/// Options for CSV writing
#[derive(Debug, Clone)]
pub struct CsvWriterOptions {
    /// Column delimiter (default: b',')
    pub delimiter: u8,
    /// Whether to write header row (default: true)
    pub has_header: bool,
    /// Null value representation (default: empty string)
    pub null_value: String,
    /// Name of the column receiving `GeoJSON` geometries; only written when
    /// some feature has a geometry (default: `Some("geometry")`)
    pub geometry_column: Option<String>,
}

impl Default for CsvWriterOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            null_value: String::new(),
            geometry_column: Some("geometry".to_string()),
        }
    }
}

impl CsvWriterOptions {
    /// Create new writer options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set column delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to write header row
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set null value representation
    #[must_use]
    pub fn with_null_value(mut self, null_value: impl Into<String>) -> Self {
        self.null_value = null_value.into();
        self
    }

    /// Set the geometry column, or `None` to drop geometries
    #[must_use]
    pub fn with_geometry_column(mut self, column: Option<String>) -> Self {
        self.geometry_column = column;
        self
    }
}

/// Writes layers as CSV files.
#[derive(Debug, Default, Clone)]
pub struct CsvWriter {
    options: CsvWriterOptions,
}

impl CsvWriter {
    #[must_use]
    pub fn new(options: CsvWriterOptions) -> Self {
        Self { options }
    }
}

impl LayerWriter for CsvWriter {
    fn write_layer(&self, layer: &MemoryLayer, path: &Path) -> Result<()> {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        write_csv(&mut file, layer, &self.options)?;
        info!("Wrote {} CSV record(s) to {}", layer.len(), path.display());
        Ok(())
    }
}

/// Write a layer to CSV format
///
/// # Errors
///
/// Returns an error if writing to the output fails, if CSV serialization fails,
/// or if the geometry column would shadow an attribute column of the same name
pub fn write_csv<W: IoWrite>(
    writer: &mut W,
    layer: &MemoryLayer,
    options: &CsvWriterOptions,
) -> Result<()> {
    let fields = layer.fields();
    let geometry_column = options
        .geometry_column
        .as_deref()
        .filter(|_| layer.iter().any(|f| f.geometry.is_some()));
    if let Some(name) = geometry_column.filter(|name| fields.contains(name)) {
        bail!(
            "Layer '{}' already has a column named '{name}'; \
             choose another geometry column",
            layer.name()
        );
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(writer);

    if options.has_header {
        let mut header: Vec<&str> = fields.iter().map(|f| f.name().as_str()).collect();
        header.extend(geometry_column);
        csv_writer.write_record(&header)?;
    }

    for feature in layer.iter() {
        let mut row: Vec<String> = (0..fields.len())
            .map(|index| {
                let value = feature.attribute(index);
                if value.is_null() {
                    options.null_value.clone()
                } else {
                    value.to_string()
                }
            })
            .collect();
        if geometry_column.is_some() {
            let geometry = match &feature.geometry {
                Some(geometry) => serde_json::to_string(geometry)?,
                None => String::new(),
            };
            row.push(geometry);
        }
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write a layer to an in-memory CSV string
///
/// # Errors
///
/// Returns an error if CSV serialization fails
pub fn write_csv_to_string(layer: &MemoryLayer, options: &CsvWriterOptions) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, layer, options)?;
    Ok(String::from_utf8(buffer)?)
}
