//! CSV reader producing text-typed layers.

use std::io::Read;
use std::path::Path;

use anyhow::Result;
use geojson::{GeoJson, Geometry};
use log::{debug, info, warn};
use osmtags_core_common::{
    AttributeValue, Fields, FormatReadError, FormatResult, LayerReader, MemoryLayer,
    SourcePosition, text_field,
};

/// Options for CSV reading
#[derive(Debug, Clone)]
pub struct CsvReaderOptions {
    /// Column delimiter (default: b',')
    pub delimiter: u8,
    /// Column holding a `GeoJSON` geometry, moved out of the attributes when
    /// present (default: `Some("geometry")`)
    pub geometry_column: Option<String>,
}

impl Default for CsvReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            geometry_column: Some("geometry".to_string()),
        }
    }
}

impl CsvReaderOptions {
    /// Create new reader options with defaults
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

    /// Set the geometry column, or `None` to keep every column as an attribute
    #[must_use]
    pub fn with_geometry_column(mut self, column: Option<String>) -> Self {
        self.geometry_column = column;
        self
    }
}

/// Reads CSV files with a header row.
#[derive(Debug, Default, Clone)]
pub struct CsvReader {
    options: CsvReaderOptions,
}

impl CsvReader {
    #[must_use]
    pub fn new(options: CsvReaderOptions) -> Self {
        Self { options }
    }
}

impl LayerReader for CsvReader {
    fn read_layer(&self, path: &Path) -> Result<MemoryLayer> {
        let context = path.display().to_string();
        let file = std::fs::File::open(path).map_err(|source| FormatReadError::Io {
            source,
            context: Some(context.clone()),
        })?;
        let name = path
            .file_stem()
            .map_or_else(|| "layer".to_string(), |s| s.to_string_lossy().into_owned());
        let layer = read_csv(file, name, &self.options, &context)?;
        info!("Read {} CSV record(s) from {context}", layer.len());
        Ok(layer)
    }
}

/// Reads CSV data into a layer whose columns are all nullable text.
///
/// Empty cells become nulls.
///
/// # Errors
///
/// Returns [`FormatReadError::Parse`] for a missing header or a ragged record.
pub fn read_csv<R: Read>(
    input: R,
    name: impl Into<String>,
    options: &CsvReaderOptions,
    context: &str,
) -> FormatResult<MemoryLayer> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|err| csv_error(&err, context))?
        .clone();
    let geometry_index = options
        .geometry_column
        .as_deref()
        .and_then(|column| headers.iter().position(|h| h == column));

    let fields = Fields::new(
        headers
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != geometry_index)
            .map(|(_, h)| text_field(h))
            .collect(),
    );
    debug!("CSV columns: {:?}", fields.names());

    let mut layer = MemoryLayer::new(name, fields);
    for result in reader.records() {
        let record = result.map_err(|err| csv_error(&err, context))?;
        let mut geometry = None;
        let mut attributes = Vec::with_capacity(record.len());
        for (i, cell) in record.iter().enumerate() {
            if Some(i) == geometry_index {
                geometry = parse_geometry(cell);
                continue;
            }
            attributes.push(if cell.is_empty() {
                AttributeValue::Null
            } else {
                AttributeValue::Text(cell.to_string())
            });
        }
        layer.push_feature(attributes, geometry);
    }
    Ok(layer)
}

fn parse_geometry(cell: &str) -> Option<Geometry> {
    if cell.is_empty() {
        return None;
    }
    match cell.parse::<GeoJson>() {
        Ok(GeoJson::Geometry(geometry)) => Some(geometry),
        Ok(_) | Err(_) => {
            warn!("Ignoring geometry cell that is not a GeoJSON geometry");
            None
        },
    }
}

fn csv_error(err: &csv::Error, context: &str) -> FormatReadError {
    let position = err.position().map(|pos| SourcePosition {
        line: Some(pos.line()),
        record: Some(pos.record()),
        byte_offset: Some(pos.byte()),
    });
    FormatReadError::Parse {
        message: err.to_string(),
        position,
        context: Some(context.to_string()),
    }
}
