//! Factory implementation for `GeoJSON` format support.
//!
//! This module implements the `FormatFactory` trait so core can resolve the
//! `GeoJSON` driver to a reader and a writer.

use osmtags_core_common::{Driver, FormatFactory, LayerReader, LayerWriter, SupportStatus};

use crate::reader::GeoJsonReader;
use crate::writer::{GeoJsonWriter, GeoJsonWriterOptions};

/// File extensions claimed by the `GeoJSON` driver.
pub const GEOJSON_EXTENSIONS: &[&str] = &["geojson", "json", "geojsonl", "geojsons"];

/// Factory for creating `GeoJSON` readers and writers.
#[derive(Debug, Default, Clone)]
pub struct GeoJsonFormatFactory {
    writer_options: GeoJsonWriterOptions,
}

impl GeoJsonFormatFactory {
    /// Factory whose writers use the given options.
    #[must_use]
    pub fn with_writer_options(writer_options: GeoJsonWriterOptions) -> Self {
        Self { writer_options }
    }
}

impl FormatFactory for GeoJsonFormatFactory {
    fn driver(&self) -> Driver {
        geojson_driver()
    }

    fn create_reader(&self) -> Option<Box<dyn LayerReader>> {
        Some(Box::new(GeoJsonReader))
    }

    fn create_writer(&self) -> Option<Box<dyn LayerWriter>> {
        Some(Box::new(GeoJsonWriter::new(self.writer_options.clone())))
    }
}

/// Driver metadata for `GeoJSON`.
#[must_use]
pub const fn geojson_driver() -> Driver {
    Driver::new(
        "GeoJSON",
        "GeoJSON",
        GEOJSON_EXTENSIONS,
        SupportStatus::Supported,
        SupportStatus::Supported,
        SupportStatus::Supported,
    )
}
