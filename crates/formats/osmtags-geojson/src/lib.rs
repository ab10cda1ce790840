//! `GeoJSON` support for `osmtags`.
//!
//! Reads `FeatureCollection`s, single features, bare geometries and
//! newline-delimited `GeoJSON` sequences into a
//! [`MemoryLayer`](osmtags_core_common::MemoryLayer), and writes layers back as
//! a `FeatureCollection`.

pub mod factory;
pub mod parser;
pub mod reader;
pub mod writer;

pub use factory::{GEOJSON_EXTENSIONS, GeoJsonFormatFactory, geojson_driver};
pub use parser::{FeatureRecord, parse_geojson_bytes};
pub use reader::{GeoJsonReader, records_to_layer};
pub use writer::{GeoJsonWriter, GeoJsonWriterOptions, write_geojson, write_geojson_to_string};
