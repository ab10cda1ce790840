//! CSV support for `osmtags`.
//!
//! Every CSV column is read as nullable text, which is what OSM exports with
//! an `other_tags` column look like once they leave a spatial database. An
//! optional column holding `GeoJSON` geometries is carried as the feature
//! geometry.

pub mod factory;
pub mod reader;
pub mod writer;

pub use factory::{CSV_EXTENSIONS, CsvFormatFactory, csv_driver};
pub use reader::{CsvReader, CsvReaderOptions, read_csv};
pub use writer::{CsvWriter, CsvWriterOptions, write_csv, write_csv_to_string};
