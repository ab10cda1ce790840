//! Driver registry for the file formats `osmtags` can load and save.
//!
//! The registry lists the formats OSM extracts usually travel in together with
//! their current support status, and resolves a driver either by name or from
//! a file extension.
//!
//! # Examples
//!
//! ```
//! use osmtags_core::drivers::{driver_for_path, find_driver};
//!
//! let geojson = find_driver("geojson").expect("GeoJSON driver should exist");
//! assert!(geojson.capabilities.read.is_supported());
//!
//! let csv = driver_for_path("exports/pois.csv").expect("CSV claims .csv");
//! assert_eq!(csv.short_name, "CSV");
//! ```

use std::path::Path;

use osmtags_core_common::FormatFactory;
use osmtags_csv::{CsvFormatFactory, csv_driver};
use osmtags_geojson::{GeoJsonFormatFactory, geojson_driver};

pub use osmtags_core_common::drivers::{Driver, DriverCapabilities, SupportStatus};

/// Returns the complete registry of all known drivers, regardless of support status.
#[must_use]
pub fn get_drivers() -> Vec<Driver> {
    use SupportStatus::{NotSupported, Planned};

    vec![
        geojson_driver(),
        csv_driver(),
        Driver::new("GPKG", "GeoPackage vector", &["gpkg"], Planned, Planned, Planned),
        Driver::new(
            "ESRI Shapefile",
            "ESRI Shapefile / DBF",
            &["shp"],
            Planned,
            Planned,
            NotSupported,
        ),
        Driver::new(
            "OSM",
            "OpenStreetMap XML and PBF",
            &["osm", "pbf"],
            NotSupported,
            NotSupported,
            NotSupported,
        ),
    ]
}

/// Returns all drivers that have at least one fully supported operation.
#[must_use]
pub fn get_available_drivers() -> Vec<Driver> {
    get_drivers()
        .into_iter()
        .filter(|d| d.capabilities.has_supported_operation())
        .collect()
}

/// Finds a driver by its short name (case-insensitive).
#[must_use]
pub fn find_driver(name: &str) -> Option<Driver> {
    get_drivers()
        .into_iter()
        .find(|d| d.short_name.eq_ignore_ascii_case(name))
}

/// Finds the driver claiming the extension of `path`.
#[must_use]
pub fn driver_for_path(path: impl AsRef<Path>) -> Option<Driver> {
    let extension = path.as_ref().extension()?.to_str()?;
    get_drivers()
        .into_iter()
        .find(|d| d.claims_extension(extension))
}

/// Returns all driver short names in alphabetically sorted order.
#[must_use]
pub fn get_driver_names() -> Vec<&'static str> {
    let mut names: Vec<_> = get_drivers().iter().map(|d| d.short_name).collect();
    names.sort_unstable();
    names
}

/// Returns the reader/writer factory implementing `driver`, if any.
#[must_use]
pub fn format_factory(driver: &Driver) -> Option<Box<dyn FormatFactory>> {
    match driver.short_name {
        "GeoJSON" => Some(Box::new(GeoJsonFormatFactory::default())),
        "CSV" => Some(Box::new(CsvFormatFactory::default())),
        _ => None,
    }
}
