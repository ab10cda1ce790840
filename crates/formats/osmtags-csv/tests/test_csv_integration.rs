//! Integration tests for CSV reading and writing

use std::path::Path;

use osmtags_core_common::{AttributeValue, FeatureId, Layer, LayerReader, LayerWriter};
use osmtags_csv::{CsvReader, CsvWriter, CsvWriterOptions};
use tempfile::TempDir;

const FIXTURE: &str = "tests/data/osm_points.csv";

#[test]
fn test_read_osm_points_csv() {
    let layer = CsvReader::default().read_layer(Path::new(FIXTURE)).unwrap();

    assert_eq!(layer.name(), "osm_points");
    assert_eq!(layer.len(), 3);
    assert_eq!(layer.fields().names(), vec!["osm_id", "name", "other_tags"]);

    let first = layer.feature(FeatureId(0)).unwrap();
    assert_eq!(
        first.attributes[2],
        AttributeValue::from(r#""shop"=>"bakery","opening_hours"=>"Mo-Sa 07:00-19:30""#)
    );
    assert!(layer.feature(FeatureId(1)).unwrap().attributes[1].is_null());
    assert!(layer.feature(FeatureId(2)).unwrap().attributes[2].is_null());
}

#[test]
fn test_csv_round_trip_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("copy.csv");

    let layer = CsvReader::default().read_layer(Path::new(FIXTURE)).unwrap();
    CsvWriter::new(CsvWriterOptions::default())
        .write_layer(&layer, &output)
        .unwrap();

    let original = std::fs::read_to_string(FIXTURE).unwrap();
    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, original);
}
