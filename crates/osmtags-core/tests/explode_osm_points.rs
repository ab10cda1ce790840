use std::fs;
use std::path::Path;

use osmtags_core::drivers::find_driver;
use osmtags_core::explode::{ExplodeParams, explode_hstore};
use osmtags_core::hstore::{HstoreSyntax, parse_hstore};
use osmtags_core::operations::{explode_file, resolve_driver};
use osmtags_core_common::{
    AttributeValue, CollectingFeedback, Fields, Layer, MemoryLayer, text_field,
};
use serde_json::Value;
use tempfile::TempDir;

const GEOJSON_FIXTURE: &str = "tests/data/osm_points.geojson";
const CSV_FIXTURE: &str = "tests/data/osm_points.csv";

fn bakery_and_cafe() -> MemoryLayer {
    let mut layer = MemoryLayer::new(
        "pois",
        Fields::new(vec![text_field("osm_id"), text_field("other_tags")]),
    );
    layer.push_feature(
        vec!["1".into(), r#""shop"=>"bakery","name"=>"Le Pain""#.into()],
        None,
    );
    layer.push_feature(vec!["2".into(), r#""shop"=>"cafe""#.into()], None);
    layer
}

/// The two-feature bakery/cafe layer flattens into `shop` and `name`
#[test]
fn test_bakery_and_cafe() {
    let mut layer = bakery_and_cafe();
    let mut feedback = CollectingFeedback::new();

    let report = explode_hstore(Some(&mut layer), &ExplodeParams::default(), &mut feedback)
        .unwrap()
        .expect("layer is valid");

    assert_eq!(report.keys, vec!["name", "shop"]);
    assert_eq!(layer.fields().names(), vec!["osm_id", "name", "shop"]);

    let fields = layer.fields();
    let features = layer.features();
    assert_eq!(
        features[0].attribute_by_name(&fields, "shop"),
        Some(&AttributeValue::from("bakery"))
    );
    assert_eq!(
        features[0].attribute_by_name(&fields, "name"),
        Some(&AttributeValue::from("Le Pain"))
    );
    assert_eq!(
        features[1].attribute_by_name(&fields, "shop"),
        Some(&AttributeValue::from("cafe"))
    );
    assert_eq!(
        features[1].attribute_by_name(&fields, "name"),
        Some(&AttributeValue::Null)
    );
    assert!(feedback.errors().is_empty());
}

/// Every parsed tag lands in its column, every other cell is null
#[test]
fn test_columns_match_parsed_tags() {
    let original = bakery_and_cafe();
    let parsed: Vec<_> = original
        .iter()
        .map(|f| parse_hstore(f.attribute(1).as_text().unwrap_or(""), HstoreSyntax::Strict))
        .collect();

    let mut layer = original.clone();
    let report = explode_hstore(
        Some(&mut layer),
        &ExplodeParams::default(),
        &mut CollectingFeedback::new(),
    )
    .unwrap()
    .unwrap();

    let fields = layer.fields();
    assert!(!fields.contains("other_tags"));
    for (feature, tags) in layer.iter().zip(&parsed) {
        for key in tags.keys() {
            assert!(report.keys.contains(key));
        }
        for key in &report.keys {
            let expected = tags
                .get(key)
                .map_or(AttributeValue::Null, |v| AttributeValue::from(v.as_str()));
            assert_eq!(feature.attribute_by_name(&fields, key), Some(&expected));
        }
    }
}

/// Test exploding the OSM points fixture from `GeoJSON` to `GeoJSON`
#[test]
fn test_explode_geojson_fixture() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("flat.geojson");
    let input = Path::new(GEOJSON_FIXTURE);

    let input_driver = resolve_driver(None, input).unwrap();
    let output_driver = resolve_driver(None, &output).unwrap();
    let mut feedback = CollectingFeedback::new();
    let report = explode_file(
        input,
        &output,
        &input_driver,
        &output_driver,
        &ExplodeParams::default(),
        &mut feedback,
    )
    .unwrap()
    .expect("fixture has other_tags");

    assert_eq!(report.layer, "osm_points");
    assert_eq!(report.keys, vec!["opening_hours", "shop"]);
    assert_eq!(report.features_scanned, 3);

    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len(), 3);
    assert_eq!(features[0]["properties"]["shop"], "bakery");
    assert_eq!(features[0]["properties"]["opening_hours"], "Mo-Sa 07:00-19:30");
    assert_eq!(features[1]["properties"]["shop"], "cafe");
    assert_eq!(features[1]["properties"]["opening_hours"], Value::Null);
    assert_eq!(features[2]["properties"]["shop"], Value::Null);
    assert_eq!(features[2]["geometry"]["type"], "Point");
    for feature in features {
        assert!(feature["properties"].get("other_tags").is_none());
    }
}

/// Test exploding the OSM points fixture from CSV to CSV
#[test]
fn test_explode_csv_fixture() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("flat.csv");
    let csv = find_driver("CSV").unwrap();

    let report = explode_file(
        Path::new(CSV_FIXTURE),
        &output,
        &csv,
        &csv,
        &ExplodeParams::default(),
        &mut CollectingFeedback::new(),
    )
    .unwrap()
    .unwrap();

    assert_eq!(report.added_columns, vec!["opening_hours", "shop"]);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "osm_id,name,opening_hours,shop\n\
         2046118141,Le Pain,Mo-Sa 07:00-19:30,bakery\n\
         2046118142,,,cafe\n\
         2046118143,Fontaine,,\n"
    );
}

/// A layer without the hstore field is left untouched
#[test]
fn test_missing_field_is_fatal_and_leaves_layer() {
    let mut layer = bakery_and_cafe();
    let before = layer.clone();
    let mut feedback = CollectingFeedback::new();

    let report =
        explode_hstore(Some(&mut layer), &ExplodeParams::new("tags"), &mut feedback).unwrap();

    assert!(report.is_none());
    assert!(feedback.has_fatal());
    assert_eq!(layer.fields().names(), before.fields().names());
    assert_eq!(layer.features(), before.features());
}
