//! `GeoJSON` parsing helpers.

use std::fmt;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue};
use osmtags_core_common::{FormatReadError, FormatResult, SourcePosition};

/// Parsed `GeoJSON` feature with materialized properties and geometry.
#[derive(Debug, Clone)]
pub struct FeatureRecord {
    pub properties: JsonObject,
    pub geometry: Option<Geometry>,
}

/// Parse raw bytes into a vector of `FeatureRecord`s.
///
/// Accepts a `FeatureCollection`, a single `Feature`, a bare geometry, or a
/// newline-delimited sequence of any of those.
///
/// # Errors
///
/// Returns [`FormatReadError::Parse`] when the bytes are neither a `GeoJSON`
/// document nor a `GeoJSON` sequence.
pub fn parse_geojson_bytes(
    bytes: &[u8],
    context: impl Into<String>,
) -> FormatResult<Vec<FeatureRecord>> {
    let context = context.into();
    let reader = std::io::Cursor::new(bytes);

    match GeoJson::from_reader(reader) {
        Ok(geojson) => Ok(geojson_to_records(geojson)),
        Err(primary_err) => {
            let primary_err_message = primary_err.to_string();
            match parse_geojson_sequence(bytes, &context) {
                Ok(records) => Ok(records),
                Err(sequence_err) => {
                    Err(combine_errors(&primary_err_message, &sequence_err, context))
                },
            }
        },
    }
}

fn geojson_to_records(geojson: GeoJson) -> Vec<FeatureRecord> {
    match geojson {
        GeoJson::FeatureCollection(collection) => feature_collection_to_records(collection),
        GeoJson::Feature(feature) => vec![feature_to_record(feature)],
        GeoJson::Geometry(geometry) => vec![FeatureRecord {
            properties: JsonObject::new(),
            geometry: Some(geometry),
        }],
    }
}

fn feature_collection_to_records(collection: FeatureCollection) -> Vec<FeatureRecord> {
    collection
        .features
        .into_iter()
        .map(feature_to_record)
        .collect()
}

fn feature_to_record(feature: Feature) -> FeatureRecord {
    FeatureRecord {
        properties: feature.properties.unwrap_or_default(),
        geometry: feature.geometry,
    }
}

fn parse_geojson_sequence(bytes: &[u8], context: &str) -> FormatResult<Vec<FeatureRecord>> {
    let mut records = Vec::new();
    for (line_idx, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let line_number = (line_idx + 1) as u64;
        let line = match std::str::from_utf8(raw_line) {
            Ok(line) => line.trim(),
            Err(err) => {
                return Err(FormatReadError::Parse {
                    message: format!("GeoJSON line is not valid UTF-8: {err}"),
                    position: Some(SourcePosition {
                        line: Some(line_number),
                        ..SourcePosition::default()
                    }),
                    context: Some(context.to_string()),
                });
            },
        };

        if line.is_empty() {
            continue;
        }

        let geojson = line
            .parse::<GeoJson>()
            .map_err(|err| FormatReadError::Parse {
                message: format!("Failed to parse GeoJSON feature: {err}"),
                position: Some(SourcePosition {
                    line: Some(line_number),
                    ..SourcePosition::default()
                }),
                context: Some(context.to_string()),
            })?;

        records.append(&mut geojson_to_records(geojson));
    }

    if records.is_empty() {
        Err(FormatReadError::parse("No GeoJSON features found", context))
    } else {
        Ok(records)
    }
}

fn combine_errors(
    collection_err: &str,
    sequence_err: &FormatReadError,
    context: String,
) -> FormatReadError {
    let message = format!(
        "Failed to parse GeoJSON as FeatureCollection ({collection_err}); \
         also failed to parse as GeoJSON sequence: {sequence_err}"
    );
    FormatReadError::Parse {
        message,
        position: None,
        context: Some(context),
    }
}

/// Helper to describe JSON value kinds for log messages.
pub(crate) fn describe_value(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

impl fmt::Display for FeatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let geom = if self.geometry.is_some() {
            "Some(Geometry)"
        } else {
            "None"
        };
        write!(
            f,
            "FeatureRecord(properties={} keys, geometry={geom})",
            self.properties.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_feature_collection() {
        let data = br#"{
  "type": "FeatureCollection",
  "features": [
    {"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":{"name":"A"}},
    {"type":"Feature","geometry":null,"properties":{"other_tags":"\"shop\"=>\"cafe\""}}
  ]
}"#;

        let records = parse_geojson_bytes(data, "test").expect("parse");
        assert_eq!(records.len(), 2);
        assert!(records[0].geometry.is_some());
        assert_eq!(records[0].properties.get("name").unwrap(), "A");
        assert!(records[1].geometry.is_none());
        assert_eq!(
            records[1].properties.get("other_tags").unwrap(),
            r#""shop"=>"cafe""#
        );
    }

    #[test]
    fn parse_single_feature_without_properties() {
        let data = br#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]}}"#;

        let records = parse_geojson_bytes(data, "test").expect("parse");
        assert_eq!(records.len(), 1);
        assert!(records[0].geometry.is_some());
        assert!(records[0].properties.is_empty());
    }

    #[test]
    fn parse_single_geometry() {
        let data = br#"{"type":"Point","coordinates":[7.0,8.0]}"#;

        let records = parse_geojson_bytes(data, "test").expect("parse");
        assert_eq!(records.len(), 1);
        assert!(records[0].properties.is_empty());
    }

    #[test]
    fn parse_sequence_with_empty_lines() {
        let data = br#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"id":1}}

{"type":"Feature","geometry":{"type":"Point","coordinates":[1,1]},"properties":{"id":2}}
"#;

        let records = parse_geojson_bytes(data, "seq").expect("sequence");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn parse_empty_sequence_fails() {
        let data = b"\n\n\n";

        let err = parse_geojson_bytes(data, "empty").unwrap_err();
        match err {
            FormatReadError::Parse { message, .. } => {
                assert!(message.contains("No GeoJSON features found"));
            },
            FormatReadError::Io { .. } => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn parse_invalid_utf8_in_sequence() {
        let mut data = Vec::from(&b"{"[..]);
        data.push(0xFF);
        data.extend_from_slice(b"}");

        let err = parse_geojson_bytes(&data, "bad_utf8").unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn parse_invalid_json_combines_errors() {
        let data = b"not valid json at all";

        let err = parse_geojson_bytes(data, "invalid").unwrap_err();
        match err {
            FormatReadError::Parse {
                message, context, ..
            } => {
                assert!(message.contains("Failed to parse GeoJSON as FeatureCollection"));
                assert!(message.contains("also failed to parse as GeoJSON sequence"));
                assert_eq!(context.as_deref(), Some("invalid"));
            },
            FormatReadError::Io { .. } => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn describe_value_kinds() {
        assert_eq!(describe_value(&JsonValue::Null), "null");
        assert_eq!(describe_value(&serde_json::json!(42)), "number");
        assert_eq!(describe_value(&serde_json::json!([])), "array");
        assert_eq!(describe_value(&serde_json::json!({})), "object");
    }

    #[test]
    fn feature_record_display() {
        let record = FeatureRecord {
            properties: JsonObject::new(),
            geometry: None,
        };

        let display = format!("{record}");
        assert!(display.contains("properties=0 keys"));
        assert!(display.contains("None"));
    }
}
