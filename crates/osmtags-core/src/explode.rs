//! Exploding a hstore column into one text column per tag.
//!
//! [`explode_hstore`] runs five stages in order, each finishing before the
//! next starts:
//!
//! 1. **Validate**: the layer exists, is valid and has the hstore field.
//! 2. **Discover**: one read-only pass collecting the union of tag keys.
//! 3. **Mutate schema**: one nullable text column per key is added.
//! 4. **Fill**: a second pass writes each feature's value, or null, per key.
//! 5. **Cleanup**: the hstore column is removed.
//!
//! A failed validation is reported as fatal and nothing is changed. Once the
//! pipeline is past validation, a feature whose hstore value cannot be read is
//! reported and skipped, and the remaining stages always run.

use std::collections::{BTreeMap, BTreeSet};

use arrow_schema::DataType;
use log::{debug, info, warn};
use osmtags_core_common::{AttributeValue, Feature, Feedback, Layer, text_field};

use crate::error::{ConfigError, Result};
use crate::hstore::{HstoreMap, HstoreSyntax, hstore_text, parse_hstore};

/// Name of the hstore column written by `ogr2ogr` and `osm2pgsql`.
pub const DEFAULT_HSTORE_FIELD: &str = "other_tags";

/// Parameters of a hstore explode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplodeParams {
    /// Column holding the hstore text (default: `other_tags`)
    pub hstore_field: String,
    /// Quote handling of the hstore parser (default: strict)
    pub syntax: HstoreSyntax,
}

impl Default for ExplodeParams {
    fn default() -> Self {
        Self {
            hstore_field: DEFAULT_HSTORE_FIELD.to_string(),
            syntax: HstoreSyntax::default(),
        }
    }
}

impl ExplodeParams {
    /// Parameters for the given hstore field with default syntax.
    #[must_use]
    pub fn new(hstore_field: impl Into<String>) -> Self {
        Self {
            hstore_field: hstore_field.into(),
            ..Self::default()
        }
    }

    /// Set the parser syntax
    #[must_use]
    pub fn with_syntax(mut self, syntax: HstoreSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Checks the parameters before any layer is touched.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] for a blank field name.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.hstore_field.trim().is_empty() {
            return Err(ConfigError::Empty {
                option: "hstore field",
            });
        }
        Ok(())
    }
}

/// Result of the discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDiscovery {
    /// Every key found, with the number of features carrying it.
    pub keys: BTreeMap<String, usize>,
    /// Number of features read.
    pub features_scanned: usize,
    /// Number of features with a non-empty hstore value.
    pub features_tagged: usize,
    /// Number of features whose hstore value could not be read.
    pub parse_errors: usize,
}

impl KeyDiscovery {
    /// The key set, sorted.
    #[must_use]
    pub fn key_set(&self) -> BTreeSet<String> {
        self.keys.keys().cloned().collect()
    }
}

/// Summary of a completed explode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplodeReport {
    /// Name of the layer that was modified.
    pub layer: String,
    /// Discovered keys, sorted.
    pub keys: Vec<String>,
    /// Columns created for keys.
    pub added_columns: Vec<String>,
    /// Keys written into a column that already existed.
    pub reused_columns: Vec<String>,
    /// Features read by the discovery pass.
    pub features_scanned: usize,
    /// Features updated by the fill pass.
    pub features_written: usize,
    /// Per-feature parse errors over both passes.
    pub parse_errors: usize,
}

/// Flattens the hstore column of `layer` into one text column per key and
/// drops the hstore column.
///
/// Returns `Ok(None)` without modifying anything when the layer is missing,
/// invalid, or lacks the hstore field; the reason is reported to `feedback`
/// as a fatal error.
///
/// # Errors
///
/// Returns a [`ConfigError`] for invalid `params`, or a
/// [`LayerError`](osmtags_core_common::LayerError) if the store refuses a
/// mutation.
///
/// # Examples
///
/// ```
/// use osmtags_core::explode::{ExplodeParams, explode_hstore};
/// use osmtags_core_common::{CollectingFeedback, Fields, Layer, MemoryLayer, text_field};
///
/// let mut layer = MemoryLayer::new("pois", Fields::new(vec![text_field("other_tags")]));
/// layer.push_feature(vec![r#""shop"=>"bakery""#.into()], None);
///
/// let mut feedback = CollectingFeedback::new();
/// let report = explode_hstore(Some(&mut layer), &ExplodeParams::default(), &mut feedback)
///     .unwrap()
///     .expect("layer is valid");
///
/// assert_eq!(report.keys, vec!["shop"]);
/// assert_eq!(layer.fields().names(), vec!["shop"]);
/// ```
pub fn explode_hstore<L>(
    layer: Option<&mut L>,
    params: &ExplodeParams,
    feedback: &mut dyn Feedback,
) -> Result<Option<ExplodeReport>>
where
    L: Layer + ?Sized,
{
    params.validate()?;

    let Some(layer) = validate_layer(layer, params, feedback) else {
        return Ok(None);
    };
    info!(
        "Exploding hstore field '{}' of layer '{}'",
        params.hstore_field,
        layer.name()
    );

    let discovery = discover_keys(&*layer, params, feedback);
    let mut keys = discovery.key_set();
    if keys.remove(&params.hstore_field) {
        feedback.push_info(&format!(
            "Key '{}' has the name of the hstore field and is dropped with it",
            params.hstore_field
        ));
    }
    feedback.push_info(&format!(
        "Found {} key(s) in {} feature(s)",
        keys.len(),
        discovery.features_scanned
    ));

    let (added_columns, reused_columns) = add_key_columns(layer, &keys)?;
    let fill = fill_key_columns(layer, &keys, params, feedback)?;
    remove_hstore_column(layer, &params.hstore_field)?;

    let report = ExplodeReport {
        layer: layer.name().to_string(),
        keys: keys.into_iter().collect(),
        added_columns,
        reused_columns,
        features_scanned: discovery.features_scanned,
        features_written: fill.features_written,
        parse_errors: discovery.parse_errors + fill.parse_errors,
    };
    info!(
        "Exploded {} key(s) into layer '{}' ({} parse error(s))",
        report.keys.len(),
        report.layer,
        report.parse_errors
    );
    Ok(Some(report))
}

pub(crate) fn validate_layer<'a, L>(
    layer: Option<&'a mut L>,
    params: &ExplodeParams,
    feedback: &mut dyn Feedback,
) -> Option<&'a mut L>
where
    L: Layer + ?Sized,
{
    let Some(layer) = layer.filter(|layer| layer.is_valid()) else {
        feedback.report_error("The input layer is invalid.", true);
        return None;
    };
    if !layer.fields().contains(&params.hstore_field) {
        feedback.report_error(
            &format!(
                "Layer '{}' has no field '{}'.",
                layer.name(),
                params.hstore_field
            ),
            true,
        );
        return None;
    }
    Some(layer)
}

/// Runs the read-only discovery pass over `layer`.
///
/// Features whose hstore value is not text are reported to `feedback` and
/// contribute no keys. A layer without the hstore field yields an empty
/// discovery.
pub fn discover_keys<L>(
    layer: &L,
    params: &ExplodeParams,
    feedback: &mut dyn Feedback,
) -> KeyDiscovery
where
    L: Layer + ?Sized,
{
    let mut discovery = KeyDiscovery::default();
    let Some(hstore_index) = layer.fields().index_of(&params.hstore_field) else {
        return discovery;
    };

    for feature in layer.features() {
        discovery.features_scanned += 1;
        let Some(tags) = read_tags(&feature, hstore_index, params, "parsing", feedback) else {
            discovery.parse_errors += 1;
            continue;
        };
        if !tags.is_empty() {
            discovery.features_tagged += 1;
        }
        for key in tags.into_keys() {
            *discovery.keys.entry(key).or_default() += 1;
        }
    }
    debug!(
        "Discovery: {} key(s) over {} feature(s)",
        discovery.keys.len(),
        discovery.features_scanned
    );
    discovery
}

/// Parses the hstore value of one feature, or `None` after reporting an error.
fn read_tags(
    feature: &Feature,
    hstore_index: usize,
    params: &ExplodeParams,
    stage: &str,
    feedback: &mut dyn Feedback,
) -> Option<HstoreMap> {
    match hstore_text(feature.attribute(hstore_index), &params.hstore_field) {
        Ok(Some(text)) => Some(parse_hstore(text, params.syntax)),
        Ok(None) => Some(HstoreMap::new()),
        Err(err) => {
            feedback.report_error(
                &format!("Error while {stage} feature {}: {err}", feature.id),
                false,
            );
            None
        },
    }
}

fn add_key_columns<L>(
    layer: &mut L,
    keys: &BTreeSet<String>,
) -> Result<(Vec<String>, Vec<String>)>
where
    L: Layer + ?Sized,
{
    let fields = layer.fields();
    let (reused, added): (Vec<String>, Vec<String>) =
        keys.iter().cloned().partition(|key| fields.contains(key));

    for key in &reused {
        warn!(
            "Key '{key}' matches an existing column of layer '{}'; writing into it",
            layer.name()
        );
        let Some(index) = fields.index_of(key) else {
            continue;
        };
        let field = &fields[index];
        if field.data_type() != &DataType::Utf8 || !field.is_nullable() {
            debug!("Converting column '{key}' ({}) to text", field.data_type());
            layer.convert_column_to_text(index)?;
        }
    }
    if !added.is_empty() {
        layer.add_columns(added.iter().map(text_field).collect())?;
    }
    debug!("Added {} column(s), reused {}", added.len(), reused.len());
    Ok((added, reused))
}

struct FillOutcome {
    features_written: usize,
    parse_errors: usize,
}

fn fill_key_columns<L>(
    layer: &mut L,
    keys: &BTreeSet<String>,
    params: &ExplodeParams,
    feedback: &mut dyn Feedback,
) -> Result<FillOutcome>
where
    L: Layer + ?Sized,
{
    let fields = layer.fields();
    let mut outcome = FillOutcome {
        features_written: 0,
        parse_errors: 0,
    };
    let Some(hstore_index) = fields.index_of(&params.hstore_field) else {
        return Ok(outcome);
    };
    let columns: Vec<(&str, usize)> = keys
        .iter()
        .filter_map(|key| fields.index_of(key).map(|index| (key.as_str(), index)))
        .collect();

    for feature in layer.features() {
        let tags = read_tags(&feature, hstore_index, params, "filling", feedback)
            .unwrap_or_else(|| {
                outcome.parse_errors += 1;
                HstoreMap::new()
            });
        let values = columns
            .iter()
            .map(|&(key, index)| (index, AttributeValue::from(tags.get(key).cloned())))
            .collect();
        layer.write_attributes(feature.id, values)?;
        outcome.features_written += 1;
    }
    Ok(outcome)
}

fn remove_hstore_column<L>(layer: &mut L, hstore_field: &str) -> Result<()>
where
    L: Layer + ?Sized,
{
    match layer.fields().index_of(hstore_field) {
        Some(index) => {
            layer.remove_column(index)?;
            debug!("Removed hstore column '{hstore_field}'");
        },
        None => warn!(
            "Hstore column '{hstore_field}' disappeared from layer '{}' before cleanup",
            layer.name()
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OsmTagsError;
    use osmtags_core_common::{
        CollectingFeedback, FeatureId, Fields, LayerError, LayerResult, MemoryLayer,
    };

    fn osm_layer(tags: &[Option<&str>]) -> MemoryLayer {
        let mut layer = MemoryLayer::new(
            "osm_points",
            Fields::new(vec![text_field("osm_id"), text_field("other_tags")]),
        );
        for (i, tag) in tags.iter().enumerate() {
            layer.push_feature(
                vec![
                    AttributeValue::Text(i.to_string()),
                    AttributeValue::from(tag.map(str::to_string)),
                ],
                None,
            );
        }
        layer
    }

    fn value<'a>(layer: &'a MemoryLayer, id: u64, column: &str) -> &'a AttributeValue {
        let index = layer.fields().index_of(column).unwrap();
        layer.feature(FeatureId(id)).unwrap().attribute(index)
    }

    fn run(layer: &mut MemoryLayer) -> (Option<ExplodeReport>, CollectingFeedback) {
        let mut feedback = CollectingFeedback::new();
        let report =
            explode_hstore(Some(layer), &ExplodeParams::default(), &mut feedback).unwrap();
        (report, feedback)
    }

    #[test]
    fn test_bakery_and_cafe() {
        let mut layer = osm_layer(&[
            Some(r#""shop"=>"bakery","name"=>"Le Pain""#),
            Some(r#""shop"=>"cafe""#),
        ]);
        let (report, feedback) = run(&mut layer);
        let report = report.unwrap();

        assert_eq!(report.keys, vec!["name", "shop"]);
        assert_eq!(report.added_columns, vec!["name", "shop"]);
        assert_eq!(layer.fields().names(), vec!["osm_id", "name", "shop"]);
        assert_eq!(value(&layer, 0, "shop"), &AttributeValue::from("bakery"));
        assert_eq!(value(&layer, 0, "name"), &AttributeValue::from("Le Pain"));
        assert_eq!(value(&layer, 1, "shop"), &AttributeValue::from("cafe"));
        assert!(value(&layer, 1, "name").is_null());
        assert!(feedback.errors().is_empty());
    }

    #[test]
    fn test_new_columns_are_nullable_text() {
        let mut layer = osm_layer(&[Some(r#""amenity"=>"bench""#)]);
        run(&mut layer);
        let fields = layer.fields();
        let field = &fields[fields.index_of("amenity").unwrap()];
        assert_eq!(field.data_type(), &arrow_schema::DataType::Utf8);
        assert!(field.is_nullable());
    }

    #[test]
    fn test_null_and_empty_hstore_get_nulls() {
        let mut layer = osm_layer(&[Some(r#""shop"=>"cafe""#), None, Some("")]);
        let (report, feedback) = run(&mut layer);
        let report = report.unwrap();

        assert_eq!(report.features_written, 3);
        assert_eq!(report.parse_errors, 0);
        assert!(value(&layer, 1, "shop").is_null());
        assert!(value(&layer, 2, "shop").is_null());
        assert!(feedback.errors().is_empty());
    }

    #[test]
    fn test_no_keys_still_drops_hstore_column() {
        let mut layer = osm_layer(&[None, Some("garbage")]);
        let (report, _) = run(&mut layer);
        let report = report.unwrap();

        assert!(report.keys.is_empty());
        assert_eq!(layer.fields().names(), vec!["osm_id"]);
    }

    #[test]
    fn test_missing_layer_is_fatal_noop() {
        let mut feedback = CollectingFeedback::new();
        let report =
            explode_hstore::<MemoryLayer>(None, &ExplodeParams::default(), &mut feedback).unwrap();

        assert!(report.is_none());
        assert!(feedback.has_fatal());
        assert_eq!(feedback.errors(), vec!["The input layer is invalid."]);
    }

    #[test]
    fn test_missing_field_is_fatal_noop() {
        let mut layer = osm_layer(&[Some(r#""shop"=>"cafe""#)]);
        let before = layer.features();
        let mut feedback = CollectingFeedback::new();
        let report =
            explode_hstore(Some(&mut layer), &ExplodeParams::new("tags"), &mut feedback).unwrap();

        assert!(report.is_none());
        assert!(feedback.has_fatal());
        assert_eq!(layer.fields().names(), vec!["osm_id", "other_tags"]);
        assert_eq!(layer.features(), before);
    }

    #[test]
    fn test_blank_field_name_is_config_error() {
        let mut layer = osm_layer(&[]);
        let mut feedback = CollectingFeedback::new();
        let err = explode_hstore(Some(&mut layer), &ExplodeParams::new("  "), &mut feedback)
            .unwrap_err();
        assert!(matches!(err, OsmTagsError::Config(ConfigError::Empty { .. })));
        assert!(feedback.entries().is_empty());
    }

    #[test]
    fn test_non_text_hstore_is_reported_and_skipped() {
        let mut layer = osm_layer(&[Some(r#""shop"=>"cafe""#)]);
        layer.push_feature(vec!["x".into(), AttributeValue::Int(5)], None);

        let (report, feedback) = run(&mut layer);
        let report = report.unwrap();

        assert_eq!(report.parse_errors, 2);
        assert_eq!(feedback.errors().len(), 2);
        assert!(!feedback.has_fatal());
        assert!(feedback.errors()[0].starts_with("Error while parsing feature 1"));
        assert!(feedback.errors()[1].starts_with("Error while filling feature 1"));
        assert!(value(&layer, 1, "shop").is_null());
        assert!(!layer.fields().contains("other_tags"));
    }

    #[test]
    fn test_existing_column_is_reused() {
        let mut layer = MemoryLayer::new(
            "pois",
            Fields::new(vec![text_field("name"), text_field("other_tags")]),
        );
        layer.push_feature(vec!["Old".into(), r#""name"=>"New""#.into()], None);
        layer.push_feature(vec!["Kept?".into(), r#""shop"=>"cafe""#.into()], None);

        let (report, _) = run(&mut layer);
        let report = report.unwrap();

        assert_eq!(report.reused_columns, vec!["name"]);
        assert_eq!(report.added_columns, vec!["shop"]);
        assert_eq!(layer.fields().names(), vec!["name", "shop"]);
        assert_eq!(value(&layer, 0, "name"), &AttributeValue::from("New"));
        assert!(value(&layer, 1, "name").is_null());
    }

    #[test]
    fn test_reused_numeric_column_becomes_text() {
        let mut layer = MemoryLayer::new(
            "peaks",
            Fields::new(vec![
                arrow_schema::Field::new("ele", DataType::Int64, false),
                text_field("other_tags"),
            ]),
        );
        layer.push_feature(
            vec![AttributeValue::Int(35), r#""ele"=>"35 m""#.into()],
            None,
        );
        layer.push_feature(vec![AttributeValue::Int(12), AttributeValue::Null], None);

        let (report, _) = run(&mut layer);
        assert_eq!(report.unwrap().reused_columns, vec!["ele"]);

        let fields = layer.fields();
        let ele = &fields[fields.index_of("ele").unwrap()];
        assert_eq!(ele.data_type(), &DataType::Utf8);
        assert!(ele.is_nullable());
        assert_eq!(value(&layer, 0, "ele"), &AttributeValue::from("35 m"));
        assert!(value(&layer, 1, "ele").is_null());
    }

    #[test]
    fn test_key_named_like_hstore_field_is_dropped() {
        let mut layer = osm_layer(&[Some(r#""other_tags"=>"x","shop"=>"cafe""#)]);
        let (report, feedback) = run(&mut layer);

        assert_eq!(report.unwrap().keys, vec!["shop"]);
        assert!(!layer.fields().contains("other_tags"));
        assert!(feedback.entries().iter().any(|e| matches!(
            e,
            osmtags_core_common::FeedbackEntry::Info(m) if m.contains("dropped")
        )));
    }

    #[test]
    fn test_escaped_syntax() {
        let mut layer = osm_layer(&[Some(r#""name"=>"Le \"Pain\"""#)]);
        let mut feedback = CollectingFeedback::new();
        let params = ExplodeParams::default().with_syntax(HstoreSyntax::Escaped);
        explode_hstore(Some(&mut layer), &params, &mut feedback).unwrap();

        assert_eq!(
            value(&layer, 0, "name"),
            &AttributeValue::from(r#"Le "Pain""#)
        );
    }

    #[test]
    fn test_discover_keys_counts_features() {
        let layer = osm_layer(&[
            Some(r#""shop"=>"bakery","name"=>"A""#),
            Some(r#""shop"=>"cafe""#),
            None,
        ]);
        let mut feedback = CollectingFeedback::new();
        let discovery = discover_keys(&layer, &ExplodeParams::default(), &mut feedback);

        assert_eq!(discovery.features_scanned, 3);
        assert_eq!(discovery.features_tagged, 2);
        assert_eq!(discovery.keys.get("shop"), Some(&2));
        assert_eq!(discovery.keys.get("name"), Some(&1));
    }

    /// Layer double whose validity is controlled by the test.
    struct BrokenLayer(MemoryLayer);

    impl Layer for BrokenLayer {
        fn name(&self) -> &str {
            self.0.name()
        }

        fn is_valid(&self) -> bool {
            false
        }

        fn fields(&self) -> Fields {
            self.0.fields()
        }

        fn features(&self) -> Vec<Feature> {
            self.0.features()
        }

        fn add_columns(&mut self, _fields: Vec<arrow_schema::Field>) -> LayerResult<()> {
            Err(LayerError::ReadOnly {
                layer: self.name().to_string(),
            })
        }

        fn remove_column(&mut self, _index: usize) -> LayerResult<()> {
            Err(LayerError::ReadOnly {
                layer: self.name().to_string(),
            })
        }

        fn convert_column_to_text(&mut self, _index: usize) -> LayerResult<()> {
            Err(LayerError::ReadOnly {
                layer: self.name().to_string(),
            })
        }

        fn write_attributes(
            &mut self,
            _id: FeatureId,
            _values: BTreeMap<usize, AttributeValue>,
        ) -> LayerResult<()> {
            Err(LayerError::ReadOnly {
                layer: self.name().to_string(),
            })
        }
    }

    #[test]
    fn test_invalid_layer_is_fatal_noop() {
        let mut layer = BrokenLayer(osm_layer(&[Some(r#""shop"=>"cafe""#)]));
        let mut feedback = CollectingFeedback::new();
        let report =
            explode_hstore(Some(&mut layer), &ExplodeParams::default(), &mut feedback).unwrap();

        assert!(report.is_none());
        assert!(feedback.has_fatal());
    }

    #[test]
    fn test_dyn_layer() {
        let mut layer = osm_layer(&[Some(r#""shop"=>"cafe""#)]);
        let dyn_layer: &mut dyn Layer = &mut layer;
        let mut feedback = CollectingFeedback::new();
        let report =
            explode_hstore(Some(dyn_layer), &ExplodeParams::default(), &mut feedback).unwrap();
        assert_eq!(report.unwrap().keys, vec!["shop"]);
    }
}
