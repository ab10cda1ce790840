//! Parser for OSM hstore tag strings.
//!
//! OSM exports (`ogr2ogr`, `osm2pgsql`) keep every tag without a dedicated
//! column in one text attribute, conventionally `other_tags`:
//!
//! ```text
//! "shop"=>"bakery","opening_hours"=>"Mo-Sa 07:00-19:30"
//! ```
//!
//! [`parse_hstore`] extracts every `"key"=>"value"` pair it can find and
//! ignores everything else, so malformed input yields a partial or empty map
//! rather than an error.
//!
//! # Examples
//!
//! ```
//! use osmtags_core::hstore::{HstoreSyntax, parse_hstore};
//!
//! let tags = parse_hstore(r#""shop"=>"bakery","name"=>"Le Pain""#, HstoreSyntax::Strict);
//! assert_eq!(tags.get("shop").map(String::as_str), Some("bakery"));
//! assert_eq!(tags.len(), 2);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use osmtags_core_common::AttributeValue;
use regex::Regex;
use thiserror::Error;

use crate::error::ConfigError;

/// Parsed tags of one feature, keyed by tag name.
pub type HstoreMap = BTreeMap<String, String>;

// Non-empty key and value, no escapes: a quote always ends the token.
static STRICT_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"]+)"=>"([^"]+)""#).expect("strict hstore pattern is valid")
});

static ESCAPED_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""((?:[^"\\]|\\.)+)"=>"((?:[^"\\]|\\.)+)""#)
        .expect("escaped hstore pattern is valid")
});

/// How quotes inside keys and values are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HstoreSyntax {
    /// A double quote always terminates a key or value. Matches the pattern
    /// QGIS and GDAL users have historically applied to `other_tags`.
    #[default]
    Strict,
    /// `\"` and `\\` inside keys and values are unescaped.
    Escaped,
}

impl HstoreSyntax {
    /// Returns the string representation of this syntax.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Escaped => "escaped",
        }
    }
}

impl fmt::Display for HstoreSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HstoreSyntax {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "escaped" => Ok(Self::Escaped),
            _ => Err(ConfigError::InvalidValue {
                option: "hstore syntax",
                value: s.to_string(),
                expected: "strict, escaped",
            }),
        }
    }
}

/// A hstore attribute that cannot be parsed for one feature.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HstoreError {
    /// The attribute holds a non-text value.
    #[error("expected a text value in field '{field}', found {found}")]
    NotText {
        /// The hstore field name
        field: String,
        /// Kind of the value that was found
        found: &'static str,
    },
}

/// Extracts all `"key"=>"value"` pairs from `text`.
///
/// When a key appears more than once the last value wins.
#[must_use]
pub fn parse_hstore(text: &str, syntax: HstoreSyntax) -> HstoreMap {
    match syntax {
        HstoreSyntax::Strict => STRICT_PAIR
            .captures_iter(text)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect(),
        HstoreSyntax::Escaped => ESCAPED_PAIR
            .captures_iter(text)
            .map(|caps| (unescape(&caps[1]), unescape(&caps[2])))
            .collect(),
    }
}

fn unescape(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Reads the hstore text out of an attribute value.
///
/// Null and empty text carry no tags and yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`HstoreError::NotText`] for numeric or boolean values.
pub fn hstore_text<'a>(
    value: &'a AttributeValue,
    field: &str,
) -> Result<Option<&'a str>, HstoreError> {
    match value {
        AttributeValue::Null => Ok(None),
        AttributeValue::Text(text) if text.is_empty() => Ok(None),
        AttributeValue::Text(text) => Ok(Some(text)),
        other => Err(HstoreError::NotText {
            field: field.to_string(),
            found: other.kind(),
        }),
    }
}
