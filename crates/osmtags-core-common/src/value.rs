//! Loosely typed attribute values carried by features.

use std::fmt;

use arrow_schema::DataType;

/// A single attribute value of a feature.
///
/// Stores read from GeoJSON carry the JSON scalar types; CSV stores and the
/// columns produced by the hstore explode only ever hold [`AttributeValue::Text`]
/// or [`AttributeValue::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AttributeValue {
    /// Absent value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
}

impl AttributeValue {
    /// Returns `true` for [`AttributeValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text payload, or `None` for every other variant.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Arrow data type that best describes this value.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Bool(_) => DataType::Boolean,
            Self::Int(_) => DataType::Int64,
            Self::Float(_) => DataType::Float64,
            Self::Text(_) => DataType::Utf8,
        }
    }

    /// Short name of the variant, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

impl From<Option<String>> for AttributeValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_text_only_for_text() {
        assert_eq!(AttributeValue::from("bakery").as_text(), Some("bakery"));
        assert_eq!(AttributeValue::Int(3).as_text(), None);
        assert_eq!(AttributeValue::Null.as_text(), None);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(AttributeValue::from(None::<String>), AttributeValue::Null);
        assert_eq!(
            AttributeValue::from(Some("x".to_string())),
            AttributeValue::Text("x".to_string())
        );
    }

    #[test]
    fn test_display_null_is_empty() {
        assert_eq!(AttributeValue::Null.to_string(), "");
        assert_eq!(AttributeValue::Float(1.5).to_string(), "1.5");
        assert_eq!(AttributeValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_data_type() {
        assert_eq!(AttributeValue::Text(String::new()).data_type(), DataType::Utf8);
        assert_eq!(AttributeValue::Int(1).data_type(), DataType::Int64);
        assert_eq!(AttributeValue::Null.data_type(), DataType::Null);
    }
}
