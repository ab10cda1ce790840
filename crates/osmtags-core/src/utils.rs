//! Utility functions and extension traits.

use arrow_schema::DataType;

/// Extension trait for formatting Arrow [`DataType`] into human-readable strings.
///
/// # Examples
///
/// ```
/// use arrow_schema::DataType;
/// use osmtags_core::utils::ArrowDataTypeExt;
///
/// assert_eq!(DataType::Utf8.format(), "String");
/// assert_eq!(DataType::Int64.format(), "Integer");
/// ```
pub trait ArrowDataTypeExt {
    /// Format the data type into a human-readable string.
    fn format(&self) -> String;
}

impl ArrowDataTypeExt for DataType {
    fn format(&self) -> String {
        match self {
            DataType::Null => "Null".to_string(),
            DataType::Boolean => "Boolean".to_string(),
            DataType::Int64 => "Integer".to_string(),
            DataType::Float64 => "Real".to_string(),
            DataType::Utf8 => "String".to_string(),
            DataType::LargeUtf8 => "LargeString".to_string(),
            _ => format!("{self:?}"),
        }
    }
}
