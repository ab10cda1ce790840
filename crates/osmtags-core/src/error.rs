//! Error types returned by `osmtags-core`.
//!
//! [`OsmTagsError`] wraps one `thiserror` enum per concern. Besides the
//! terse `Display` text meant for logs, every error can be rendered for a
//! person at a terminal with [`OsmTagsError::user_message`], and most carry a
//! [`hint`](OsmTagsError::hint) on how to fix the invocation.

use std::path::{Path, PathBuf};

use osmtags_core_common::LayerError;
use thiserror::Error;

use crate::drivers::get_driver_names;

/// Any failure of an `osmtags-core` operation.
#[derive(Debug, Error)]
pub enum OsmTagsError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Io(#[from] IoError),

    /// The layer store refused a mutation
    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Problems picking or using a format driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// No registered driver has this short name
    #[error("unknown driver '{name}' (known: {})", .known.join(", "))]
    NotFound {
        name: String,
        /// Short names of all registered drivers, sorted
        known: Vec<&'static str>,
    },

    /// The driver exists but cannot perform `operation`
    #[error("driver '{driver}' does not support {operation}")]
    OperationNotSupported {
        driver: &'static str,
        /// `"reading"`, `"writing"` or `"info"`
        operation: &'static str,
    },

    /// No driver claims the extension of `path`
    #[error("no driver claims the extension of '{}'", .path.display())]
    UnknownExtension { path: PathBuf },
}

impl DriverError {
    /// Builds [`DriverError::NotFound`] listing every registered driver.
    #[must_use]
    pub fn not_found(name: &str) -> Self {
        Self::NotFound {
            name: name.to_string(),
            known: get_driver_names(),
        }
    }
}

/// Problems moving a dataset between a file and memory.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("input '{}' does not exist", .path.display())]
    FileNotFound { path: PathBuf },

    /// The driver failed to load the file
    #[error("cannot load '{}' as {driver}: {source}", .path.display())]
    Load {
        driver: &'static str,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The driver failed to save the file
    #[error("cannot save '{}' as {driver}: {source}", .path.display())]
    Save {
        driver: &'static str,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Rejected operation parameters, detected before any data is read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{option} must not be empty")]
    Empty { option: &'static str },

    #[error("'{value}' is not a valid {option}, expected one of: {expected}")]
    InvalidValue {
        option: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Type alias for Results using `OsmTagsError`.
pub type Result<T> = std::result::Result<T, OsmTagsError>;

impl OsmTagsError {
    /// Renders the error for display in a terminal.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Driver(DriverError::NotFound { name, known }) => {
                let listing: Vec<String> = known.iter().map(|d| format!("  - {d}")).collect();
                format!("Unknown driver '{name}'. Known drivers:\n{}", listing.join("\n"))
            },
            Self::Driver(DriverError::OperationNotSupported { driver, operation }) => {
                format!("The {driver} driver does not support {operation} yet.")
            },
            Self::Io(IoError::Load { driver, path, source }) => {
                format!("Could not load {} as {driver}: {source}", path.display())
            },
            Self::Io(IoError::Save { driver, path, source }) => {
                format!("Could not save {} as {driver}: {source}", path.display())
            },
            Self::Layer(e) => format!("The layer could not be modified: {e}"),
            other => sentence_case(&other.to_string()),
        }
    }

    /// A suggestion on how to fix the invocation, when there is one.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        let hint = match self {
            Self::Driver(DriverError::NotFound { .. }) => "Run 'osmtags drivers' to list drivers.",
            Self::Driver(DriverError::OperationNotSupported { .. }) => {
                "Pick a driver whose capability is listed as Supported."
            },
            Self::Driver(DriverError::UnknownExtension { .. }) => {
                "Name the driver explicitly with --input-driver/--output-driver."
            },
            Self::Io(IoError::FileNotFound { .. }) => "Check the input path.",
            Self::Io(IoError::Load { .. }) => {
                "Make sure the file matches its driver, or pass --input-driver."
            },
            Self::Config(ConfigError::Empty { option }) => {
                return Some(format!("Pass a non-empty {option}."));
            },
            _ => return None,
        };
        Some(hint.to_string())
    }
}

fn sentence_case(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>() + ".",
        None => String::new(),
    }
}

/// Attaches the driver and file to an error coming from a format crate.
pub trait FileContext<T> {
    /// Wraps a load failure into [`IoError::Load`].
    ///
    /// # Errors
    ///
    /// Returns the wrapped error if `self` is an error.
    fn loading(self, driver: &'static str, path: &Path) -> Result<T>;

    /// Wraps a save failure into [`IoError::Save`].
    ///
    /// # Errors
    ///
    /// Returns the wrapped error if `self` is an error.
    fn saving(self, driver: &'static str, path: &Path) -> Result<T>;
}

impl<T> FileContext<T> for anyhow::Result<T> {
    fn loading(self, driver: &'static str, path: &Path) -> Result<T> {
        self.map_err(|e| {
            IoError::Load {
                driver,
                path: path.to_path_buf(),
                source: e.into(),
            }
            .into()
        })
    }

    fn saving(self, driver: &'static str, path: &Path) -> Result<T> {
        self.map_err(|e| {
            IoError::Save {
                driver,
                path: path.to_path_buf(),
                source: e.into(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_driver_lists_known_drivers() {
        let err = OsmTagsError::from(DriverError::not_found("Shapefile"));
        assert!(err.to_string().starts_with("unknown driver 'Shapefile' (known: "));

        let message = err.user_message();
        assert!(message.starts_with("Unknown driver 'Shapefile'. Known drivers:"));
        assert!(message.contains("  - GeoJSON"));
        assert!(message.contains("  - CSV"));
        assert_eq!(
            err.hint().as_deref(),
            Some("Run 'osmtags drivers' to list drivers.")
        );
    }

    #[test]
    fn test_load_context_keeps_source() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("unexpected end of input"));
        let err = result
            .loading("GeoJSON", Path::new("roads.geojson"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot load 'roads.geojson' as GeoJSON: unexpected end of input"
        );
        assert_eq!(
            err.user_message(),
            "Could not load roads.geojson as GeoJSON: unexpected end of input"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_save_context_wraps_writer_errors() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("disk full"));
        let err = result.saving("CSV", Path::new("flat.csv")).unwrap_err();
        assert!(matches!(err, OsmTagsError::Io(IoError::Save { driver: "CSV", .. })));
        assert_eq!(err.user_message(), "Could not save flat.csv as CSV: disk full");
    }

    #[test]
    fn test_config_error_messages() {
        let err = OsmTagsError::from(ConfigError::Empty {
            option: "hstore field",
        });
        assert_eq!(err.to_string(), "hstore field must not be empty");
        assert_eq!(err.user_message(), "Hstore field must not be empty.");
        assert_eq!(err.hint().as_deref(), Some("Pass a non-empty hstore field."));
    }

    #[test]
    fn test_layer_error_has_no_hint() {
        let err = OsmTagsError::from(LayerError::ReadOnly {
            layer: "pois".to_string(),
        });
        assert!(err.hint().is_none());
        assert_eq!(
            err.user_message(),
            "The layer could not be modified: Layer 'pois' is read-only"
        );
    }
}
