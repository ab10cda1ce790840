//! Common types and traits shared across `osmtags` crates.
//!
//! This crate provides the feature store model (values, schema, features and
//! the [`Layer`] capability), the feedback channel and the driver and I/O
//! abstractions shared between `osmtags-core` and the format crates, preventing
//! circular dependencies.

pub mod drivers;
pub mod feature;
pub mod feedback;
pub mod format;
pub mod io;
pub mod layer;
pub mod schema;
pub mod value;

// Re-export commonly used types
pub use drivers::{Driver, DriverCapabilities, SupportStatus};
pub use feature::{Feature, FeatureId};
pub use feedback::{CollectingFeedback, Feedback, FeedbackEntry, LogFeedback};
pub use format::{FormatReadError, FormatResult, SourcePosition};
pub use io::{FormatFactory, LayerReader, LayerWriter};
pub use layer::{Layer, LayerError, LayerResult, MemoryLayer};
pub use schema::{Fields, text_field};
pub use value::AttributeValue;
