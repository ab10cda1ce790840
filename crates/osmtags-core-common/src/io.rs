//! I/O traits for loading and saving layers.
//!
//! Each format crate implements these traits so that core can move a layer
//! between files and the in-memory store without knowing the format.

use std::path::Path;

use anyhow::Result;

use crate::drivers::Driver;
use crate::layer::MemoryLayer;

/// Reads a whole file into a [`MemoryLayer`].
pub trait LayerReader {
    /// Loads the dataset at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid for the format.
    fn read_layer(&self, path: &Path) -> Result<MemoryLayer>;
}

/// Writes a [`MemoryLayer`] to a file.
pub trait LayerWriter {
    /// Saves `layer` to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or serialization fails.
    fn write_layer(&self, layer: &MemoryLayer, path: &Path) -> Result<()>;
}

/// Creates readers and writers for one format driver.
pub trait FormatFactory: Send + Sync {
    /// Driver metadata for the format.
    fn driver(&self) -> Driver;

    /// Reader for the format, if reading is supported.
    fn create_reader(&self) -> Option<Box<dyn LayerReader>>;

    /// Writer for the format, if writing is supported.
    fn create_writer(&self) -> Option<Box<dyn LayerWriter>>;
}
