//! Factory implementation for CSV format support.

use osmtags_core_common::{Driver, FormatFactory, LayerReader, LayerWriter, SupportStatus};

use crate::reader::{CsvReader, CsvReaderOptions};
use crate::writer::{CsvWriter, CsvWriterOptions};

/// File extensions claimed by the CSV driver.
pub const CSV_EXTENSIONS: &[&str] = &["csv"];

/// Factory for creating CSV readers and writers.
#[derive(Debug, Default, Clone)]
pub struct CsvFormatFactory {
    reader_options: CsvReaderOptions,
    writer_options: CsvWriterOptions,
}

impl CsvFormatFactory {
    #[must_use]
    pub fn new(reader_options: CsvReaderOptions, writer_options: CsvWriterOptions) -> Self {
        Self {
            reader_options,
            writer_options,
        }
    }
}

impl FormatFactory for CsvFormatFactory {
    fn driver(&self) -> Driver {
        csv_driver()
    }

    fn create_reader(&self) -> Option<Box<dyn LayerReader>> {
        Some(Box::new(CsvReader::new(self.reader_options.clone())))
    }

    fn create_writer(&self) -> Option<Box<dyn LayerWriter>> {
        Some(Box::new(CsvWriter::new(self.writer_options.clone())))
    }
}

/// Driver metadata for CSV.
#[must_use]
pub const fn csv_driver() -> Driver {
    Driver::new(
        "CSV",
        "Comma Separated Value (.csv)",
        CSV_EXTENSIONS,
        SupportStatus::Supported,
        SupportStatus::Supported,
        SupportStatus::Supported,
    )
}
