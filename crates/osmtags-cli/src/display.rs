//! Tables and summaries printed by the subcommands.

use tabled::{Table, Tabled};

use osmtags_core::drivers::Driver;
use osmtags_core::explode::ExplodeReport;
use osmtags_core::types::{DatasetInfo, KeyInfo};
use osmtags_core_common::{CollectingFeedback, FeedbackEntry};

/// One schema column in `info` output.
#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub name: String,
    #[tabled(rename = "Type")]
    pub data_type: String,
    /// `Yes` or `No`
    #[tabled(rename = "Nullable")]
    pub nullable: String,
}

/// One tag key in `keys` output.
#[derive(Tabled)]
pub struct KeyRow {
    /// Tag key, which becomes the column name.
    #[tabled(rename = "Key")]
    pub key: String,
    /// Number of features carrying the key.
    #[tabled(rename = "Features")]
    pub feature_count: usize,
}

/// One column touched by `explode`.
#[derive(Tabled)]
pub struct ColumnRow {
    #[tabled(rename = "Column")]
    pub name: String,
    /// `added` or `reused`.
    #[tabled(rename = "Status")]
    pub status: String,
}

/// One registry entry in `drivers` output.
#[derive(Tabled)]
pub struct DriverRow {
    #[tabled(rename = "Short Name")]
    pub short_name: String,
    #[tabled(rename = "Long Name")]
    pub long_name: String,
    /// Comma-separated, without dots
    #[tabled(rename = "Extensions")]
    pub extensions: String,
    #[tabled(rename = "Info")]
    pub info: String,
    #[tabled(rename = "Read")]
    pub read: String,
    #[tabled(rename = "Write")]
    pub write: String,
}

impl From<&Driver> for DriverRow {
    fn from(d: &Driver) -> Self {
        Self {
            short_name: d.short_name.to_string(),
            long_name: d.long_name.to_string(),
            extensions: d.extensions.join(", "),
            info: d.capabilities.info.as_str().to_string(),
            read: d.capabilities.read.as_str().to_string(),
            write: d.capabilities.write.as_str().to_string(),
        }
    }
}

/// Prints the dataset summary and its field table.
pub fn display_dataset_info(info: &DatasetInfo) {
    println!("\nDataset: {}", info.dataset);
    println!("Driver: {} ({})", info.driver, info.driver_long_name);
    println!(
        "Features: {} ({} with geometry)",
        info.feature_count, info.geometry_count
    );

    if !info.fields.is_empty() {
        println!("\n=== Fields ===");

        let field_rows: Vec<FieldRow> = info
            .fields
            .iter()
            .map(|f| FieldRow {
                name: f.name.clone(),
                data_type: f.data_type.clone(),
                nullable: if f.nullable { "Yes" } else { "No" }.to_string(),
            })
            .collect();

        let field_table = Table::new(field_rows).to_string();
        println!("{field_table}");
    }
}

/// Display the keys found in the hstore field.
pub fn display_keys(field: &str, keys: &[KeyInfo]) {
    println!("\nKeys in '{field}' ({} total):\n", keys.len());
    if keys.is_empty() {
        return;
    }

    let rows: Vec<KeyRow> = keys
        .iter()
        .map(|k| KeyRow {
            key: k.key.clone(),
            feature_count: k.feature_count,
        })
        .collect();
    println!("{}", Table::new(rows));
}

/// Display the outcome of an explode run, followed by any non-fatal errors.
pub fn display_explode_report(report: &ExplodeReport, feedback: &CollectingFeedback) {
    println!("\nLayer: {}", report.layer);
    println!(
        "Features: {} scanned, {} written",
        report.features_scanned, report.features_written
    );
    println!(
        "Columns: {} added, {} reused",
        report.added_columns.len(),
        report.reused_columns.len()
    );

    let rows: Vec<ColumnRow> = report
        .added_columns
        .iter()
        .map(|name| (name, "added"))
        .chain(report.reused_columns.iter().map(|name| (name, "reused")))
        .map(|(name, status)| ColumnRow {
            name: name.clone(),
            status: status.to_string(),
        })
        .collect();
    if !rows.is_empty() {
        println!("\n{}", Table::new(rows));
    }

    if report.parse_errors > 0 {
        println!("\n=== Parse errors ({}) ===", report.parse_errors);
        for entry in feedback.entries() {
            if let FeedbackEntry::Error { message, .. } = entry {
                println!("  - {message}");
            }
        }
    }
}

/// Display the driver registry.
pub fn display_drivers(drivers: &[Driver]) {
    println!("\nAvailable Drivers ({} total):\n", drivers.len());

    let rows: Vec<DriverRow> = drivers.iter().map(DriverRow::from).collect();
    let table = Table::new(rows).to_string();
    println!("{table}");
}
