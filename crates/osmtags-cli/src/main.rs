//! Command-line interface for `osmtags`, which flattens the hstore tag column
//! of OSM exports into regular attribute columns.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for structured logging.
//! It parses arguments, configures logging, and delegates to command handlers that call into
//! [`osmtags_core`].
//!
//! # Available Commands
//!
//! - `explode` - Replace the hstore column with one column per tag key
//! - `keys` - List the tag keys found in the hstore column
//! - `info` - Display the schema of a dataset
//! - `drivers` - List all available format drivers and their capabilities

mod display;

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, debug, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use osmtags_core::drivers::get_available_drivers;
use osmtags_core::error::OsmTagsError;
use osmtags_core::explode::{DEFAULT_HSTORE_FIELD, ExplodeParams};
use osmtags_core::hstore::HstoreSyntax;
use osmtags_core::operations;
use osmtags_core_common::CollectingFeedback;

#[derive(Parser)]
#[command(
    name = "osmtags",
    version,
    about = "Explode OSM hstore tag columns into regular attribute columns",
    long_about = "osmtags reads a vector dataset exported from OpenStreetMap, parses the \
                  \"key\"=>\"value\" pairs stored in its hstore column (other_tags by default)\n\
                  and writes the dataset back with one text column per tag key."
)]
/// Command-line arguments and options for the `osmtags` CLI.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SyntaxArg {
    /// A double quote always ends a key or value
    Strict,
    /// Backslash escapes inside keys and values are honoured
    Escaped,
}

impl From<SyntaxArg> for HstoreSyntax {
    fn from(value: SyntaxArg) -> Self {
        match value {
            SyntaxArg::Strict => HstoreSyntax::Strict,
            SyntaxArg::Escaped => HstoreSyntax::Escaped,
        }
    }
}

/// Available subcommands for the `osmtags` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Replaces the hstore column with one text column per tag key.
    ///
    /// Keys are collected over all features first; every feature then gets
    /// its own value, or null, in each new column.
    Explode {
        /// Path to the input dataset.
        #[arg(short, long, value_name = "DATASET")]
        input: PathBuf,

        /// Path for the output dataset.
        #[arg(short, long, value_name = "DATASET")]
        output: PathBuf,

        /// Name of the hstore field.
        #[arg(short, long, value_name = "FIELD", default_value = DEFAULT_HSTORE_FIELD)]
        field: String,

        /// Driver for reading the input dataset; inferred from the extension when omitted.
        #[arg(long, value_name = "DRIVER")]
        input_driver: Option<String>,

        /// Driver for writing the output dataset; inferred from the extension when omitted.
        #[arg(long, value_name = "DRIVER")]
        output_driver: Option<String>,

        /// How quotes inside keys and values are parsed.
        #[arg(long, value_enum, default_value_t = SyntaxArg::Strict)]
        syntax: SyntaxArg,
    },

    /// Lists the tag keys of the hstore column and how many features use each.
    Keys {
        /// Path to the input dataset.
        #[arg(short, long, value_name = "DATASET")]
        input: PathBuf,

        /// Name of the hstore field.
        #[arg(short, long, value_name = "FIELD", default_value = DEFAULT_HSTORE_FIELD)]
        field: String,

        /// Driver for reading the dataset; inferred from the extension when omitted.
        #[arg(long, value_name = "DRIVER")]
        driver: Option<String>,

        /// How quotes inside keys and values are parsed.
        #[arg(long, value_enum, default_value_t = SyntaxArg::Strict)]
        syntax: SyntaxArg,
    },

    /// Displays the schema of a dataset.
    Info {
        /// Path to the input dataset.
        #[arg(value_name = "DATASET")]
        input: PathBuf,

        /// Driver for reading the dataset; inferred from the extension when omitted.
        #[arg(long, value_name = "DRIVER")]
        driver: Option<String>,
    },

    /// Lists all available drivers and their capabilities.
    Drivers,
}

/// Entry point for the `osmtags` command-line interface.
///
/// # Errors
///
/// Returns an error if command execution fails or if the logging system cannot be initialized.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Explode {
            input,
            output,
            field,
            input_driver,
            output_driver,
            syntax,
        } => {
            info!("Exploding {} to {}", input.display(), output.display());
            let params = ExplodeParams::new(field).with_syntax(syntax.into());
            handle_explode(
                &input,
                &output,
                input_driver.as_deref(),
                output_driver.as_deref(),
                &params,
            )?;
        },
        Commands::Keys {
            input,
            field,
            driver,
            syntax,
        } => {
            let params = ExplodeParams::new(field).with_syntax(syntax.into());
            handle_keys(&input, driver.as_deref(), &params)?;
        },
        Commands::Info { input, driver } => {
            info!("Displaying info for {}", input.display());
            handle_info(&input, driver.as_deref())?;
        },
        Commands::Drivers => {
            handle_drivers();
        },
    }

    Ok(())
}

fn handle_explode(
    input: &Path,
    output: &Path,
    input_driver_name: Option<&str>,
    output_driver_name: Option<&str>,
    params: &ExplodeParams,
) -> Result<()> {
    let input_driver =
        operations::resolve_driver(input_driver_name, input).map_err(into_cli_error)?;
    let output_driver =
        operations::resolve_driver(output_driver_name, output).map_err(into_cli_error)?;
    debug!(
        "Drivers: {} -> {}, field '{}', syntax {}",
        input_driver.short_name, output_driver.short_name, params.hstore_field, params.syntax
    );

    let mut feedback = CollectingFeedback::new();
    let report = operations::explode_file(
        input,
        output,
        &input_driver,
        &output_driver,
        params,
        &mut feedback,
    )
    .map_err(into_cli_error)?;

    match report {
        Some(report) => {
            display::display_explode_report(&report, &feedback);
            Ok(())
        },
        None => Err(fatal_error(&feedback)),
    }
}

fn handle_keys(input: &Path, driver_name: Option<&str>, params: &ExplodeParams) -> Result<()> {
    let driver = operations::resolve_driver(driver_name, input).map_err(into_cli_error)?;

    let mut feedback = CollectingFeedback::new();
    let keys = operations::discover_file_keys(input, &driver, params, &mut feedback)
        .map_err(into_cli_error)?
        .ok_or_else(|| fatal_error(&feedback))?;

    display::display_keys(&params.hstore_field, &keys);
    Ok(())
}

fn handle_info(input: &Path, driver_name: Option<&str>) -> Result<()> {
    let driver = operations::resolve_driver(driver_name, input).map_err(into_cli_error)?;
    let info = operations::dataset_info(input, &driver).map_err(into_cli_error)?;
    display::display_dataset_info(&info);
    Ok(())
}

fn handle_drivers() {
    display::display_drivers(&get_available_drivers());
}

fn into_cli_error(err: OsmTagsError) -> anyhow::Error {
    match err.hint() {
        Some(hint) => anyhow!("{}\n\n{hint}", err.user_message()),
        None => anyhow!(err.user_message()),
    }
}

fn fatal_error(feedback: &CollectingFeedback) -> anyhow::Error {
    let messages = feedback.errors();
    if messages.is_empty() {
        anyhow!("The input layer could not be processed.")
    } else {
        anyhow!(messages.join("\n"))
    }
}
