//! File-level operations built on the explode pipeline.
//!
//! These functions load a whole dataset into a [`MemoryLayer`] through its
//! format driver, run the requested work in memory and, for
//! [`explode_file`], save the result through the output driver.

use std::fs;
use std::path::Path;

use log::info;
use osmtags_core_common::{Feedback, Layer, MemoryLayer, SupportStatus};

use crate::drivers::{Driver, driver_for_path, find_driver, format_factory};
use crate::error::{DriverError, FileContext, IoError, Result};
use crate::explode::{ExplodeParams, ExplodeReport, discover_keys, explode_hstore, validate_layer};
use crate::types::{DatasetInfo, FieldInfo, KeyInfo};
use crate::utils::ArrowDataTypeExt;

/// Resolves the driver for `path`, by `name` when given, otherwise from the
/// file extension.
///
/// # Errors
///
/// Returns [`DriverError::NotFound`] for an unknown name and
/// [`DriverError::UnknownExtension`] when no driver claims the extension.
pub fn resolve_driver(name: Option<&str>, path: &Path) -> Result<Driver> {
    match name {
        Some(name) => find_driver(name).ok_or_else(|| DriverError::not_found(name).into()),
        None => driver_for_path(path).ok_or_else(|| {
            DriverError::UnknownExtension {
                path: path.to_path_buf(),
            }
            .into()
        }),
    }
}

/// Explodes the hstore column of the dataset at `input` and writes the
/// result to `output`.
///
/// Returns `Ok(None)` when validation fails; the reason is reported to
/// `feedback` and no output file is written.
///
/// # Errors
///
/// This function will return an error if:
/// - `input` does not exist.
/// - The `input_driver` does not support reading or the `output_driver` does
///   not support writing.
/// - Reading, transforming or writing the layer fails.
pub fn explode_file(
    input: &Path,
    output: &Path,
    input_driver: &Driver,
    output_driver: &Driver,
    params: &ExplodeParams,
    feedback: &mut dyn Feedback,
) -> Result<Option<ExplodeReport>> {
    info!("Starting explode:");
    info!("Input: {} (Driver: {})", input.display(), input_driver.short_name);
    info!("Output: {} (Driver: {})", output.display(), output_driver.short_name);

    params.validate()?;
    require(output_driver, "writing", output_driver.capabilities.write)?;
    let mut layer = read_layer(input, input_driver)?;

    let Some(report) = explode_hstore(Some(&mut layer), params, feedback)? else {
        return Ok(None);
    };

    write_layer(&layer, output, output_driver)?;
    info!("Explode completed successfully");
    Ok(Some(report))
}

/// Runs only the discovery pass over the dataset at `input`.
///
/// Keys are returned in ascending order with the number of features carrying
/// each. Returns `Ok(None)` when validation fails.
///
/// # Errors
///
/// Returns an error if `params` is invalid or the file cannot be read.
pub fn discover_file_keys(
    input: &Path,
    driver: &Driver,
    params: &ExplodeParams,
    feedback: &mut dyn Feedback,
) -> Result<Option<Vec<KeyInfo>>> {
    params.validate()?;
    let mut layer = read_layer(input, driver)?;
    let Some(layer) = validate_layer(Some(&mut layer), params, feedback) else {
        return Ok(None);
    };

    let discovery = discover_keys(&*layer, params, feedback);
    info!(
        "Found {} key(s) in {} of {} feature(s)",
        discovery.keys.len(),
        discovery.features_tagged,
        discovery.features_scanned
    );
    Ok(Some(
        discovery
            .keys
            .into_iter()
            .map(|(key, feature_count)| KeyInfo { key, feature_count })
            .collect(),
    ))
}

/// Summarises the schema of the dataset at `input`.
///
/// # Errors
///
/// Returns an error if the driver cannot read the file.
pub fn dataset_info(input: &Path, driver: &Driver) -> Result<DatasetInfo> {
    require(driver, "info", driver.capabilities.info)?;
    let layer = read_layer(input, driver)?;

    let fields = layer
        .fields()
        .iter()
        .map(|field| FieldInfo {
            name: field.name().clone(),
            data_type: field.data_type().format(),
            nullable: field.is_nullable(),
        })
        .collect();

    Ok(DatasetInfo {
        dataset: input.display().to_string(),
        driver: driver.short_name.to_string(),
        driver_long_name: driver.long_name.to_string(),
        feature_count: layer.len(),
        geometry_count: layer.iter().filter(|f| f.geometry.is_some()).count(),
        fields,
    })
}

fn require(driver: &Driver, operation: &'static str, status: SupportStatus) -> Result<()> {
    if status.is_supported() {
        Ok(())
    } else {
        Err(unsupported(driver, operation).into())
    }
}

fn unsupported(driver: &Driver, operation: &'static str) -> DriverError {
    DriverError::OperationNotSupported {
        driver: driver.short_name,
        operation,
    }
}

fn read_layer(path: &Path, driver: &Driver) -> Result<MemoryLayer> {
    require(driver, "reading", driver.capabilities.read)?;
    if fs::metadata(path).is_err() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let reader = format_factory(driver)
        .and_then(|factory| factory.create_reader())
        .ok_or_else(|| unsupported(driver, "reading"))?;
    info!("Reading {} file: {}", driver.short_name, path.display());
    let layer = reader
        .read_layer(path)
        .loading(driver.short_name, path)?;
    info!("Read {} feature(s) into layer '{}'", layer.len(), layer.name());
    Ok(layer)
}

fn write_layer(layer: &MemoryLayer, path: &Path, driver: &Driver) -> Result<()> {
    let writer = format_factory(driver)
        .and_then(|factory| factory.create_writer())
        .ok_or_else(|| unsupported(driver, "writing"))?;
    info!("Writing {} file: {}", driver.short_name, path.display());
    writer
        .write_layer(layer, path)
        .saving(driver.short_name, path)
}
