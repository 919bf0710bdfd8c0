//! # File I/O Module
//!
//! Reads project inputs and reference tables, and writes reports.
//!
//! - **Atomic saves**: write to `.tmp`, fsync, rename, so an interrupted write
//!   never leaves a half-written report behind
//! - **Reference tables**: coefficient and price files in the shape of the
//!   built-in tables
//!
//! ## Example
//!
//! ```rust,no_run
//! use estimate_core::file_io::{load_project_input, save_report};
//! use estimate_core::materials::ReferenceData;
//! use estimate_core::config::Settings;
//! use estimate_core::pipeline::{run, PipelineOutcome};
//! use std::path::Path;
//!
//! let input = load_project_input(Path::new("project.json"))?;
//! if let PipelineOutcome::Success { report } = run(&input, ReferenceData::builtin(), &Settings::default()) {
//!     save_report(&report, Path::new("report.json"))?;
//! }
//! # Ok::<(), estimate_core::errors::EstimateError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{EstimateError, EstimateResult};
use crate::materials::{CoefficientTable, PriceTable};
use crate::project::ProjectInput;
use crate::report::Report;

fn read_to_string(path: &Path) -> EstimateResult<String> {
    fs::read_to_string(path).map_err(|e| EstimateError::file_error("read", path.display().to_string(), e.to_string()))
}

fn invalid_json(path: &Path, e: serde_json::Error) -> EstimateError {
    EstimateError::serialization(format!("Invalid JSON in {}: {}", path.display(), e))
}

/// Load a project input from a JSON file.
///
/// # Returns
///
/// * `Ok(ProjectInput)` - Successfully loaded input
/// * `Err(EstimateError::FileError)` - I/O error
/// * `Err(EstimateError::SerializationError)` - Invalid JSON
pub fn load_project_input(path: &Path) -> EstimateResult<ProjectInput> {
    let contents = read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| invalid_json(path, e))
}

/// Load a coefficient table (`materials_<unit>.json`)
pub fn load_coefficients(path: &Path) -> EstimateResult<CoefficientTable> {
    let contents = read_to_string(path)?;
    let table = CoefficientTable::from_json(&contents).map_err(|e| invalid_json(path, e))?;
    debug!(path = %path.display(), building_types = table.len(), "loaded coefficient table");
    Ok(table)
}

/// Load a price table (`prices_<unit>.json`)
pub fn load_prices(path: &Path) -> EstimateResult<PriceTable> {
    let contents = read_to_string(path)?;
    let table = PriceTable::from_json(&contents).map_err(|e| invalid_json(path, e))?;
    debug!(path = %path.display(), materials = table.len(), "loaded price table");
    Ok(table)
}

/// Save a report with atomic write semantics.
///
/// JSON reports are pretty-printed, HTML is written as UTF-8 text and PDF as
/// raw bytes. An unsupported report is written as its error object.
pub fn save_report(report: &Report, path: &Path) -> EstimateResult<()> {
    let bytes = report.to_bytes()?;
    atomic_write(path, &bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "report saved");
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let extension = path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    path.with_extension(extension)
}

/// Write bytes to a temp file, sync it, then rename it over `path`.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> EstimateResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        EstimateError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(bytes).map_err(|e| {
        EstimateError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        EstimateError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        EstimateError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}
