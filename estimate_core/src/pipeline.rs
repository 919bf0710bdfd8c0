//! # Pipeline
//!
//! Runs the four stages in strict sequence for one project:
//!
//! ```text
//! ProjectInput -> derive_quantities -> estimate_costs -> advise -> assemble -> Report
//! ```
//!
//! Reference data and settings are passed in; the pipeline holds no state of
//! its own. A stage error ends the run and becomes a
//! [`PipelineOutcome::Failure`]; there is no partial output and no retry.

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::advisor::advise;
use crate::config::Settings;
use crate::errors::EstimateResult;
use crate::estimate::estimate_costs;
use crate::materials::ReferenceData;
use crate::project::ProjectInput;
use crate::quantities::derive_quantities;
use crate::report::{assemble, Report};

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The run completed; the report may still be [`Report::Unsupported`]
    Success { report: Report },
    /// A stage failed
    Failure { error: String, code: String },
}

impl From<EstimateResult<Report>> for PipelineOutcome {
    fn from(result: EstimateResult<Report>) -> Self {
        match result {
            Ok(report) => PipelineOutcome::Success { report },
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "pipeline failed");
                PipelineOutcome::Failure {
                    error: e.to_string(),
                    code: e.error_code().to_string(),
                }
            }
        }
    }
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success { .. })
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            PipelineOutcome::Success { report } => Some(report),
            PipelineOutcome::Failure { .. } => None,
        }
    }

    /// `{"success": false, "error": ..., "code": ...}` for a failure
    pub fn failure_json(&self) -> Option<Value> {
        match self {
            PipelineOutcome::Success { .. } => None,
            PipelineOutcome::Failure { error, code } => Some(json!({
                "success": false,
                "error": error,
                "code": code,
            })),
        }
    }
}

/// Run the full estimation pipeline for one project.
///
/// # Example
///
/// ```rust
/// use estimate_core::config::Settings;
/// use estimate_core::materials::ReferenceData;
/// use estimate_core::pipeline::{run, PipelineOutcome};
/// use estimate_core::project::ProjectInput;
/// use estimate_core::report::Report;
///
/// let input = ProjectInput::new("wood_frame_house", 200.0);
/// let outcome = run(&input, ReferenceData::builtin(), &Settings::default());
///
/// let PipelineOutcome::Success { report: Report::Json(report) } = outcome else {
///     panic!("expected a JSON report");
/// };
/// assert_eq!(report.estimation.top_items.len(), 5);
/// ```
pub fn run(input: &ProjectInput, data: &ReferenceData, settings: &Settings) -> PipelineOutcome {
    run_stages(input, data, settings).into()
}

fn run_stages(input: &ProjectInput, data: &ReferenceData, settings: &Settings) -> EstimateResult<Report> {
    let unit = input.area_unit_or(settings.default_area_unit);
    let building_type = input.building_type();
    let tables = data.tables(unit);

    debug!(building_type, %unit, area = ?input.area, "deriving quantities");
    let takeoff = derive_quantities(&tables.coefficients, building_type, input.area.unwrap_or(0.0));

    debug!(materials = takeoff.materials.len(), "estimating costs");
    let estimate = estimate_costs(&takeoff.materials, &tables.prices, input.area, unit, settings.top_n);

    let tier = input.quality_tier();
    debug!(%tier, total_cost = estimate.total_cost, "running advisor");
    let advice = advise(&estimate, tier);

    let format = input.report_format_or(&settings.default_report_format);
    let currency = input.currency_or(&settings.currency);
    let total_cost = estimate.total_cost;

    // Echo the unit the tables were selected for
    let mut metadata = input.clone();
    if metadata.area_unit.as_deref().map_or(true, |u| u.trim().is_empty()) {
        metadata.area_unit = Some(unit.symbol().to_string());
    }

    debug!(format, "assembling report");
    let report = assemble(metadata, takeoff, estimate, advice, format, currency)?;

    info!(building_type, total_cost, format, "estimate complete");
    Ok(report)
}
