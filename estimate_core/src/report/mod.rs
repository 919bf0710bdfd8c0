//! # Report Assembly
//!
//! Merges the project input and every stage output into a single report.
//!
//! | Format | Output |
//! |---|---|
//! | `json` | [`ProjectReport`] record (pass-through merge) |
//! | `html` | rendered HTML document |
//! | `pdf` | the same document typeset to PDF bytes |
//!
//! An unknown format is not an error: [`assemble`] returns
//! [`Report::Unsupported`] naming the format. Errors are reserved for a
//! rendering backend that fails.
//!
//! Document formats add a [`CostSummary`] (labor, equipment and other costs as
//! fixed shares of the material cost). Every document format computes it
//! through [`CostSummary::from_estimate`].

pub mod document;
pub mod html;
pub mod pdf;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::advisor::AdvisorReport;
use crate::errors::EstimateResult;
use crate::estimate::CostEstimate;
use crate::project::ProjectInput;
use crate::quantities::MaterialTakeoff;
use crate::units::round2;

/// Labor cost as a share of material cost
pub const LABOR_RATIO: f64 = 0.35;
/// Equipment cost as a share of material cost
pub const EQUIPMENT_RATIO: f64 = 0.10;
/// Other costs as a share of material cost
pub const OTHER_RATIO: f64 = 0.05;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Html,
    Pdf,
}

impl ReportFormat {
    /// Exact, lowercase format names only
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "json" => Some(ReportFormat::Json),
            "html" => Some(ReportFormat::Html),
            "pdf" => Some(ReportFormat::Pdf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
            ReportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Project metadata as echoed in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(flatten)]
    pub input: ProjectInput,
    /// Area with unit, e.g. `"200 m2"`
    pub area_display: String,
}

/// Structured report: everything the pipeline produced for one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReport {
    pub project_info: ProjectInfo,
    pub materials: MaterialTakeoff,
    pub estimation: CostEstimate,
    pub advice: AdvisorReport,
    pub generated_at: DateTime<Utc>,
}

impl ProjectReport {
    pub fn new(
        input: ProjectInput,
        materials: MaterialTakeoff,
        estimation: CostEstimate,
        advice: AdvisorReport,
    ) -> Self {
        let area_display = input.area_display();
        ProjectReport {
            project_info: ProjectInfo { input, area_display },
            materials,
            estimation,
            advice,
            generated_at: Utc::now(),
        }
    }
}

/// Material, labor, equipment and other costs for document reports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub material_cost: f64,
    pub labor_cost: f64,
    pub equipment_cost: f64,
    pub other_costs: f64,
    pub grand_total: f64,
}

impl CostSummary {
    /// Split a material total into the document summary figures.
    ///
    /// ```rust
    /// use estimate_core::report::CostSummary;
    ///
    /// let summary = CostSummary::from_material_total(100_000.0);
    /// assert_eq!(summary.labor_cost, 35_000.0);
    /// assert_eq!(summary.equipment_cost, 10_000.0);
    /// assert_eq!(summary.other_costs, 5_000.0);
    /// assert_eq!(summary.grand_total, 150_000.0);
    /// ```
    pub fn from_material_total(material_total: f64) -> Self {
        let labor_cost = round2(material_total * LABOR_RATIO);
        let equipment_cost = round2(material_total * EQUIPMENT_RATIO);
        let other_costs = round2(material_total * OTHER_RATIO);
        CostSummary {
            material_cost: round2(material_total),
            labor_cost,
            equipment_cost,
            other_costs,
            grand_total: round2(material_total + labor_cost + equipment_cost + other_costs),
        }
    }

    /// Summary for an estimate: priced line items, or `total_cost` when the
    /// estimate carries no line items.
    pub fn from_estimate(estimate: &CostEstimate) -> Self {
        let material_total = if estimate.line_items.is_empty() {
            estimate.total_cost
        } else {
            estimate.material_total()
        };
        CostSummary::from_material_total(material_total)
    }
}

/// Assembled report in the requested representation
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Json(Box<ProjectReport>),
    Html(String),
    Pdf(Vec<u8>),
    /// The requested format is not supported
    Unsupported { error: String },
}

impl Report {
    pub fn unsupported(format: &str) -> Self {
        Report::Unsupported {
            error: format!("Unsupported report format: {}", format),
        }
    }

    /// Format name, or `None` for an unsupported request
    pub fn format(&self) -> Option<ReportFormat> {
        match self {
            Report::Json(_) => Some(ReportFormat::Json),
            Report::Html(_) => Some(ReportFormat::Html),
            Report::Pdf(_) => Some(ReportFormat::Pdf),
            Report::Unsupported { .. } => None,
        }
    }

    /// Serialized bytes: pretty JSON, HTML text, PDF bytes, or an error
    /// object for an unsupported format.
    pub fn to_bytes(&self) -> EstimateResult<Vec<u8>> {
        match self {
            Report::Json(report) => Ok(serde_json::to_vec_pretty(report)?),
            Report::Html(html) => Ok(html.as_bytes().to_vec()),
            Report::Pdf(bytes) => Ok(bytes.clone()),
            Report::Unsupported { error } => Ok(serde_json::to_vec_pretty(&serde_json::json!({ "error": error }))?),
        }
    }
}

/// Assemble a report from the pipeline outputs.
///
/// # Arguments
///
/// * `format` - `json`, `html` or `pdf`; anything else yields
///   [`Report::Unsupported`]
/// * `currency` - currency code shown in document formats
///
/// # Errors
///
/// Only when the HTML template or the PDF backend fails.
pub fn assemble(
    input: ProjectInput,
    materials: MaterialTakeoff,
    estimation: CostEstimate,
    advice: AdvisorReport,
    format: &str,
    currency: &str,
) -> EstimateResult<Report> {
    let Some(format) = ReportFormat::parse(format) else {
        debug!(format, "unsupported report format requested");
        return Ok(Report::unsupported(format));
    };

    let report = ProjectReport::new(input, materials, estimation, advice);

    let assembled = match format {
        ReportFormat::Json => Report::Json(Box::new(report)),
        ReportFormat::Html => Report::Html(html::render(&report, currency)?),
        ReportFormat::Pdf => Report::Pdf(pdf::render(&report, currency)?),
    };

    debug!(%format, "report assembled");
    Ok(assembled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::{CostLineItem, PieSlice};
    use crate::units::{AreaUnit, MaterialUnit};

    pub(crate) fn sample_estimate() -> CostEstimate {
        CostEstimate {
            line_items: vec![
                CostLineItem {
                    name: "lumber".to_string(),
                    quantity: 32.0,
                    unit: MaterialUnit::CubicMeters,
                    unit_price: Some(650.0),
                    total_price: Some(20800.0),
                    description: "Structural wood".to_string(),
                },
                CostLineItem {
                    name: "mystery".to_string(),
                    quantity: 3.0,
                    unit: MaterialUnit::Count,
                    unit_price: None,
                    total_price: None,
                    description: "No price info available".to_string(),
                },
            ],
            total_cost: 20800.0,
            pie_slices: vec![PieSlice {
                name: "lumber".to_string(),
                total_price: 20800.0,
                percent: 100.0,
            }],
            top_items: vec![],
            cost_per_area: Some(104.0),
            area_unit: AreaUnit::SquareMeters,
        }
    }

    #[test]
    fn test_cost_summary_ratios() {
        let summary = CostSummary::from_estimate(&sample_estimate());
        assert_eq!(summary.material_cost, 20800.0);
        assert_eq!(summary.labor_cost, 7280.0);
        assert_eq!(summary.equipment_cost, 2080.0);
        assert_eq!(summary.other_costs, 1040.0);
        assert_eq!(summary.grand_total, 31200.0);
    }

    #[test]
    fn test_cost_summary_falls_back_to_total_cost() {
        let mut estimate = sample_estimate();
        estimate.line_items.clear();
        estimate.total_cost = 100000.0;
        let summary = CostSummary::from_estimate(&estimate);
        assert_eq!(summary.grand_total, 150000.0);
    }

    #[test]
    fn test_json_report_adds_area_display() {
        let input = ProjectInput::new("wood_frame_house", 200.0).with_title("Sample House");
        let report = assemble(
            input,
            MaterialTakeoff::default(),
            sample_estimate(),
            AdvisorReport::default(),
            "json",
            "USD",
        )
        .unwrap();

        let Report::Json(report) = report else {
            panic!("expected a JSON report");
        };
        assert_eq!(report.project_info.area_display, "200 m2");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["project_info"]["title"], "Sample House");
        assert_eq!(json["project_info"]["area_display"], "200 m2");
        assert_eq!(json["estimation"]["total_cost"], 20800.0);
        assert!(json["advice"]["anomaly_alerts"].is_array());
    }

    #[test]
    fn test_unsupported_format_is_a_value() {
        for format in ["docx", "JSON", ""] {
            let report = assemble(
                ProjectInput::default(),
                MaterialTakeoff::default(),
                sample_estimate(),
                AdvisorReport::default(),
                format,
                "USD",
            )
            .unwrap();
            assert_eq!(
                report,
                Report::Unsupported {
                    error: format!("Unsupported report format: {}", format)
                }
            );
            assert_eq!(report.format(), None);
        }
    }

    #[test]
    fn test_unsupported_to_bytes_is_error_object() {
        let bytes = Report::unsupported("xml").to_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["error"], "Unsupported report format: xml");
    }
}
