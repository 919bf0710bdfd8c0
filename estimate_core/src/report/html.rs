//! HTML report rendering with Tera.
//!
//! The template lives in `assets/templates/` and is embedded at compile time.

use rust_embed::RustEmbed;
use tera::{Context, Tera};

use super::document::DocumentView;
use super::ProjectReport;
use crate::errors::{EstimateError, EstimateResult};

/// Template name of the project report
pub const REPORT_TEMPLATE: &str = "report.html.tera";

#[derive(RustEmbed)]
#[folder = "assets/templates/"]
struct EmbeddedTemplates;

/// Tera instance loaded with the embedded templates
pub struct HtmlRenderer {
    tera: Tera,
}

impl HtmlRenderer {
    pub fn new() -> EstimateResult<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html.tera", ".html"]);

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                let template = std::str::from_utf8(&content.data)
                    .map_err(|e| EstimateError::render_failed("html", format!("{}: {}", filename, e)))?;
                tera.add_raw_template(filename, template)
                    .map_err(|e| EstimateError::render_failed("html", e.to_string()))?;
            }
        }

        if !tera.get_template_names().any(|n| n == REPORT_TEMPLATE) {
            return Err(EstimateError::render_failed(
                "html",
                format!("template {} is not embedded", REPORT_TEMPLATE),
            ));
        }

        Ok(HtmlRenderer { tera })
    }

    pub fn render(&self, report: &ProjectReport, currency: &str) -> EstimateResult<String> {
        let view = DocumentView::build(report, currency);
        let context =
            Context::from_serialize(&view).map_err(|e| EstimateError::render_failed("html", e.to_string()))?;
        self.tera
            .render(REPORT_TEMPLATE, &context)
            .map_err(|e| EstimateError::render_failed("html", format!("{:?}", e)))
    }
}

/// Render a report to a standalone HTML document
pub fn render(report: &ProjectReport, currency: &str) -> EstimateResult<String> {
    HtmlRenderer::new()?.render(report, currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{advise, AdvisorReport};
    use crate::estimate::estimate_costs;
    use crate::materials::PriceTable;
    use crate::project::{ProjectInput, QualityTier};
    use crate::quantities::{MaterialTakeoff, INSULATION_SUGGESTION};
    use crate::report::tests::sample_estimate;
    use crate::units::AreaUnit;

    fn report(input: ProjectInput) -> ProjectReport {
        let estimate = sample_estimate();
        let advice = advise(&estimate, QualityTier::Standard);
        let takeoff = MaterialTakeoff {
            materials: vec![],
            suggestions: vec![INSULATION_SUGGESTION.to_string()],
        };
        ProjectReport::new(input, takeoff, estimate, advice)
    }

    #[test]
    fn test_html_contains_sections() {
        let mut input = ProjectInput::new("wood_frame_house", 200.0).with_title("Birch Row");
        input.features = vec!["solar panels".to_string(), "deck".to_string()];

        let html = render(&report(input), "USD").unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Birch Row"));
        assert!(html.contains("200 m2"));
        assert!(html.contains("solar panels"));
        assert!(html.contains("20,800 USD"));
        assert!(html.contains("31,200 USD"));
        assert!(html.contains("Anomaly Alerts"));
        assert!(html.contains("Quality Level Recommendations"));
        assert!(!html.contains("Optimization Suggestions"));
        assert!(html.contains("R-24 batts"));
    }

    #[test]
    fn test_empty_takeoff_shows_placeholder_rows() {
        let empty = ProjectReport::new(
            ProjectInput::new("yurt", 50.0),
            MaterialTakeoff::default(),
            estimate_costs(&[], &PriceTable::empty(), Some(50.0), AreaUnit::SquareMeters, 5),
            AdvisorReport::default(),
        );
        let html = render(&empty, "USD").unwrap();
        assert!(html.contains("<h2>Material Quantities</h2>"));
        assert!(html.contains(r#"<td colspan="3">No material information available</td>"#));
        assert!(html.contains(r#"<td colspan="5">No cost estimation details available</td>"#));

        let full = render(&report(ProjectInput::new("wood_frame_house", 200.0)), "USD").unwrap();
        assert!(!full.contains("No cost estimation details available"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let input = ProjectInput::new("wood_frame_house", 80.0).with_title("<script>alert(1)</script>");
        let html = render(&report(input), "EUR").unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
