//! # PDF Report Rendering
//!
//! Typesets the project report with Typst.
//!
//! - The Typst source is built with string formatting from a [`DocumentView`]
//! - Fonts come from `typst-assets` and are loaded once per process
//! - Output is raw PDF bytes (`Vec<u8>`)

use chrono::Utc;
use once_cell::sync::Lazy;
use tracing::debug;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use super::document::DocumentView;
use super::ProjectReport;
use crate::errors::{EstimateError, EstimateResult};

static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    typst_assets::fonts()
        .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
        .collect()
});

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = FONTS.clone();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

/// Render a report to PDF bytes.
///
/// # Errors
///
/// [`EstimateError::RenderFailed`] when Typst compilation or PDF export fails.
pub fn render(report: &ProjectReport, currency: &str) -> EstimateResult<Vec<u8>> {
    let view = DocumentView::build(report, currency);
    let source = build_source(&view);

    let world = PdfWorld::new(source);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        EstimateError::render_failed("pdf", format!("Typst compilation failed: {}", error_msgs.join("; ")))
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        EstimateError::render_failed("pdf", format!("PDF export failed: {}", error_msgs.join("; ")))
    })?;

    debug!(bytes = pdf_bytes.len(), "pdf report rendered");
    Ok(pdf_bytes)
}

fn build_source(view: &DocumentView) -> String {
    let overview_rows = view
        .overview
        .iter()
        .map(|row| format!("  [{}], [{}],", row.label, escape_typst(&row.value)))
        .collect::<Vec<_>>()
        .join("\n");

    let features = if view.features.is_empty() {
        String::new()
    } else {
        format!(
            "#v(6pt)\n*Features:* {}\n",
            view.features.iter().map(|f| escape_typst(f)).collect::<Vec<_>>().join(", ")
        )
    };

    let cost_per_area = view
        .cost_per_area
        .as_ref()
        .map(|c| format!("#v(4pt)\nMaterial cost per area: {}\n", escape_typst(c)))
        .unwrap_or_default();

    let material_rows = view
        .materials
        .iter()
        .map(|m| {
            format!(
                "  [{}], [{}], [{}],",
                escape_typst(&m.name),
                m.quantity,
                escape_typst(&m.unit)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let material_rows = or_placeholder(material_rows, 3, "No material information available");

    let suggestions = view
        .suggestions
        .iter()
        .map(|s| format!("_{}_\n", escape_typst(s)))
        .collect::<String>();

    let estimation_rows = view
        .estimation
        .iter()
        .map(|row| {
            format!(
                "  [{}], [{}], [{}], [{}], [{}],",
                escape_typst(&row.name),
                row.quantity,
                escape_typst(&row.unit),
                escape_typst(&row.unit_price),
                escape_typst(&row.total_price)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let estimation_rows = or_placeholder(estimation_rows, 5, "No cost estimation details available");

    let advice = view
        .advice
        .iter()
        .map(|block| {
            let items = block
                .items
                .iter()
                .map(|item| format!("- {}", escape_typst(item)))
                .collect::<Vec<_>>()
                .join("\n");
            format!("=== {}\n{}\n", block.title, items)
        })
        .collect::<Vec<_>>()
        .join("\n");
    let advice = if advice.is_empty() {
        String::new()
    } else {
        format!("== Recommendations\n\n{}", advice)
    };

    format!(
        r##"
#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 2cm, right: 2cm),
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr),
      align(left)[#text(size: 9pt)[Generated {generated_at}]],
      align(right)[#text(size: 9pt)[Page #counter(page).display()]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 10pt)

#align(center)[
  #block(width: 100%, fill: rgb("#e6f0e6"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[{title}]
  ]
]

== Project Overview

#table(
  columns: (auto, 1fr),
  stroke: none,
  row-gutter: 4pt,
{overview_rows}
)
{features}
== Cost Summary

#table(
  columns: (1fr, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right),
  [Material Cost], [{material_cost}],
  [Labor Cost], [{labor_cost}],
  [Equipment Cost], [{equipment_cost}],
  [Other Costs], [{other_costs}],
  [*Grand Total*], [*{grand_total}*],
)
{cost_per_area}
== Material Quantities

#table(
  columns: (1fr, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, left),
  table.header([*Material*], [*Quantity*], [*Unit*]),
{material_rows}
)

{suggestions}
== Cost Estimation

#table(
  columns: (1fr, auto, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, left, right, right),
  table.header([*Material*], [*Quantity*], [*Unit*], [*Unit Price*], [*Total Price*]),
{estimation_rows}
)

{advice}
"##,
        generated_at = escape_typst(&view.generated_at),
        title = escape_typst(&view.title),
        overview_rows = overview_rows,
        features = features,
        material_cost = escape_typst(&view.summary.material_cost),
        labor_cost = escape_typst(&view.summary.labor_cost),
        equipment_cost = escape_typst(&view.summary.equipment_cost),
        other_costs = escape_typst(&view.summary.other_costs),
        grand_total = escape_typst(&view.summary.grand_total),
        cost_per_area = cost_per_area,
        material_rows = material_rows,
        suggestions = suggestions,
        estimation_rows = estimation_rows,
        advice = advice,
    )
}

/// A single full-width row when a table has no rows
fn or_placeholder(rows: String, columns: usize, text: &str) -> String {
    if rows.is_empty() {
        format!("  table.cell(colspan: {})[_{}_],", columns, text)
    } else {
        rows
    }
}

/// Escape special Typst characters in user-provided text
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            '/' => "\\/".to_string(),
            '=' => "\\=".to_string(),
            '-' => "\\-".to_string(),
            '~' => "\\~".to_string(),
            '\n' => " ".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::advise;
    use crate::estimate::estimate_costs;
    use crate::materials::PriceTable;
    use crate::project::{ProjectInput, QualityTier};
    use crate::quantities::MaterialTakeoff;
    use crate::report::tests::sample_estimate;
    use crate::units::AreaUnit;

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape_typst("[x] #1"), "\\[x\\] \\#1");
        assert_eq!(escape_typst("20,800 USD"), "20,800 USD");
    }

    #[test]
    fn test_source_contains_rows() {
        let input = ProjectInput::new("wood_frame_house", 200.0).with_title("Oak_Lane");
        let estimate = sample_estimate();
        let advice = advise(&estimate, QualityTier::Standard);
        let report = ProjectReport::new(input, MaterialTakeoff::default(), estimate, advice);

        let source = build_source(&DocumentView::build(&report, "USD"));
        assert!(source.contains("Oak\\_Lane"));
        assert!(source.contains("[lumber], [32], [m3], [650 USD], [20,800 USD],"));
        assert!(source.contains("=== Anomaly Alerts"));
    }

    #[test]
    fn test_empty_tables_get_placeholder_rows() {
        let report = ProjectReport::new(
            ProjectInput::new("yurt", 50.0),
            MaterialTakeoff::default(),
            estimate_costs(&[], &PriceTable::empty(), Some(50.0), AreaUnit::SquareMeters, 5),
            Default::default(),
        );

        let source = build_source(&DocumentView::build(&report, "USD"));
        assert!(source.contains("table.cell(colspan: 3)[_No material information available_],"));
        assert!(source.contains("table.cell(colspan: 5)[_No cost estimation details available_],"));

        let pdf = render(&report, "USD");
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());
    }

    #[test]
    fn test_pdf_generation() {
        let input = ProjectInput::new("wood_frame_house", 200.0).with_title("PDF Smoke House");
        let estimate = sample_estimate();
        let advice = advise(&estimate, QualityTier::Luxury);
        let report = ProjectReport::new(input, MaterialTakeoff::default(), estimate, advice);

        let pdf = render(&report, "USD");
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }
}
