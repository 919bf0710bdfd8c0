//! Display-ready view of a [`ProjectReport`], shared by the HTML and PDF
//! renderers. Every number is formatted here so both documents agree.

use serde::Serialize;

use super::{CostSummary, ProjectReport};

/// Title shown on every document report
pub const DOCUMENT_TITLE: &str = "Material Cost Estimation Report";

/// Format a currency amount with thousands separators and no decimals.
///
/// ```rust
/// use estimate_core::report::document::format_currency;
///
/// assert_eq!(format_currency(Some(109_900.0), "USD"), "109,900 USD");
/// assert_eq!(format_currency(Some(2.5), "EUR"), "3 EUR");
/// assert_eq!(format_currency(None, "USD"), "-");
/// ```
pub fn format_currency(value: Option<f64>, currency: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{} {}", group_thousands(v.round()), currency),
        _ => "-".to_string(),
    }
}

fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// `optimization_suggestions` -> `Optimization Suggestions`
pub fn title_case_key(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub material_cost: String,
    pub labor_cost: String,
    pub equipment_cost: String,
    pub other_costs: String,
    pub grand_total: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaterialRow {
    pub name: String,
    pub quantity: String,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EstimationRow {
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub unit_price: String,
    pub total_price: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdviceBlock {
    pub title: String,
    pub items: Vec<String>,
}

/// Everything a document renderer needs, already formatted
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub title: String,
    pub overview: Vec<OverviewRow>,
    pub features: Vec<String>,
    pub summary: SummaryView,
    pub cost_per_area: Option<String>,
    pub materials: Vec<MaterialRow>,
    pub suggestions: Vec<String>,
    pub estimation: Vec<EstimationRow>,
    pub advice: Vec<AdviceBlock>,
    pub generated_at: String,
}

impl DocumentView {
    pub fn build(report: &ProjectReport, currency: &str) -> Self {
        let info = &report.project_info;
        let input = &info.input;

        let building_type = input
            .building_type
            .clone()
            .filter(|b| !b.trim().is_empty())
            .or_else(|| input.structure_type.clone());

        // Empty values are omitted from the overview
        let overview = [
            ("Project Title", input.title.clone()),
            ("Project Type", input.project_type.clone()),
            ("Building Type", building_type),
            ("Area", Some(info.area_display.clone())),
            ("Floors", input.floors.map(|n| n.to_string())),
            ("Rooms", input.rooms.map(|n| n.to_string())),
            ("Bathrooms", input.bathrooms.map(|n| n.to_string())),
            ("Location", input.location.clone()),
            ("Building Height", input.building_height.map(|h| h.to_string())),
            ("Foundation Type", input.foundation_type.clone()),
            ("Roof Type", input.roof_type.clone()),
            ("Quality Level", input.quality_level.clone()),
            ("Finishing Type", input.finishing_type.clone()),
            ("Description", input.description.clone()),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|value| OverviewRow { label, value })
        })
        .collect();

        let summary = CostSummary::from_estimate(&report.estimation);
        let money = |v: f64| format_currency(Some(v), currency);

        let estimation = &report.estimation;
        let cost_per_area = estimation
            .cost_per_area
            .map(|c| format!("{} / {}", money(c), estimation.area_unit));

        DocumentView {
            title: input.title.clone().unwrap_or_else(|| DOCUMENT_TITLE.to_string()),
            overview,
            features: input.features.clone(),
            summary: SummaryView {
                material_cost: money(summary.material_cost),
                labor_cost: money(summary.labor_cost),
                equipment_cost: money(summary.equipment_cost),
                other_costs: money(summary.other_costs),
                grand_total: money(summary.grand_total),
            },
            cost_per_area,
            materials: report
                .materials
                .materials
                .iter()
                .map(|m| MaterialRow {
                    name: m.name.clone(),
                    quantity: m.quantity.to_string(),
                    unit: m.unit.to_string(),
                })
                .collect(),
            suggestions: report.materials.suggestions.clone(),
            estimation: estimation
                .line_items
                .iter()
                .map(|item| EstimationRow {
                    name: item.name.clone(),
                    quantity: item.quantity.to_string(),
                    unit: item.unit.to_string(),
                    unit_price: format_currency(item.unit_price, currency),
                    total_price: format_currency(item.total_price, currency),
                })
                .collect(),
            advice: report
                .advice
                .groups()
                .iter()
                .filter(|(_, items)| !items.is_empty())
                .map(|(key, items)| AdviceBlock {
                    title: title_case_key(key),
                    items: items.to_vec(),
                })
                .collect(),
            generated_at: report.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}
