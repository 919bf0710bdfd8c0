//! # Project Input
//!
//! `ProjectInput` is the metadata record a front door (CLI, web handler,
//! persistence layer) hands to the pipeline. Every field except `area` is
//! optional, and unknown fields are kept in `extra` so a report can echo back
//! whatever the caller sent.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::project::{ProjectInput, QualityTier};
//! use estimate_core::units::AreaUnit;
//!
//! let input = ProjectInput::new("wood_frame_house", 200.0)
//!     .with_title("Maple Street Duplex")
//!     .with_quality_level("economic");
//!
//! assert_eq!(input.area_unit_or(AreaUnit::SquareFeet), AreaUnit::SquareFeet);
//! assert_eq!(input.quality_tier(), QualityTier::Economic);
//!
//! let json = serde_json::to_string_pretty(&input).unwrap();
//! assert!(json.contains("Maple Street Duplex"));
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::units::AreaUnit;

/// Building type used when the input names none
pub const DEFAULT_BUILDING_TYPE: &str = "wood_frame_house";

/// Report format used when the input names none
pub const DEFAULT_REPORT_FORMAT: &str = "json";

/// Project metadata supplied to the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Project category (residential, commercial, ...)
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,

    /// Floor area in `area_unit`
    #[serde(default)]
    pub area: Option<f64>,

    /// Area unit string as given (`m2`, `sqft`, `ft2`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_unit: Option<String>,

    /// Key into the coefficient table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,

    /// Older name for `building_type`; used only when `building_type` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floors: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foundation_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roof_type: Option<String>,

    /// Quality tier string as given; see [`ProjectInput::quality_tier`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishing_type: Option<String>,

    /// `null` reads as no features
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Currency code for document reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Requested report format (`json`, `html`, `pdf`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_format: Option<String>,

    /// Any other fields the caller supplied
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectInput {
    pub fn new(building_type: impl Into<String>, area: f64) -> Self {
        ProjectInput {
            building_type: Some(building_type.into()),
            area: Some(area),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_area_unit(mut self, unit: impl Into<String>) -> Self {
        self.area_unit = Some(unit.into());
        self
    }

    pub fn with_quality_level(mut self, level: impl Into<String>) -> Self {
        self.quality_level = Some(level.into());
        self
    }

    pub fn with_report_format(mut self, format: impl Into<String>) -> Self {
        self.report_format = Some(format.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Effective building type: `building_type`, then `structure_type`, then
    /// the default. Blank strings count as absent.
    pub fn building_type(&self) -> &str {
        non_blank(&self.building_type)
            .or(non_blank(&self.structure_type))
            .unwrap_or(DEFAULT_BUILDING_TYPE)
    }

    /// Effective area unit system, `default` when none is given
    pub fn area_unit_or(&self, default: AreaUnit) -> AreaUnit {
        non_blank(&self.area_unit).map(AreaUnit::parse_lenient).unwrap_or(default)
    }

    pub fn quality_tier(&self) -> QualityTier {
        QualityTier::from_level(self.quality_level.as_deref())
    }

    pub fn report_format_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_blank(&self.report_format).unwrap_or(default)
    }

    pub fn currency_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_blank(&self.currency).unwrap_or(default)
    }

    /// Area with its unit for display, e.g. `"200 m2"`.
    ///
    /// The unit is echoed as the caller wrote it.
    pub fn area_display(&self) -> String {
        let unit = non_blank(&self.area_unit).unwrap_or("m2");
        match self.area {
            Some(area) => format!("{} {}", area, unit),
            None => format!(" {}", unit),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Cost/finish level that drives advisor rule selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Economic,
    #[default]
    Standard,
    Luxury,
}

impl QualityTier {
    /// Map a tier string to a tier.
    ///
    /// Only the exact strings `"economic"` and `"luxury"` select those tiers.
    /// Everything else, including a missing value, typos, and different case,
    /// is treated as standard.
    pub fn from_level(level: Option<&str>) -> Self {
        match level {
            Some("economic") => QualityTier::Economic,
            Some("luxury") => QualityTier::Luxury,
            _ => QualityTier::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Economic => "economic",
            QualityTier::Standard => "standard",
            QualityTier::Luxury => "luxury",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_type_precedence() {
        let mut input = ProjectInput::default();
        assert_eq!(input.building_type(), DEFAULT_BUILDING_TYPE);

        input.structure_type = Some("steel_frame_building".to_string());
        assert_eq!(input.building_type(), "steel_frame_building");

        input.building_type = Some("concrete_frame_building".to_string());
        assert_eq!(input.building_type(), "concrete_frame_building");
    }

    #[test]
    fn test_blank_strings_fall_back() {
        let json = r#"{"area": 50, "building_type": "", "structure_type": "steel_frame_building", "currency": " ", "report_format": "", "area_unit": ""}"#;
        let input: ProjectInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.building_type(), "steel_frame_building");
        assert_eq!(input.currency_or("USD"), "USD");
        assert_eq!(input.report_format_or("html"), "html");
        assert_eq!(input.area_unit_or(AreaUnit::SquareFeet), AreaUnit::SquareFeet);
        assert_eq!(input.area_display(), "50 m2");

        let input = ProjectInput {
            building_type: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(input.building_type(), DEFAULT_BUILDING_TYPE);

        let input = input.with_currency("CAD").with_report_format("pdf");
        assert_eq!(input.currency_or("USD"), "CAD");
        assert_eq!(input.report_format_or("json"), "pdf");
    }

    #[test]
    fn test_null_features_read_as_empty() {
        let json = r#"{"area": 200, "building_type": "wood_frame_house", "features": null}"#;
        let input: ProjectInput = serde_json::from_str(json).unwrap();
        assert!(input.features.is_empty());
        assert_eq!(input.area, Some(200.0));

        let input: ProjectInput = serde_json::from_str(r#"{"area": 200}"#).unwrap();
        assert!(input.features.is_empty());
    }

    #[test]
    fn test_quality_tier_fallback() {
        assert_eq!(QualityTier::from_level(Some("economic")), QualityTier::Economic);
        assert_eq!(QualityTier::from_level(Some("luxury")), QualityTier::Luxury);
        assert_eq!(QualityTier::from_level(Some("standard")), QualityTier::Standard);
        assert_eq!(QualityTier::from_level(Some("Luxury")), QualityTier::Standard);
        assert_eq!(QualityTier::from_level(Some("premium++")), QualityTier::Standard);
        assert_eq!(QualityTier::from_level(None), QualityTier::Standard);
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        let json = r#"{
            "title": "Lakeside Cabin",
            "type": "residential",
            "area": 120.5,
            "area_unit": "sqft",
            "floors": 2,
            "features": ["deck", "sauna"],
            "client_ref": "C-77"
        }"#;
        let input: ProjectInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.project_type.as_deref(), Some("residential"));
        assert_eq!(input.area, Some(120.5));
        assert_eq!(input.area_unit_or(AreaUnit::SquareMeters), AreaUnit::SquareFeet);
        assert_eq!(input.features, vec!["deck", "sauna"]);
        assert_eq!(input.extra.get("client_ref"), Some(&Value::from("C-77")));
        assert_eq!(input.report_format_or(DEFAULT_REPORT_FORMAT), "json");
    }

    #[test]
    fn test_area_display() {
        let input = ProjectInput::new("wood_frame_house", 200.0);
        assert_eq!(input.area_display(), "200 m2");

        let input = input.with_area_unit("ft2");
        assert_eq!(input.area_display(), "200 ft2");
    }
}
