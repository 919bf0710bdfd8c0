//! # Unit Types
//!
//! Area unit systems and material measurement units.
//!
//! The area unit only *selects* which reference tables apply. Nothing in the
//! pipeline converts between metric and imperial values: a 200 sqft project is
//! estimated with the sqft coefficient and price tables, never by converting to
//! square meters first.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::units::{AreaUnit, MaterialUnit, UnitKind};
//!
//! assert_eq!(AreaUnit::parse_lenient("FT2"), AreaUnit::SquareFeet);
//! assert_eq!(AreaUnit::parse_lenient("anything"), AreaUnit::SquareMeters);
//!
//! let unit = MaterialUnit::from("count");
//! assert_eq!(unit.kind(), UnitKind::Count);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Area unit system for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AreaUnit {
    /// Square meters (metric tables)
    #[default]
    #[serde(rename = "m2")]
    SquareMeters,
    /// Square feet (imperial tables)
    #[serde(rename = "sqft")]
    SquareFeet,
}

impl AreaUnit {
    /// All unit systems, in table lookup order
    pub const ALL: [AreaUnit; 2] = [AreaUnit::SquareMeters, AreaUnit::SquareFeet];

    /// Parse a unit string, falling back to square meters.
    ///
    /// `sqft` and `ft2` (any case) select imperial; every other value,
    /// including garbage, selects metric.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "sqft" | "ft2" => AreaUnit::SquareFeet,
            _ => AreaUnit::SquareMeters,
        }
    }

    /// Unit symbol used in reports and file names
    pub fn symbol(&self) -> &'static str {
        match self {
            AreaUnit::SquareMeters => "m2",
            AreaUnit::SquareFeet => "sqft",
        }
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Broad category of a material unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Volume,
    Area,
    Length,
    Mass,
    Count,
    Other,
}

/// Measurement unit of a material quantity.
///
/// Serializes as its symbol (`"m3"`, `"count"`, ...). Symbols that are not
/// recognized are kept verbatim in [`MaterialUnit::Other`] so reference files
/// can introduce new units without a code change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaterialUnit {
    CubicMeters,
    CubicFeet,
    SquareMeters,
    SquareFeet,
    Meters,
    Feet,
    Kilograms,
    Count,
    Other(String),
}

impl MaterialUnit {
    /// Unit symbol as written in reference files
    pub fn symbol(&self) -> &str {
        match self {
            MaterialUnit::CubicMeters => "m3",
            MaterialUnit::CubicFeet => "ft3",
            MaterialUnit::SquareMeters => "m2",
            MaterialUnit::SquareFeet => "sqft",
            MaterialUnit::Meters => "m",
            MaterialUnit::Feet => "ft",
            MaterialUnit::Kilograms => "kg",
            MaterialUnit::Count => "count",
            MaterialUnit::Other(s) => s,
        }
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            MaterialUnit::CubicMeters | MaterialUnit::CubicFeet => UnitKind::Volume,
            MaterialUnit::SquareMeters | MaterialUnit::SquareFeet => UnitKind::Area,
            MaterialUnit::Meters | MaterialUnit::Feet => UnitKind::Length,
            MaterialUnit::Kilograms => UnitKind::Mass,
            MaterialUnit::Count => UnitKind::Count,
            MaterialUnit::Other(_) => UnitKind::Other,
        }
    }

    /// Whether quantities in this unit are whole items
    pub fn is_count(&self) -> bool {
        self.kind() == UnitKind::Count
    }
}

impl From<&str> for MaterialUnit {
    fn from(s: &str) -> Self {
        match s {
            "m3" => MaterialUnit::CubicMeters,
            "ft3" => MaterialUnit::CubicFeet,
            "m2" => MaterialUnit::SquareMeters,
            "sqft" | "ft2" => MaterialUnit::SquareFeet,
            "m" => MaterialUnit::Meters,
            "ft" => MaterialUnit::Feet,
            "kg" => MaterialUnit::Kilograms,
            "count" => MaterialUnit::Count,
            other => MaterialUnit::Other(other.to_string()),
        }
    }
}

impl From<String> for MaterialUnit {
    fn from(s: String) -> Self {
        MaterialUnit::from(s.as_str())
    }
}

impl From<MaterialUnit> for String {
    fn from(unit: MaterialUnit) -> Self {
        unit.symbol().to_string()
    }
}

impl fmt::Display for MaterialUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Round to two decimal places (currency and quantity precision).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_unit_parsing() {
        assert_eq!(AreaUnit::parse_lenient("m2"), AreaUnit::SquareMeters);
        assert_eq!(AreaUnit::parse_lenient("sqft"), AreaUnit::SquareFeet);
        assert_eq!(AreaUnit::parse_lenient(" SqFt "), AreaUnit::SquareFeet);
        assert_eq!(AreaUnit::parse_lenient("ft2"), AreaUnit::SquareFeet);
        assert_eq!(AreaUnit::parse_lenient("acres"), AreaUnit::SquareMeters);
        assert_eq!(AreaUnit::parse_lenient(""), AreaUnit::SquareMeters);
    }

    #[test]
    fn test_area_unit_serialization() {
        assert_eq!(serde_json::to_string(&AreaUnit::SquareFeet).unwrap(), "\"sqft\"");
        let unit: AreaUnit = serde_json::from_str("\"m2\"").unwrap();
        assert_eq!(unit, AreaUnit::SquareMeters);
    }

    #[test]
    fn test_material_unit_symbols() {
        assert_eq!(MaterialUnit::from("m3").kind(), UnitKind::Volume);
        assert_eq!(MaterialUnit::from("ft2"), MaterialUnit::SquareFeet);
        assert!(MaterialUnit::from("count").is_count());
        assert!(!MaterialUnit::from("kg").is_count());

        let odd = MaterialUnit::from("roll");
        assert_eq!(odd, MaterialUnit::Other("roll".to_string()));
        assert_eq!(odd.symbol(), "roll");
    }

    #[test]
    fn test_material_unit_serializes_as_symbol() {
        let json = serde_json::to_string(&MaterialUnit::CubicMeters).unwrap();
        assert_eq!(json, "\"m3\"");
        let unit: MaterialUnit = serde_json::from_str("\"pallet\"").unwrap();
        assert_eq!(unit.to_string(), "pallet");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(218.0449), 218.04);
        assert_eq!(round2(32.0), 32.0);
        assert_eq!(round2(0.125), 0.13);
    }
}
