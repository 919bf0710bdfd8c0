//! # Quantity Derivation
//!
//! Turns a building type and floor area into a material takeoff by
//! multiplying the area by each per-area coefficient.
//!
//! An unknown building type is not an error. The takeoff comes back empty with
//! a suggestion telling the user the reference data needs updating.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::materials::CoefficientTable;
use crate::units::{round2, MaterialUnit};

/// Suggestion attached to every successful takeoff
pub const INSULATION_SUGGESTION: &str = "For better insulation, consider using R-24 batts in exterior walls.";

/// Derived quantity of one material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialQuantity {
    pub name: String,
    /// Always >= 0; whole numbers for count units
    pub quantity: f64,
    pub unit: MaterialUnit,
    pub description: String,
}

/// Output of quantity derivation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialTakeoff {
    pub materials: Vec<MaterialQuantity>,
    pub suggestions: Vec<String>,
}

impl MaterialTakeoff {
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Message for a building type with no coefficients
pub fn missing_coefficients_message(building_type: &str) -> String {
    format!(
        "No coefficients found for {}. Please update the database.",
        building_type
    )
}

/// Derive material quantities for a building.
///
/// `area` is in the unit system `table` was selected for; no conversion
/// happens here. A negative or non-finite area is treated as zero.
///
/// # Example
///
/// ```rust
/// use estimate_core::materials::{BuildingCoefficients, CoefficientTable};
/// use estimate_core::quantities::derive_quantities;
///
/// let table = CoefficientTable::from_buildings(vec![
///     BuildingCoefficients::new("wood_frame_house")
///         .with_material("lumber", "m3", 0.16, "Framing")
///         .with_material("interior_door", "count", 0.065, "Doors"),
/// ]);
///
/// let takeoff = derive_quantities(&table, "wood_frame_house", 200.0);
/// assert_eq!(takeoff.materials[0].quantity, 32.0);
/// assert_eq!(takeoff.materials[1].quantity, 13.0);
/// ```
pub fn derive_quantities(table: &CoefficientTable, building_type: &str, area: f64) -> MaterialTakeoff {
    let area = sanitize_area(area);

    let coefficients = match table.get(building_type) {
        Some(b) if !b.is_empty() => b,
        _ => {
            warn!(building_type, "no coefficients for building type");
            return MaterialTakeoff {
                materials: Vec::new(),
                suggestions: vec![missing_coefficients_message(building_type)],
            };
        }
    };

    let materials: Vec<MaterialQuantity> = coefficients
        .materials
        .iter()
        .map(|c| {
            let raw = c.coefficient * area;
            let quantity = if c.unit.is_count() { raw.trunc() } else { raw };
            MaterialQuantity {
                name: c.name.clone(),
                quantity: round2(quantity),
                unit: c.unit.clone(),
                description: c.description.clone(),
            }
        })
        .collect();

    debug!(building_type, area, count = materials.len(), "derived material quantities");

    MaterialTakeoff {
        materials,
        suggestions: vec![INSULATION_SUGGESTION.to_string()],
    }
}

fn sanitize_area(area: f64) -> f64 {
    if area.is_finite() && area >= 0.0 {
        area
    } else {
        warn!(area, "invalid area, deriving zero quantities");
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::BuildingCoefficients;

    fn fixture() -> CoefficientTable {
        CoefficientTable::from_buildings(vec![
            BuildingCoefficients::new("wood_frame_house")
                .with_material("lumber", "m3", 0.16, "Structural wood")
                .with_material("insulation", "m2", 2.4, "Thermal insulation")
                .with_material("interior_door", "count", 0.067, "Doors")
                .with_material("electrical_wiring", "kg", 0.3333, "Wire"),
            BuildingCoefficients::new("empty_shell"),
        ])
    }

    #[test]
    fn test_quantities_follow_table_order() {
        let takeoff = derive_quantities(&fixture(), "wood_frame_house", 200.0);
        let names: Vec<&str> = takeoff.materials.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["lumber", "insulation", "interior_door", "electrical_wiring"]);
        assert_eq!(takeoff.suggestions, vec![INSULATION_SUGGESTION.to_string()]);
    }

    #[test]
    fn test_quantity_arithmetic() {
        let takeoff = derive_quantities(&fixture(), "wood_frame_house", 200.0);
        assert_eq!(takeoff.materials[0].quantity, 32.0);
        assert_eq!(takeoff.materials[1].quantity, 480.0);
        // 0.067 * 200 = 13.4 -> truncated
        assert_eq!(takeoff.materials[2].quantity, 13.0);
        // 0.3333 * 200 = 66.66
        assert_eq!(takeoff.materials[3].quantity, 66.66);
    }

    #[test]
    fn test_count_units_are_integers() {
        for area in [1.0, 7.5, 33.3, 149.9, 1234.56] {
            let takeoff = derive_quantities(&fixture(), "wood_frame_house", area);
            for m in takeoff.materials.iter().filter(|m| m.unit.is_count()) {
                assert_eq!(m.quantity.fract(), 0.0, "{} at area {}", m.name, area);
            }
            assert!(takeoff.materials.iter().all(|m| m.quantity >= 0.0));
        }
    }

    #[test]
    fn test_unknown_building_type() {
        let takeoff = derive_quantities(&fixture(), "igloo", 200.0);
        assert!(takeoff.is_empty());
        assert_eq!(
            takeoff.suggestions,
            vec!["No coefficients found for igloo. Please update the database.".to_string()]
        );
    }

    #[test]
    fn test_building_type_without_entries_counts_as_missing() {
        let takeoff = derive_quantities(&fixture(), "empty_shell", 200.0);
        assert!(takeoff.is_empty());
        assert_eq!(takeoff.suggestions[0], missing_coefficients_message("empty_shell"));
    }

    #[test]
    fn test_invalid_area_yields_zero_quantities() {
        for area in [-50.0, f64::NAN, f64::INFINITY] {
            let takeoff = derive_quantities(&fixture(), "wood_frame_house", area);
            assert_eq!(takeoff.materials.len(), 4);
            assert!(takeoff.materials.iter().all(|m| m.quantity == 0.0));
        }
    }
}
