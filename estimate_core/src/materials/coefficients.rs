//! Material coefficient tables
//!
//! A coefficient is the quantity of a material needed per unit of building
//! area. Tables are keyed by building type and keep the order materials were
//! written in, so derived takeoffs list materials the way the reference file
//! does.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::OrderedEntries;
use crate::units::MaterialUnit;

/// One material's per-area coefficient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialCoefficient {
    /// Material name (join key into the price table)
    pub name: String,
    pub unit: MaterialUnit,
    /// Quantity per unit of building area
    pub coefficient: f64,
    pub description: String,
}

/// Coefficient entry as written in reference files (name is the map key)
#[derive(Debug, Clone, Deserialize)]
struct CoefficientEntry {
    unit: MaterialUnit,
    coefficient: f64,
    #[serde(default)]
    description: String,
}

/// All coefficients for one building type, in file order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildingCoefficients {
    pub building_type: String,
    pub materials: Vec<MaterialCoefficient>,
}

impl BuildingCoefficients {
    pub fn new(building_type: impl Into<String>) -> Self {
        BuildingCoefficients {
            building_type: building_type.into(),
            materials: Vec::new(),
        }
    }

    /// Builder-style helper used by fixtures and tests
    pub fn with_material(
        mut self,
        name: impl Into<String>,
        unit: impl Into<MaterialUnit>,
        coefficient: f64,
        description: impl Into<String>,
    ) -> Self {
        self.materials.push(MaterialCoefficient {
            name: name.into(),
            unit: unit.into(),
            coefficient,
            description: description.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Coefficient table for one area unit system.
///
/// ```rust
/// use estimate_core::materials::{BuildingCoefficients, CoefficientTable};
///
/// let table = CoefficientTable::from_buildings(vec![
///     BuildingCoefficients::new("shed").with_material("lumber", "m3", 0.1, "Framing"),
/// ]);
/// assert!(table.get("shed").is_some());
/// assert!(table.get("castle").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoefficientTable {
    buildings: Vec<BuildingCoefficients>,
}

impl CoefficientTable {
    pub fn empty() -> Self {
        CoefficientTable::default()
    }

    pub fn from_buildings(buildings: Vec<BuildingCoefficients>) -> Self {
        CoefficientTable { buildings }
    }

    /// Parse a coefficient table from reference-file JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Look up a building type by exact key
    pub fn get(&self, building_type: &str) -> Option<&BuildingCoefficients> {
        self.buildings.iter().find(|b| b.building_type == building_type)
    }

    /// Building type keys in file order
    pub fn building_types(&self) -> impl Iterator<Item = &str> {
        self.buildings.iter().map(|b| b.building_type.as_str())
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}

impl<'de> Deserialize<'de> for CoefficientTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = OrderedEntries::<OrderedEntries<CoefficientEntry>>::deserialize(deserializer)?;
        let buildings = raw
            .into_inner()
            .into_iter()
            .map(|(building_type, materials)| BuildingCoefficients {
                building_type,
                materials: materials
                    .into_inner()
                    .into_iter()
                    .map(|(name, entry)| MaterialCoefficient {
                        name,
                        unit: entry.unit,
                        coefficient: entry.coefficient,
                        description: entry.description,
                    })
                    .collect(),
            })
            .collect();
        Ok(CoefficientTable { buildings })
    }
}

/// Serializes back into the reference-file shape
impl Serialize for CoefficientTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Materials<'a>(&'a [MaterialCoefficient]);

        impl Serialize for Materials<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                #[derive(Serialize)]
                struct Entry<'a> {
                    unit: &'a MaterialUnit,
                    coefficient: f64,
                    description: &'a str,
                }

                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for m in self.0 {
                    map.serialize_entry(
                        &m.name,
                        &Entry {
                            unit: &m.unit,
                            coefficient: m.coefficient,
                            description: &m.description,
                        },
                    )?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.buildings.len()))?;
        for b in &self.buildings {
            map.serialize_entry(&b.building_type, &Materials(&b.materials))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "cabin": {
            "window": { "unit": "m2", "coefficient": 0.2, "description": "Glazing" },
            "lumber": { "unit": "m3", "coefficient": 0.1 },
            "door": { "unit": "count", "coefficient": 0.05, "description": "Doors" }
        },
        "barn": {}
    }"#;

    #[test]
    fn test_parse_preserves_file_order() {
        let table = CoefficientTable::from_json(SAMPLE).unwrap();
        let cabin = table.get("cabin").unwrap();
        let names: Vec<&str> = cabin.materials.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["window", "lumber", "door"]);
        assert_eq!(cabin.materials[1].description, "");
        assert!(cabin.materials[2].unit.is_count());

        let types: Vec<&str> = table.building_types().collect();
        assert_eq!(types, vec!["cabin", "barn"]);
        assert!(table.get("barn").unwrap().is_empty());
    }

    #[test]
    fn test_serialize_roundtrip_keeps_shape() {
        let table = CoefficientTable::from_json(SAMPLE).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let reparsed = CoefficientTable::from_json(&json).unwrap();
        assert_eq!(table, reparsed);
    }

    #[test]
    fn test_invalid_entry_is_rejected() {
        let bad = r#"{ "cabin": { "lumber": { "unit": "m3" } } }"#;
        assert!(CoefficientTable::from_json(bad).is_err());
    }
}
