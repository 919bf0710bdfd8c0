//! Material price tables
//!
//! Unit prices keyed by exact material name. A material missing from the table
//! is not an error: the estimator lists it without a price.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::OrderedEntries;
use crate::units::MaterialUnit;

/// Unit price for one material
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialPrice {
    pub name: String,
    pub unit_price: f64,
    pub description: String,
    /// Priced unit, informational only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<MaterialUnit>,
}

#[derive(Debug, Clone, Deserialize)]
struct PriceEntry {
    unit_price: f64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    unit: Option<MaterialUnit>,
}

/// Price table for one area unit system
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTable {
    prices: Vec<MaterialPrice>,
    index: HashMap<String, usize>,
}

impl PriceTable {
    pub fn empty() -> Self {
        PriceTable::default()
    }

    pub fn from_prices(prices: Vec<MaterialPrice>) -> Self {
        let mut table = PriceTable::empty();
        for price in prices {
            table.insert(price);
        }
        table
    }

    /// Parse a price table from reference-file JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Insert or replace a price; a replaced entry keeps its position.
    pub fn insert(&mut self, price: MaterialPrice) {
        match self.index.get(&price.name) {
            Some(&i) => self.prices[i] = price,
            None => {
                self.index.insert(price.name.clone(), self.prices.len());
                self.prices.push(price);
            }
        }
    }

    /// Convenience builder for fixtures
    pub fn with_price(mut self, name: impl Into<String>, unit_price: f64, description: impl Into<String>) -> Self {
        self.insert(MaterialPrice {
            name: name.into(),
            unit_price,
            description: description.into(),
            unit: None,
        });
        self
    }

    /// Exact-name lookup
    pub fn get(&self, name: &str) -> Option<&MaterialPrice> {
        self.index.get(name).map(|&i| &self.prices[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialPrice> {
        self.prices.iter()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl<'de> Deserialize<'de> for PriceTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = OrderedEntries::<PriceEntry>::deserialize(deserializer)?;
        Ok(PriceTable::from_prices(
            raw.into_inner()
                .into_iter()
                .map(|(name, entry)| MaterialPrice {
                    name,
                    unit_price: entry.unit_price,
                    description: entry.description,
                    unit: entry.unit,
                })
                .collect(),
        ))
    }
}

impl Serialize for PriceTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            unit_price: f64,
            description: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            unit: Option<&'a MaterialUnit>,
        }

        let mut map = serializer.serialize_map(Some(self.prices.len()))?;
        for p in &self.prices {
            map.serialize_entry(
                &p.name,
                &Entry {
                    unit_price: p.unit_price,
                    description: &p.description,
                    unit: p.unit.as_ref(),
                },
            )?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_name_lookup() {
        let table = PriceTable::empty()
            .with_price("lumber", 650.0, "Framing lumber")
            .with_price("window", 250.0, "Windows");

        assert_eq!(table.get("lumber").unwrap().unit_price, 650.0);
        assert!(table.get("Lumber").is_none());
        assert!(table.get("lumber ").is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_replace_keeps_position() {
        let table = PriceTable::empty()
            .with_price("a", 1.0, "")
            .with_price("b", 2.0, "")
            .with_price("a", 3.0, "updated");

        let names: Vec<&str> = table.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(table.get("a").unwrap().unit_price, 3.0);
    }

    #[test]
    fn test_parse_from_json() {
        let json = r#"{
            "lumber": { "unit_price": 650, "description": "per m3", "unit": "m3" },
            "paint": { "unit_price": 4.0 }
        }"#;
        let table = PriceTable::from_json(json).unwrap();
        assert_eq!(table.get("lumber").unwrap().unit, Some(MaterialUnit::CubicMeters));
        assert_eq!(table.get("paint").unwrap().description, "");

        let reparsed = PriceTable::from_json(&serde_json::to_string(&table).unwrap()).unwrap();
        assert_eq!(table, reparsed);
    }
}
