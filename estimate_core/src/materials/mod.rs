//! # Reference Data
//!
//! Coefficient and price tables, one pair per area unit system.
//!
//! Reference data is loaded once and then only read. The pipeline takes it as
//! an injected `&ReferenceData`, so tests run against fixture tables while the
//! CLI passes either the built-in tables or tables loaded from a data
//! directory.
//!
//! ## Load failures
//!
//! A table that cannot be read or parsed becomes an empty table and a logged
//! warning. Estimation still runs; it just derives no quantities or finds no
//! prices.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::materials::ReferenceData;
//! use estimate_core::units::AreaUnit;
//!
//! let data = ReferenceData::builtin();
//! let types: Vec<&str> = data.coefficients(AreaUnit::SquareMeters).building_types().collect();
//! assert!(types.contains(&"wood_frame_house"));
//! ```

pub mod coefficients;
pub mod prices;

pub use coefficients::{BuildingCoefficients, CoefficientTable, MaterialCoefficient};
pub use prices::{MaterialPrice, PriceTable};

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use once_cell::sync::Lazy;
use rust_embed::RustEmbed;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::file_io;
use crate::units::AreaUnit;

/// Reference tables shipped inside the binary
#[derive(RustEmbed)]
#[folder = "assets/data/"]
struct BuiltinData;

static BUILTIN: Lazy<ReferenceData> = Lazy::new(|| {
    let load = |unit: AreaUnit| UnitTables {
        coefficients: parse_embedded(&coefficients_file_name(unit), CoefficientTable::from_json),
        prices: parse_embedded(&prices_file_name(unit), PriceTable::from_json),
    };
    ReferenceData {
        metric: load(AreaUnit::SquareMeters),
        imperial: load(AreaUnit::SquareFeet),
    }
});

fn parse_embedded<T: Default>(name: &str, parse: fn(&str) -> serde_json::Result<T>) -> T {
    let Some(file) = BuiltinData::get(name) else {
        warn!(file = name, "built-in reference table missing, using empty table");
        return T::default();
    };
    let parsed = std::str::from_utf8(&file.data)
        .map_err(|e| e.to_string())
        .and_then(|s| parse(s).map_err(|e| e.to_string()));
    match parsed {
        Ok(table) => table,
        Err(reason) => {
            warn!(file = name, %reason, "built-in reference table invalid, using empty table");
            T::default()
        }
    }
}

/// File name of the coefficient table for a unit system
pub fn coefficients_file_name(unit: AreaUnit) -> String {
    format!("materials_{}.json", unit.symbol())
}

/// File name of the price table for a unit system
pub fn prices_file_name(unit: AreaUnit) -> String {
    format!("prices_{}.json", unit.symbol())
}

/// Coefficient and price tables for one unit system
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitTables {
    pub coefficients: CoefficientTable,
    pub prices: PriceTable,
}

/// Read-only reference data for both unit systems.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    metric: UnitTables,
    imperial: UnitTables,
}

impl ReferenceData {
    pub fn new(metric: UnitTables, imperial: UnitTables) -> Self {
        ReferenceData { metric, imperial }
    }

    /// Reference data with no coefficients and no prices
    pub fn empty() -> Self {
        ReferenceData::default()
    }

    /// Tables embedded in the binary, parsed on first use
    pub fn builtin() -> &'static ReferenceData {
        &BUILTIN
    }

    /// Load `materials_<unit>.json` and `prices_<unit>.json` from a directory.
    ///
    /// Any file that is missing or invalid yields an empty table for that
    /// slot, with a warning.
    pub fn load_from_dir(dir: &Path) -> Self {
        let load = |unit: AreaUnit| UnitTables {
            coefficients: file_io::load_coefficients(&dir.join(coefficients_file_name(unit)))
                .unwrap_or_else(|e| {
                    warn!(error = %e, unit = %unit, "coefficient table unavailable, using empty table");
                    CoefficientTable::empty()
                }),
            prices: file_io::load_prices(&dir.join(prices_file_name(unit))).unwrap_or_else(|e| {
                warn!(error = %e, unit = %unit, "price table unavailable, using empty table");
                PriceTable::empty()
            }),
        };
        ReferenceData {
            metric: load(AreaUnit::SquareMeters),
            imperial: load(AreaUnit::SquareFeet),
        }
    }

    pub fn tables(&self, unit: AreaUnit) -> &UnitTables {
        match unit {
            AreaUnit::SquareMeters => &self.metric,
            AreaUnit::SquareFeet => &self.imperial,
        }
    }

    pub fn coefficients(&self, unit: AreaUnit) -> &CoefficientTable {
        &self.tables(unit).coefficients
    }

    pub fn prices(&self, unit: AreaUnit) -> &PriceTable {
        &self.tables(unit).prices
    }

    /// Building types with coefficients in a unit system, in table order
    pub fn building_types(&self, unit: AreaUnit) -> Vec<&str> {
        self.coefficients(unit).building_types().collect()
    }
}

/// Map entries in document order.
///
/// JSON objects in reference files are ordered by hand, and takeoffs must keep
/// that order. A repeated key keeps its first position and takes the last value.
pub(crate) struct OrderedEntries<V>(Vec<(String, V)>);

impl<V> OrderedEntries<V> {
    pub(crate) fn into_inner(self) -> Vec<(String, V)> {
        self.0
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of named entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, V)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    match entries.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = value,
                        None => entries.push((key, value)),
                    }
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::MaterialUnit;

    #[test]
    fn test_builtin_tables_load() {
        let data = ReferenceData::builtin();
        let metric = data.coefficients(AreaUnit::SquareMeters);
        let house = metric.get("wood_frame_house").unwrap();
        assert_eq!(house.materials[0].name, "lumber");
        assert_eq!(house.materials[0].unit, MaterialUnit::CubicMeters);
        assert_eq!(house.materials[0].coefficient, 0.16);

        assert_eq!(data.prices(AreaUnit::SquareMeters).get("lumber").unwrap().unit_price, 650.0);
        assert!(data.coefficients(AreaUnit::SquareFeet).get("wood_frame_house").is_some());
        assert!(!data.prices(AreaUnit::SquareFeet).is_empty());

        let types = data.building_types(AreaUnit::SquareMeters);
        assert_eq!(types[0], "wood_frame_house");
        assert!(types.contains(&"steel_frame_building"));
    }

    #[test]
    fn test_every_builtin_material_is_priced() {
        let data = ReferenceData::builtin();
        for unit in AreaUnit::ALL {
            let tables = data.tables(unit);
            for building in tables.coefficients.building_types() {
                for material in &tables.coefficients.get(building).unwrap().materials {
                    assert!(
                        tables.prices.get(&material.name).is_some(),
                        "{} ({}) has no {} price",
                        material.name,
                        building,
                        unit
                    );
                }
            }
        }
    }

    #[test]
    fn test_duplicate_keys_keep_first_position() {
        let entries: OrderedEntries<u32> = serde_json::from_str(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        assert_eq!(
            entries.into_inner(),
            vec![("a".to_string(), 3), ("b".to_string(), 2)]
        );
    }

    #[test]
    fn test_load_from_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = ReferenceData::load_from_dir(&dir.path().join("nope"));
        assert_eq!(data, ReferenceData::empty());
    }

    #[test]
    fn test_load_from_dir_partial() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("materials_m2.json"),
            r#"{"hut": {"lumber": {"unit": "m3", "coefficient": 0.5}}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("prices_m2.json"), "not json").unwrap();

        let data = ReferenceData::load_from_dir(dir.path());
        assert!(data.coefficients(AreaUnit::SquareMeters).get("hut").is_some());
        assert!(data.prices(AreaUnit::SquareMeters).is_empty());
        assert!(data.coefficients(AreaUnit::SquareFeet).is_empty());
    }
}
