//! # Cost Estimation
//!
//! Prices a material takeoff against a price table and summarizes it:
//!
//! - `line_items` - every material, priced or not, in takeoff order
//! - `total_cost` - sum of priced line items
//! - `pie_slices` - each priced item's share of the total, most expensive first
//! - `top_items` - the first N pie slices
//! - `cost_per_area` - total cost divided by floor area, when the area is usable
//!
//! Unpriced materials keep `unit_price`/`total_price` as `None` (not zero) so a
//! consumer can tell "free" from "unknown".

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::materials::PriceTable;
use crate::quantities::MaterialQuantity;
use crate::units::{round2, AreaUnit, MaterialUnit};

/// Number of ranked items kept in `top_items` by default
pub const DEFAULT_TOP_N: usize = 5;

/// Description used for materials with no price entry
pub const NO_PRICE_DESCRIPTION: &str = "No price info available";

/// One priced (or unpriced) material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLineItem {
    pub name: String,
    pub quantity: f64,
    pub unit: MaterialUnit,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub description: String,
}

impl CostLineItem {
    pub fn is_priced(&self) -> bool {
        self.total_price.is_some()
    }
}

/// A priced item's share of the total cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub name: String,
    pub total_price: f64,
    /// Percent of `total_cost`, rounded to 2 decimals
    pub percent: f64,
}

/// Priced takeoff with totals and ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    #[serde(rename = "estimation_details")]
    pub line_items: Vec<CostLineItem>,
    pub total_cost: f64,
    #[serde(rename = "pie_chart_data")]
    pub pie_slices: Vec<PieSlice>,
    pub top_items: Vec<PieSlice>,
    pub cost_per_area: Option<f64>,
    pub area_unit: AreaUnit,
}

impl CostEstimate {
    /// Items that had no price entry
    pub fn unpriced(&self) -> impl Iterator<Item = &CostLineItem> {
        self.line_items.iter().filter(|i| !i.is_priced())
    }

    /// Sum of the priced line items, unrounded
    pub fn material_total(&self) -> f64 {
        self.line_items.iter().filter_map(|i| i.total_price).sum()
    }
}

/// Price a takeoff.
///
/// # Arguments
///
/// * `materials` - derived quantities, in takeoff order
/// * `prices` - price table for the same unit system
/// * `area` - floor area used for `cost_per_area`; `None`, zero or negative
///   leaves `cost_per_area` as `None`
/// * `area_unit` - echoed into the estimate
/// * `top_n` - how many ranked slices to keep in `top_items`
///
/// # Example
///
/// ```rust
/// use estimate_core::estimate::estimate_costs;
/// use estimate_core::materials::PriceTable;
/// use estimate_core::quantities::MaterialQuantity;
/// use estimate_core::units::{AreaUnit, MaterialUnit};
///
/// let materials = vec![MaterialQuantity {
///     name: "lumber".to_string(),
///     quantity: 32.0,
///     unit: MaterialUnit::CubicMeters,
///     description: String::new(),
/// }];
/// let prices = PriceTable::empty().with_price("lumber", 650.0, "per m3");
///
/// let estimate = estimate_costs(&materials, &prices, Some(200.0), AreaUnit::SquareMeters, 5);
/// assert_eq!(estimate.total_cost, 20800.0);
/// assert_eq!(estimate.cost_per_area, Some(104.0));
/// assert_eq!(estimate.top_items[0].percent, 100.0);
/// ```
pub fn estimate_costs(
    materials: &[MaterialQuantity],
    prices: &PriceTable,
    area: Option<f64>,
    area_unit: AreaUnit,
    top_n: usize,
) -> CostEstimate {
    let line_items: Vec<CostLineItem> = materials.iter().map(|m| price_item(m, prices)).collect();

    let total_cost = round2(line_items.iter().filter_map(|i| i.total_price).sum());

    let mut pie_slices: Vec<PieSlice> = line_items
        .iter()
        .filter_map(|item| {
            let total_price = item.total_price.filter(|p| *p != 0.0)?;
            let percent = if total_cost != 0.0 {
                round2(100.0 * total_price / total_cost)
            } else {
                0.0
            };
            Some(PieSlice {
                name: item.name.clone(),
                total_price,
                percent,
            })
        })
        .collect();
    // sort_by is stable: equal totals keep takeoff order
    pie_slices.sort_by(|a, b| b.total_price.total_cmp(&a.total_price));

    let top_items = pie_slices.iter().take(top_n).cloned().collect();

    let cost_per_area = area
        .filter(|a| a.is_finite() && *a > 0.0)
        .map(|a| round2(total_cost / a));

    debug!(
        items = line_items.len(),
        priced = pie_slices.len(),
        total_cost,
        "estimated material costs"
    );

    CostEstimate {
        line_items,
        total_cost,
        pie_slices,
        top_items,
        cost_per_area,
        area_unit,
    }
}

fn price_item(material: &MaterialQuantity, prices: &PriceTable) -> CostLineItem {
    match prices.get(&material.name) {
        Some(price) => CostLineItem {
            name: material.name.clone(),
            quantity: material.quantity,
            unit: material.unit.clone(),
            unit_price: Some(price.unit_price),
            total_price: Some(round2(material.quantity * price.unit_price)),
            description: price.description.clone(),
        },
        None => CostLineItem {
            name: material.name.clone(),
            quantity: material.quantity,
            unit: material.unit.clone(),
            unit_price: None,
            total_price: None,
            description: NO_PRICE_DESCRIPTION.to_string(),
        },
    }
}
