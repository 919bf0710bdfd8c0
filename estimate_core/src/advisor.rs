//! # Advisor
//!
//! Rule-based suggestions for a cost estimate. Four independent groups:
//!
//! | Group | Scans | Keyed on |
//! |---|---|---|
//! | optimization suggestions | `top_items` | material name + quality tier |
//! | anomaly alerts | `pie_slices` | cost share above [`ANOMALY_THRESHOLD_PERCENT`] |
//! | technical advice | `line_items` | material name |
//! | quality level recommendations | - | quality tier |
//!
//! Each scanned group is an ordered list of [`Rule`]s. For every item, every
//! rule whose predicate holds contributes its message, in list order. Adding a
//! rule means adding a table entry; the evaluation loop does not change.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::estimate::{CostEstimate, CostLineItem, PieSlice};
use crate::project::QualityTier;

/// Cost share (percent of total) above which an item is flagged
pub const ANOMALY_THRESHOLD_PERCENT: f64 = 15.0;

/// Suggestions produced for one estimate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvisorReport {
    pub optimization_suggestions: Vec<String>,
    pub anomaly_alerts: Vec<String>,
    pub technical_advice: Vec<String>,
    pub quality_level_recommendations: Vec<String>,
}

impl AdvisorReport {
    /// Groups as (key, messages) pairs in display order
    pub fn groups(&self) -> [(&'static str, &[String]); 4] {
        [
            ("optimization_suggestions", self.optimization_suggestions.as_slice()),
            ("anomaly_alerts", self.anomaly_alerts.as_slice()),
            ("technical_advice", self.technical_advice.as_slice()),
            ("quality_level_recommendations", self.quality_level_recommendations.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.groups().iter().all(|(_, messages)| messages.is_empty())
    }
}

/// A predicate paired with the message it emits
pub struct Rule<T> {
    pub applies: fn(&T, QualityTier) -> bool,
    pub message: fn(&T) -> String,
}

impl<T> Rule<T> {
    fn evaluate(rules: &[Rule<T>], items: &[T], tier: QualityTier) -> Vec<String> {
        items
            .iter()
            .flat_map(move |item| {
                rules
                    .iter()
                    .filter(move |rule| (rule.applies)(item, tier))
                    .map(move |rule| (rule.message)(item))
            })
            .collect()
    }
}

/// Cheaper or premium alternatives for the most expensive items
pub static OPTIMIZATION_RULES: &[Rule<PieSlice>] = &[
    Rule {
        applies: |item, tier| item.name == "flooring" && tier == QualityTier::Economic,
        message: |_| "You can reduce costs by using laminate flooring instead of hardwood.".to_string(),
    },
    Rule {
        applies: |item, tier| item.name == "flooring" && tier == QualityTier::Luxury,
        message: |_| "Consider using premium hardwood flooring for a luxury finish.".to_string(),
    },
    Rule {
        applies: |item, tier| item.name == "window" && tier == QualityTier::Economic,
        message: |_| "Consider reducing the number or size of windows to lower expenses.".to_string(),
    },
];

/// Items taking a disproportionate share of the budget
pub static ANOMALY_RULES: &[Rule<PieSlice>] = &[Rule {
    applies: |item, _| item.percent > ANOMALY_THRESHOLD_PERCENT,
    message: |item| {
        format!(
            "The cost share of {} is {:?}%, which is higher than typical projects.",
            item.name, item.percent
        )
    },
}];

/// Safety and quality reminders, independent of cost
pub static TECHNICAL_RULES: &[Rule<CostLineItem>] = &[Rule {
    applies: |item, _| item.name == "insulation",
    message: |_| "Do not remove thermal insulation as it is essential for energy efficiency.".to_string(),
}];

/// General recommendations for a quality tier
pub fn quality_recommendations(tier: QualityTier) -> &'static [&'static str] {
    match tier {
        QualityTier::Economic => &[
            "For economic level, use standard doors instead of luxury models.",
            "Choose basic kitchen cabinets to save costs.",
        ],
        QualityTier::Luxury => &[
            "For luxury level, consider adding smart home systems.",
            "Use premium materials for flooring and windows.",
        ],
        QualityTier::Standard => &["Standard level: balance quality and cost for best value."],
    }
}

/// Run every rule group against an estimate.
///
/// # Example
///
/// ```rust
/// use estimate_core::advisor::advise;
/// use estimate_core::estimate::estimate_costs;
/// use estimate_core::materials::PriceTable;
/// use estimate_core::project::QualityTier;
/// use estimate_core::units::AreaUnit;
///
/// let empty = estimate_costs(&[], &PriceTable::empty(), None, AreaUnit::SquareMeters, 5);
/// let report = advise(&empty, QualityTier::Standard);
/// assert!(report.anomaly_alerts.is_empty());
/// assert_eq!(report.quality_level_recommendations.len(), 1);
/// ```
pub fn advise(estimate: &CostEstimate, tier: QualityTier) -> AdvisorReport {
    let report = AdvisorReport {
        optimization_suggestions: Rule::evaluate(OPTIMIZATION_RULES, &estimate.top_items, tier),
        anomaly_alerts: Rule::evaluate(ANOMALY_RULES, &estimate.pie_slices, tier),
        technical_advice: Rule::evaluate(TECHNICAL_RULES, &estimate.line_items, tier),
        quality_level_recommendations: quality_recommendations(tier)
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    debug!(
        %tier,
        optimization = report.optimization_suggestions.len(),
        anomalies = report.anomaly_alerts.len(),
        technical = report.technical_advice.len(),
        "advisor rules evaluated"
    );

    report
}
