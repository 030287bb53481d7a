use serde::{Deserialize, Serialize};

/// Threshold/action table for the rule policy.
///
/// Deployments differ only in these numbers; the evaluation order is
/// fixed. Every field has a default matching the reference storefront so
/// a config file only needs to override what it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleThresholds {
    /// Demand at or above this plus low stock triggers the strong increase.
    #[serde(default = "default_demand_high")]
    pub demand_high: i64,
    /// Stock at or below this counts as low.
    #[serde(default = "default_stock_low")]
    pub stock_low: i64,
    /// Magnitude (percent) of the strong increase.
    #[serde(default = "default_increase_strong_pct")]
    pub increase_strong_pct: f64,

    /// Stock at or above this counts as overstocked.
    #[serde(default = "default_stock_high")]
    pub stock_high: i64,
    /// Demand at or below this counts as weak.
    #[serde(default = "default_demand_weak")]
    pub demand_weak: i64,
    /// Magnitude (percent) of the strong decrease.
    #[serde(default = "default_decrease_strong_pct")]
    pub decrease_strong_pct: f64,

    /// Demand below this counts as soft when a competitor undercuts us.
    #[serde(default = "default_demand_soft")]
    pub demand_soft: i64,
    /// Magnitude (percent) of the undercut response.
    #[serde(default = "default_undercut_decrease_pct")]
    pub undercut_decrease_pct: f64,

    /// Demand above this counts as strong when a competitor overprices.
    #[serde(default = "default_demand_strong")]
    pub demand_strong: i64,
    /// Magnitude (percent) of the overprice response.
    #[serde(default = "default_overprice_increase_pct")]
    pub overprice_increase_pct: f64,

    /// Demand at or above this supports a small nudge upward.
    #[serde(default = "default_demand_moderate")]
    pub demand_moderate: i64,
    /// Stock at or below this counts as tightening.
    #[serde(default = "default_stock_tight")]
    pub stock_tight: i64,
    /// Magnitude (percent) of the small nudge.
    #[serde(default = "default_nudge_increase_pct")]
    pub nudge_increase_pct: f64,

    /// Baseline magnitude (percent) when no rule matches.
    #[serde(default = "default_baseline_decrease_pct")]
    pub baseline_decrease_pct: f64,
}

fn default_demand_high() -> i64 {
    70
}
fn default_stock_low() -> i64 {
    15
}
fn default_increase_strong_pct() -> f64 {
    8.0
}
fn default_stock_high() -> i64 {
    40
}
fn default_demand_weak() -> i64 {
    45
}
fn default_decrease_strong_pct() -> f64 {
    10.0
}
fn default_demand_soft() -> i64 {
    60
}
fn default_undercut_decrease_pct() -> f64 {
    6.0
}
fn default_demand_strong() -> i64 {
    68
}
fn default_overprice_increase_pct() -> f64 {
    4.0
}
fn default_demand_moderate() -> i64 {
    55
}
fn default_stock_tight() -> i64 {
    20
}
fn default_nudge_increase_pct() -> f64 {
    3.0
}
fn default_baseline_decrease_pct() -> f64 {
    2.0
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            demand_high: default_demand_high(),
            stock_low: default_stock_low(),
            increase_strong_pct: default_increase_strong_pct(),
            stock_high: default_stock_high(),
            demand_weak: default_demand_weak(),
            decrease_strong_pct: default_decrease_strong_pct(),
            demand_soft: default_demand_soft(),
            undercut_decrease_pct: default_undercut_decrease_pct(),
            demand_strong: default_demand_strong(),
            overprice_increase_pct: default_overprice_increase_pct(),
            demand_moderate: default_demand_moderate(),
            stock_tight: default_stock_tight(),
            nudge_increase_pct: default_nudge_increase_pct(),
            baseline_decrease_pct: default_baseline_decrease_pct(),
        }
    }
}
