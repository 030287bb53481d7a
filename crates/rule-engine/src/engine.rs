//! Deterministic pricing rules.
//!
//! An ordered set of mutually exclusive conditions evaluated top to
//! bottom; the first match wins, and a baseline micro-adjustment applies
//! when nothing matches. Pure: same inputs, same decision.

use common::{Decision, MarketSignal, PricingAction, Product, Trend};

use crate::types::RuleThresholds;

pub struct RulePolicy {
    thresholds: RuleThresholds,
}

impl RulePolicy {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// Decide one pricing action for a product given its signals.
    pub fn decide(&self, product: &Product, signal: &MarketSignal) -> Decision {
        let t = &self.thresholds;
        let demand = signal.demand;
        let stock = product.stock;
        let price = product.price;
        let competitor = signal.competitor_price;

        let (action, magnitude, reason) = if demand >= t.demand_high && stock <= t.stock_low {
            (
                PricingAction::IncreasePrice,
                t.increase_strong_pct,
                "Demand is high and stock is low.",
            )
        } else if stock >= t.stock_high && demand <= t.demand_weak {
            (
                PricingAction::DecreasePrice,
                t.decrease_strong_pct,
                "Stock is high and demand is weak.",
            )
        } else if competitor < price && demand < t.demand_soft {
            (
                PricingAction::DecreasePrice,
                t.undercut_decrease_pct,
                "Competitor price is lower while demand is not strong.",
            )
        } else if competitor > price && signal.trend == Trend::Up && demand > t.demand_strong {
            (
                PricingAction::IncreasePrice,
                t.overprice_increase_pct,
                "Demand trend is up and competitor is priced higher.",
            )
        } else if demand >= t.demand_moderate || stock <= t.stock_tight {
            (
                PricingAction::IncreasePrice,
                t.nudge_increase_pct,
                "Healthy demand or tighter stock supports a small increase.",
            )
        } else {
            (
                PricingAction::DecreasePrice,
                t.baseline_decrease_pct,
                "Baseline micro-adjustment to keep price movement active.",
            )
        };

        Decision {
            product_id: product.id,
            name: product.name.clone(),
            problem: format!(
                "demand={demand}, stock={stock}, competitor={competitor}, trend={}",
                signal.trend
            ),
            action,
            magnitude,
            reason: reason.to_string(),
            before_price: price,
            after_price: action.after_price(price, magnitude),
            success: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RulePolicy {
        RulePolicy::new(RuleThresholds::default())
    }

    fn product(id: i64, price: f64, stock: i64) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            price,
            stock,
            category: "General".into(),
        }
    }

    fn signal(demand: i64, trend: Trend, competitor_price: f64) -> MarketSignal {
        MarketSignal {
            demand,
            trend,
            competitor_price,
        }
    }

    #[test]
    fn high_demand_low_stock_raises_price() {
        let d = policy().decide(&product(1, 100.0, 10), &signal(80, Trend::Up, 100.0));
        assert_eq!(d.action, PricingAction::IncreasePrice);
        assert_eq!(d.magnitude, 8.0);
        assert_eq!(d.after_price, 108.00);
    }

    #[test]
    fn overstock_weak_demand_cuts_price() {
        let d = policy().decide(&product(1, 200.0, 50), &signal(40, Trend::Down, 210.0));
        assert_eq!(d.action, PricingAction::DecreasePrice);
        assert_eq!(d.magnitude, 10.0);
        assert_eq!(d.after_price, 180.00);
    }

    #[test]
    fn undercut_with_soft_demand_cuts_moderately() {
        let d = policy().decide(&product(1, 100.0, 30), &signal(50, Trend::Stable, 95.0));
        assert_eq!(d.action, PricingAction::DecreasePrice);
        assert_eq!(d.magnitude, 6.0);
    }

    #[test]
    fn overpriced_rival_and_upward_trend_raise_moderately() {
        let d = policy().decide(&product(1, 100.0, 30), &signal(69, Trend::Up, 105.0));
        assert_eq!(d.action, PricingAction::IncreasePrice);
        assert_eq!(d.magnitude, 4.0);
    }

    #[test]
    fn moderate_demand_or_tight_stock_nudges_up() {
        // Demand 56 with rival priced above us skips rules 1-4.
        let d = policy().decide(&product(1, 100.0, 30), &signal(56, Trend::Stable, 105.0));
        assert_eq!(d.action, PricingAction::IncreasePrice);
        assert_eq!(d.magnitude, 3.0);

        // Tight stock alone also qualifies.
        let d = policy().decide(&product(1, 100.0, 18), &signal(50, Trend::Stable, 105.0));
        assert_eq!(d.action, PricingAction::IncreasePrice);
        assert_eq!(d.magnitude, 3.0);
    }

    #[test]
    fn baseline_applies_when_nothing_matches() {
        // Stock neither tight nor high, demand neither weak nor moderate,
        // competitor priced above us: nothing matches.
        let d = policy().decide(&product(1, 100.0, 25), &signal(46, Trend::Stable, 106.0));
        assert_eq!(d.action, PricingAction::DecreasePrice);
        assert_eq!(d.magnitude, 2.0);
        assert_eq!(d.reason, "Baseline micro-adjustment to keep price movement active.");
    }

    #[test]
    fn first_match_wins_over_later_rules() {
        // Qualifies for both rule 1 (demand_high + stock_low) and rule 5
        // (demand_moderate); rule 1 must win.
        let d = policy().decide(&product(1, 100.0, 12), &signal(72, Trend::Up, 101.0));
        assert_eq!(d.magnitude, 8.0);
    }

    #[test]
    fn decide_is_pure() {
        let p = product(7, 2799.0, 32);
        let s = signal(63, Trend::Stable, 2855.0);
        let policy = policy();
        let a = policy.decide(&p, &s);
        let b = policy.decide(&p, &s);
        assert_eq!(a, b);
    }

    #[test]
    fn problem_string_reports_signals() {
        let d = policy().decide(&product(3, 59.0, 42), &signal(70, Trend::Stable, 58.41));
        assert_eq!(d.problem, "demand=70, stock=42, competitor=58.41, trend=stable");
    }

    #[test]
    fn threshold_table_swaps_deployment_variant() {
        // A deployment that treats demand 60 as "high" flips the action
        // for the same inputs — no code change, just a different table.
        let variant = RulePolicy::new(RuleThresholds {
            demand_high: 60,
            ..RuleThresholds::default()
        });
        let p = product(1, 100.0, 10);
        let s = signal(65, Trend::Stable, 100.0);

        assert_eq!(policy().decide(&p, &s).magnitude, 3.0);
        assert_eq!(variant.decide(&p, &s).magnitude, 8.0);
    }
}
