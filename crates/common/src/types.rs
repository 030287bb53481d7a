//! Domain types shared across the agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Round a currency amount to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ── Catalog Types ─────────────────────────────────────────────────────

/// A storefront product as held by the product store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Unit price, non-negative, 2-decimal currency.
    pub price: f64,
    /// Units on hand, never negative.
    pub stock: i64,
    #[serde(default)]
    pub category: String,
}

/// Coarse classification of recent sales velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        };
        f.write_str(s)
    }
}

/// Synthesized market signals for one product.
///
/// Computed fresh on every request — never cached across calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSignal {
    /// Synthetic demand score in [20, 95].
    pub demand: i64,
    pub trend: Trend,
    /// Simulated competitor price (deterministic per product id).
    pub competitor_price: f64,
}

// ── Pricing Decisions ─────────────────────────────────────────────────

/// The closed action vocabulary across both policies.
///
/// The rule policy emits `IncreasePrice`/`DecreasePrice`; the remote
/// policy is constrained to `Discount`/`NoAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingAction {
    IncreasePrice,
    DecreasePrice,
    Discount,
    NoAction,
}

impl PricingAction {
    /// Whether this action actually moves the price.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, PricingAction::NoAction)
    }

    /// Price after applying `magnitude` percent in this action's direction.
    pub fn after_price(&self, before: f64, magnitude: f64) -> f64 {
        match self {
            PricingAction::IncreasePrice => round2(before * (1.0 + magnitude / 100.0)),
            PricingAction::DecreasePrice | PricingAction::Discount => {
                round2(before * (1.0 - magnitude / 100.0))
            }
            PricingAction::NoAction => round2(before),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PricingAction::IncreasePrice => "increase_price",
            PricingAction::DecreasePrice => "decrease_price",
            PricingAction::Discount => "discount",
            PricingAction::NoAction => "no_action",
        }
    }
}

impl std::str::FromStr for PricingAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increase_price" => Ok(PricingAction::IncreasePrice),
            "decrease_price" => Ok(PricingAction::DecreasePrice),
            "discount" => Ok(PricingAction::Discount),
            "no_action" => Ok(PricingAction::NoAction),
            other => Err(format!("unknown pricing action '{other}'")),
        }
    }
}

impl std::fmt::Display for PricingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pricing decision produced by a policy run.
///
/// Immutable once created; `success` stays false until the apply phase
/// finalizes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub product_id: i64,
    pub name: String,
    /// Free-text summary of the observed signals.
    pub problem: String,
    pub action: PricingAction,
    /// Percentage magnitude of the action.
    pub magnitude: f64,
    /// Human-readable rationale.
    pub reason: String,
    pub before_price: f64,
    pub after_price: f64,
    pub success: bool,
}

impl Decision {
    /// Finalize the success flag: only a real mutation with a positive
    /// after-price counts as applied.
    pub fn finalized(mut self) -> Self {
        self.success = self.action.is_mutation() && self.after_price > 0.0;
        self
    }
}

/// A finalized decision as recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    #[serde(flatten)]
    pub decision: Decision,
    pub applied_at: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn new(decision: Decision) -> Self {
        Self {
            decision,
            applied_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn after_price_increase_rounds_to_cents() {
        let after = PricingAction::IncreasePrice.after_price(100.0, 8.0);
        assert_eq!(after, 108.00);
    }

    #[test]
    fn after_price_decrease_rounds_to_cents() {
        let after = PricingAction::DecreasePrice.after_price(200.0, 10.0);
        assert_eq!(after, 180.00);
    }

    #[test]
    fn after_price_discount_matches_decrease() {
        assert_eq!(
            PricingAction::Discount.after_price(59.0, 1.0),
            PricingAction::DecreasePrice.after_price(59.0, 1.0)
        );
    }

    #[test]
    fn no_action_leaves_price_unchanged() {
        assert_eq!(PricingAction::NoAction.after_price(42.37, 15.0), 42.37);
    }

    #[test]
    fn finalized_requires_mutation_and_positive_price() {
        let base = Decision {
            product_id: 1,
            name: "Test".into(),
            problem: String::new(),
            action: PricingAction::IncreasePrice,
            magnitude: 5.0,
            reason: String::new(),
            before_price: 10.0,
            after_price: 10.5,
            success: false,
        };

        assert!(base.clone().finalized().success);

        let noop = Decision {
            action: PricingAction::NoAction,
            after_price: 10.0,
            ..base.clone()
        };
        assert!(!noop.finalized().success);

        let zeroed = Decision {
            action: PricingAction::DecreasePrice,
            after_price: 0.0,
            ..base
        };
        assert!(!zeroed.finalized().success);
    }

    #[test]
    fn action_round_trips_through_str() {
        for action in [
            PricingAction::IncreasePrice,
            PricingAction::DecreasePrice,
            PricingAction::Discount,
            PricingAction::NoAction,
        ] {
            assert_eq!(action.as_str().parse::<PricingAction>().unwrap(), action);
        }
        assert!("raise_price".parse::<PricingAction>().is_err());
    }
}
