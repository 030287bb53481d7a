//! Market-signal synthesis.
//!
//! Derives a demand score, a trend classification, and a simulated
//! competitor price per product. All functions are pure and total: the
//! same inputs always yield the same signal. Randomness is intentionally
//! absent — the "pseudo-random" competitor gap is a fixed function of the
//! product id so it is reproducible across calls.

use common::{round2, MarketSignal, Product, Trend};

/// Demand score floor.
const DEMAND_MIN: i64 = 20;
/// Demand score ceiling.
const DEMAND_MAX: i64 = 95;

/// Simulated competitor price: a deterministic perturbation of our price
/// in the range of -10% to +10%, keyed by product id.
pub fn competitor_price(price: f64, product_id: i64) -> f64 {
    let gap_percent = (product_id * 17).rem_euclid(21) - 10;
    round2(price * (1.0 + gap_percent as f64 / 100.0))
}

/// Fallback demand score when no sales history is available.
///
/// Couples low stock to higher apparent demand, clamped to [20, 95].
pub fn fallback_demand(stock: i64, product_id: i64) -> i64 {
    let raw = 100 - stock + (product_id * 11).rem_euclid(21);
    raw.clamp(DEMAND_MIN, DEMAND_MAX)
}

/// Trend derived from a demand score (fallback mode).
pub fn trend_for_demand(demand: i64) -> Trend {
    if demand >= 75 {
        Trend::Up
    } else if demand <= 35 {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Trend derived from the summed recent sales quantity (authoritative mode).
pub fn trend_for_sales_total(total_quantity: i64) -> Trend {
    if total_quantity > 20 {
        Trend::Up
    } else if total_quantity < 10 {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Fixed demand score for an authoritative trend classification.
pub fn demand_for_trend(trend: Trend) -> i64 {
    match trend {
        Trend::Up => 82,
        Trend::Down => 34,
        Trend::Stable => 56,
    }
}

/// Signals from authoritative sales history.
pub fn authoritative_signal(product: &Product, total_quantity: i64) -> MarketSignal {
    let trend = trend_for_sales_total(total_quantity);
    MarketSignal {
        demand: demand_for_trend(trend),
        trend,
        competitor_price: competitor_price(product.price, product.id),
    }
}

/// Signals from the deterministic fallback formulas.
///
/// Used whenever the authoritative lookup is unavailable or fails; the
/// caller performs that fallback explicitly.
pub fn fallback_signal(product: &Product) -> MarketSignal {
    let demand = fallback_demand(product.stock, product.id);
    MarketSignal {
        demand,
        trend: trend_for_demand(demand),
        competitor_price: competitor_price(product.price, product.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, price: f64, stock: i64) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            price,
            stock,
            category: "General".into(),
        }
    }

    #[test]
    fn competitor_price_is_reproducible() {
        let a = competitor_price(1499.0, 2);
        let b = competitor_price(1499.0, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn competitor_gap_stays_within_ten_percent() {
        for id in 0..100 {
            let price = 250.0;
            let rival = competitor_price(price, id);
            assert!(rival >= price * 0.90 - 1e-9, "id={id} rival={rival}");
            assert!(rival <= price * 1.10 + 1e-9, "id={id} rival={rival}");
        }
    }

    #[test]
    fn fallback_demand_clamps_to_bounds() {
        // Huge stock drives the raw score far below the floor.
        assert_eq!(fallback_demand(500, 1), 20);
        // Zero stock drives it above the ceiling.
        assert_eq!(fallback_demand(0, 1), 95);
    }

    #[test]
    fn trend_partitions_cover_all_three_bands() {
        assert_eq!(trend_for_demand(75), Trend::Up);
        assert_eq!(trend_for_demand(74), Trend::Stable);
        assert_eq!(trend_for_demand(36), Trend::Stable);
        assert_eq!(trend_for_demand(35), Trend::Down);
        assert_eq!(trend_for_demand(95), Trend::Up);
        assert_eq!(trend_for_demand(20), Trend::Down);
    }

    #[test]
    fn sales_total_classification_boundaries() {
        assert_eq!(trend_for_sales_total(21), Trend::Up);
        assert_eq!(trend_for_sales_total(20), Trend::Stable);
        assert_eq!(trend_for_sales_total(10), Trend::Stable);
        assert_eq!(trend_for_sales_total(9), Trend::Down);
    }

    #[test]
    fn authoritative_demand_tracks_trend() {
        let p = product(4, 899.0, 19);
        assert_eq!(authoritative_signal(&p, 25).demand, 82);
        assert_eq!(authoritative_signal(&p, 15).demand, 56);
        assert_eq!(authoritative_signal(&p, 3).demand, 34);
    }

    #[test]
    fn reference_scenario_product_three() {
        // id=3, price=59.0, stock=42:
        //   demand = clamp(100 - 42 + (3*11 % 21), 20, 95) = 70
        //   competitor = round(59 * (1 + ((3*17 % 21) - 10)/100), 2) = 58.41
        let p = product(3, 59.0, 42);
        let signal = fallback_signal(&p);
        assert_eq!(signal.demand, 70);
        assert_eq!(signal.competitor_price, 58.41);
        assert_eq!(signal.trend, Trend::Stable);
    }
}
