pub mod synth;

pub use synth::{
    authoritative_signal, competitor_price, demand_for_trend, fallback_demand, fallback_signal,
    trend_for_demand, trend_for_sales_total,
};
