use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::Trend;

/// Maximum discount (percent) the remote model may propose.
pub const MAX_DISCOUNT_PCT: f64 = 50.0;

/// Signal snapshot sent to the remote model as decision context.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRequest {
    pub request_id: Uuid,
    pub product_id: i64,
    pub price: f64,
    pub stock: i64,
    pub demand: i64,
    pub sales_trend: Trend,
    pub competitor_price: f64,
}

/// The remote policy's action vocabulary.
///
/// Intentionally narrower than the rule policy's: the remote side may
/// only discount or hold, never raise prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RemoteAction {
    Discount,
    NoAction,
}

/// Structured decision the remote model must answer with.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RemoteDecision {
    /// What the model thinks is wrong (or fine) with current pricing.
    pub problem: String,
    pub action: RemoteAction,
    /// Discount percentage in [0, 50]. 0 means no discount.
    pub discount: f64,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("missing OpenRouter API key")]
    MissingApiKey,
    #[error("API request failed: {0}")]
    Api(String),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("request timed out")]
    Timeout,
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid decision response: {0}")]
    InvalidResponse(String),
}

/// Bounds check on a parsed remote decision.
pub fn validate_remote_decision(decision: &RemoteDecision) -> Result<(), String> {
    if !decision.discount.is_finite() {
        return Err("discount must be a finite number".into());
    }
    if !(0.0..=MAX_DISCOUNT_PCT).contains(&decision.discount) {
        return Err(format!(
            "discount must be in [0,{}], got {}",
            MAX_DISCOUNT_PCT, decision.discount
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(discount: f64) -> RemoteDecision {
        RemoteDecision {
            problem: "stock is aging".into(),
            action: RemoteAction::Discount,
            discount,
            reason: "clear slow inventory".into(),
        }
    }

    #[test]
    fn validate_accepts_bounded_discounts() {
        assert!(validate_remote_decision(&decision(0.0)).is_ok());
        assert!(validate_remote_decision(&decision(50.0)).is_ok());
        assert!(validate_remote_decision(&decision(12.5)).is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_discounts() {
        assert!(validate_remote_decision(&decision(-1.0)).is_err());
        assert!(validate_remote_decision(&decision(50.1)).is_err());
        assert!(validate_remote_decision(&decision(f64::NAN)).is_err());
    }

    #[test]
    fn remote_decision_rejects_unknown_fields() {
        let raw = r#"{"problem":"p","action":"discount","discount":5,"reason":"r","extra":1}"#;
        assert!(serde_json::from_str::<RemoteDecision>(raw).is_err());
    }

    #[test]
    fn remote_decision_requires_all_fields() {
        let raw = r#"{"problem":"p","action":"no_action"}"#;
        assert!(serde_json::from_str::<RemoteDecision>(raw).is_err());
    }

    #[test]
    fn action_names_are_snake_case() {
        let d: RemoteDecision =
            serde_json::from_str(r#"{"problem":"p","action":"no_action","discount":0,"reason":"r"}"#)
                .unwrap();
        assert_eq!(d.action, RemoteAction::NoAction);
    }
}
