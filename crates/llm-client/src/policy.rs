//! Remote-policy boundary adapter.
//!
//! Wraps the LLM client so that every failure mode — missing credential,
//! network trouble, a non-2xx status, a malformed body — degrades to a
//! well-formed no-op decision instead of an error. Callers can rely on
//! always getting a `Decision` back.

use tracing::warn;
use uuid::Uuid;

use common::{Decision, MarketSignal, PricingAction, Product};

use crate::client::LlmClient;
use crate::types::{DecisionError, DecisionRequest, RemoteAction, RemoteDecision};

pub struct RemotePolicy {
    client: LlmClient,
}

impl RemotePolicy {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Ask the remote model for a decision; never fails.
    pub async fn decide(&self, product: &Product, signal: &MarketSignal) -> Decision {
        let request = DecisionRequest {
            request_id: Uuid::new_v4(),
            product_id: product.id,
            price: product.price,
            stock: product.stock,
            demand: signal.demand,
            sales_trend: signal.trend,
            competitor_price: signal.competitor_price,
        };

        match self.client.decide(&request).await {
            Ok(remote) => remote_to_decision(product, remote),
            Err(e) => {
                warn!("remote decision failed for product {}: {}", product.id, e);
                noop_decision(product, &e)
            }
        }
    }
}

fn remote_to_decision(product: &Product, remote: RemoteDecision) -> Decision {
    // A "discount" of zero percent moves nothing; normalize it to the
    // no-op action so the success flag stays honest.
    let (action, magnitude) = match remote.action {
        RemoteAction::Discount if remote.discount > 0.0 => {
            (PricingAction::Discount, remote.discount)
        }
        _ => (PricingAction::NoAction, 0.0),
    };

    Decision {
        product_id: product.id,
        name: product.name.clone(),
        problem: remote.problem,
        action,
        magnitude,
        reason: remote.reason,
        before_price: product.price,
        after_price: action.after_price(product.price, magnitude),
        success: false,
    }
}

fn noop_decision(product: &Product, error: &DecisionError) -> Decision {
    let (problem, reason) = match error {
        DecisionError::MissingApiKey => (
            "Missing OpenRouter API key".to_string(),
            "Set OPENROUTER_API_KEY in your environment".to_string(),
        ),
        DecisionError::Api(_) | DecisionError::Timeout => {
            ("Request failed".to_string(), error.to_string())
        }
        DecisionError::HttpStatus { .. } => ("API error".to_string(), error.to_string()),
        DecisionError::Json(_) => ("Invalid response".to_string(), error.to_string()),
        // Parse failures carry the raw text so the operator can see what
        // the model actually said.
        DecisionError::InvalidResponse(raw) => (
            raw.clone(),
            "response could not be parsed as a pricing decision".to_string(),
        ),
    };

    Decision {
        product_id: product.id,
        name: product.name.clone(),
        problem,
        action: PricingAction::NoAction,
        magnitude: 0.0,
        reason,
        before_price: product.price,
        after_price: product.price,
        success: false,
    }
}
