use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::instrument;

use crate::types::{validate_remote_decision, DecisionError, DecisionRequest, RemoteDecision};

pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";

pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
}

impl LlmClient {
    pub fn new(
        api_key: Option<String>,
        api_base: impl Into<String>,
        model: impl Into<String>,
        timeout_ms: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_base: api_base.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn extract_message_content(response_body: &serde_json::Value) -> Result<&str, DecisionError> {
        if let Some(error) = response_body.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            return Err(DecisionError::Api(message.to_string()));
        }

        response_body
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| DecisionError::InvalidResponse(response_body.to_string()))
    }

    /// Strip markdown fences and any surrounding prose, leaving the
    /// outermost JSON object.
    fn strip_formatting(text: &str) -> String {
        let cleaned = text.replace("```json", "").replace("```", "");
        let cleaned = cleaned.trim();
        let start = cleaned.find('{').unwrap_or(0);
        let end = cleaned.rfind('}').map(|i| i + 1).unwrap_or(cleaned.len());
        if start >= end {
            // No balanced object; let the parse fail on the full text.
            return cleaned.to_string();
        }
        cleaned[start..end].to_string()
    }

    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    pub async fn decide(&self, request: &DecisionRequest) -> Result<RemoteDecision, DecisionError> {
        let api_key = self.api_key.as_deref().ok_or(DecisionError::MissingApiKey)?;

        let schema = schemars::schema_for!(RemoteDecision);
        let schema_json = serde_json::to_string_pretty(&schema)?;
        let context = serde_json::to_string(request)?;

        let prompt = format!(
            r#"You are a pricing agent for an online storefront.
Respond ONLY with a valid JSON object conforming to the schema below.
Do NOT output markdown blocks or conversational text.

Rules:
- action must be "discount" or "no_action"
- discount must be between 0 and 50

JSON Schema:
{schema_json}

Data:
{context}
"#
        );

        let payload = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.api_base.trim_end_matches('/')
            ))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DecisionError::Timeout
                } else {
                    DecisionError::Api(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DecisionError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DecisionError::Api(e.to_string()))?;
        let text_content = Self::extract_message_content(&response_body)?;

        let json_str = Self::strip_formatting(text_content);
        let decision: RemoteDecision = serde_json::from_str(&json_str)
            .map_err(|_| DecisionError::InvalidResponse(text_content.to_string()))?;
        validate_remote_decision(&decision)
            .map_err(|msg| DecisionError::InvalidResponse(format!("{msg} in: {text_content}")))?;

        Ok(decision)
    }
}
