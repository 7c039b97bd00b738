use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::TicketClassifier;
use crate::config::AnthropicConfig;
use crate::models::{vocabulary_csv, Classification, TicketCategory, TicketPriority};
use crate::utils::{ApiError, ApiResult};

const PROMPT: &str = include_str!("classify_prompt.md");
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Classification client backed by the Anthropic Messages API.
pub struct AnthropicClassifier {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicClassifier {
    pub fn new(config: &AnthropicConfig) -> Self {
        // A hanging upstream call would otherwise block the job forever.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    fn build_prompt(subject: &str, body: &str) -> String {
        let categories: Vec<&str> = TicketCategory::ALL.iter().map(|c| c.as_str()).collect();
        let priorities: Vec<&str> = TicketPriority::ALL.iter().map(|p| p.as_str()).collect();

        PROMPT
            .replace("{categories}", &vocabulary_csv(&categories, ", "))
            .replace("{priorities}", &vocabulary_csv(&priorities, ", "))
            .replace("{ticket_subject}", subject)
            .replace("{ticket_body}", body)
    }

    /// Parse the model reply into a [`Classification`].
    ///
    /// The prompt demands bare JSON, but models like to wrap it in code
    /// fences or prose, so parse the outermost braced region.
    fn parse_reply(text: &str) -> ApiResult<Classification> {
        let start = text.find('{');
        let end = text.rfind('}');
        let json = match (start, end) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => {
                return Err(ApiError::classification(format!(
                    "no JSON object in model reply: {}",
                    text
                )))
            },
        };

        let classification: Classification = serde_json::from_str(json).map_err(|e| {
            ApiError::classification(format!("malformed classification JSON: {}", e))
        })?;

        if !classification.confidences_in_range() {
            return Err(ApiError::classification(format!(
                "confidence out of range: category={}, priority={}",
                classification.category_confidence, classification.priority_confidence
            )));
        }

        Ok(classification)
    }
}

#[async_trait]
impl TicketClassifier for AnthropicClassifier {
    async fn classify(&self, subject: &str, body: &str) -> ApiResult<Classification> {
        let prompt = Self::build_prompt(subject, body);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&serde_json::json!({
                "model": self.model,
                "max_tokens": MAX_TOKENS,
                "messages": [{"role": "user", "content": prompt}]
            }))
            .send()
            .await
            .map_err(|e| ApiError::classification(format!("transport failure: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::classification(format!(
                "provider returned {}: {}",
                status, detail
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ApiError::classification(format!("invalid provider payload: {}", e)))?;

        let text = payload["content"][0]["text"].as_str().ok_or_else(|| {
            ApiError::classification("provider payload missing content text".to_string())
        })?;

        Self::parse_reply(text)
    }
}
