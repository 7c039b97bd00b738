use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::ResponseDrafter;
use crate::config::OpenAiConfig;
use crate::utils::{ApiError, ApiResult};

const PROMPT: &str = include_str!("draft_prompt.md");

/// Response-drafting client backed by the OpenAI Chat Completions API.
pub struct OpenAiDrafter {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiDrafter {
    pub fn new(config: &OpenAiConfig) -> Self {
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
        PROMPT
            .replace("{ticket_subject}", subject)
            .replace("{ticket_body}", body)
    }
}

#[async_trait]
impl ResponseDrafter for OpenAiDrafter {
    async fn draft(&self, subject: &str, body: &str) -> ApiResult<String> {
        let prompt = Self::build_prompt(subject, body);

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}]
            }))
            .send()
            .await
            .map_err(|e| ApiError::drafting(format!("transport failure: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::drafting(format!("provider returned {}: {}", status, detail)));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ApiError::drafting(format!("invalid provider payload: {}", e)))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                ApiError::drafting("provider payload missing reply content".to_string())
            })?;

        Ok(content.to_string())
    }
}
