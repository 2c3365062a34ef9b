use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::Completion;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    max_tokens: u64,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tokens_used: Option<u64>,
}

/// Client for a self-hosted generation endpoint.
///
/// `POST {base}/generate` takes `{prompt, model, max_tokens, temperature}`
/// and answers with `response` (or `content`). `GET {base}/health` returns
/// 200 when the service is up. Both use bearer auth.
#[derive(Debug, Clone)]
pub struct CustomClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CustomClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for custom LLM")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub async fn generate(
        &self,
        prompt: &str,
        model: &str,
        max_tokens: u64,
        temperature: f32,
    ) -> Result<Completion> {
        let body = GenerateRequest {
            prompt,
            model,
            max_tokens,
            temperature,
        };

        let response = self
            .http
            .post(format!("{}/generate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Custom LLM API error: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Custom LLM API error: {} {}", status, text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Custom LLM returned an unreadable body")?;

        Ok(Completion {
            content: parsed.response.or(parsed.content).unwrap_or_default(),
            tokens_used: parsed.tokens_used,
        })
    }

    pub async fn health(&self) -> Result<bool> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;
        Ok(response.status() == reqwest::StatusCode::OK)
    }
}
