//! LLM Provider Abstraction
//!
//! One `LLMProvider` per configured vendor. Gemini, OpenAI and Claude are
//! driven through Rig; the custom backend is a plain HTTP endpoint.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

// Import from rig
use rig::completion::Prompt;
use rig::providers::{anthropic, gemini, openai};

use super::custom::CustomClient;
use crate::config::{ProviderConfig, ProviderKind};

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const PREAMBLE: &str = "You are an expert OpenShift and Kubernetes administrator. \
    Answer concisely and give concrete commands where they help.";
const PING_PROMPT: &str = "Hello";
const PING_MAX_TOKENS: u64 = 10;

/// Raw output of a single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub tokens_used: Option<u64>,
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tokens_used: None,
        }
    }
}

/// Trait for LLM providers that can handle prompts
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Provider id used for selection, e.g. `gemini`.
    fn id(&self) -> &str;

    fn model(&self) -> &str;

    /// Upper bound for one outbound call.
    fn timeout(&self) -> Duration;

    /// Send an already composed prompt to the vendor.
    async fn complete(&self, prompt: &str) -> Result<Completion>;

    /// Minimal low-token request; `true` when the vendor answered.
    async fn test_connection(&self) -> bool;
}

enum Backend {
    Gemini(gemini::Client),
    OpenAI(openai::Client),
    Claude(anthropic::Client),
    Custom(CustomClient),
}

/// A configured vendor backend.
pub struct VendorProvider {
    config: ProviderConfig,
    backend: Backend,
}

impl VendorProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(anyhow!("{} provider requires an API key", config.kind));
        }

        let backend = match config.kind {
            ProviderKind::Gemini => Backend::Gemini(gemini::Client::new(&config.api_key)),
            ProviderKind::OpenAI => Backend::OpenAI(match &config.base_url {
                Some(base_url) => openai::Client::from_url(&config.api_key, base_url),
                None => openai::Client::new(&config.api_key),
            }),
            ProviderKind::Claude => Backend::Claude(anthropic::Client::new(
                &config.api_key,
                config.base_url.as_deref().unwrap_or(ANTHROPIC_BASE_URL),
                None,
                anthropic::ANTHROPIC_VERSION_LATEST,
            )),
            ProviderKind::Custom => {
                let base_url = config
                    .base_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("Custom LLM requires base_url configuration"))?;
                Backend::Custom(CustomClient::new(
                    base_url,
                    &config.api_key,
                    Duration::from_secs(config.timeout_seconds),
                )?)
            }
        };

        Ok(Self { config, backend })
    }

    pub fn kind(&self) -> ProviderKind {
        self.config.kind
    }

    async fn prompt_with(&self, prompt: &str, max_tokens: u64) -> Result<String> {
        let model = self.config.model.as_str();
        let temperature = f64::from(self.config.temperature);

        match &self.backend {
            Backend::Gemini(client) => {
                let agent = client
                    .agent(model)
                    .preamble(PREAMBLE)
                    .temperature(temperature)
                    .max_tokens(max_tokens)
                    .build();
                agent
                    .prompt(prompt)
                    .await
                    .map_err(|e| anyhow!("Gemini API error: {}", e))
            }
            Backend::OpenAI(client) => {
                let agent = client
                    .agent(model)
                    .preamble(PREAMBLE)
                    .temperature(temperature)
                    .max_tokens(max_tokens)
                    .build();
                agent
                    .prompt(prompt)
                    .await
                    .map_err(|e| anyhow!("OpenAI API error: {}", e))
            }
            Backend::Claude(client) => {
                let agent = client
                    .agent(model)
                    .preamble(PREAMBLE)
                    .temperature(temperature)
                    .max_tokens(max_tokens)
                    .build();
                agent
                    .prompt(prompt)
                    .await
                    .map_err(|e| anyhow!("Anthropic API error: {}", e))
            }
            Backend::Custom(client) => {
                let completion = client
                    .generate(prompt, model, max_tokens, self.config.temperature)
                    .await?;
                Ok(completion.content)
            }
        }
    }
}

#[async_trait]
impl LLMProvider for VendorProvider {
    fn id(&self) -> &str {
        self.config.kind.as_str()
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    async fn complete(&self, prompt: &str) -> Result<Completion> {
        debug!("Sending {} chars to {} ({})", prompt.len(), self.id(), self.config.model);

        if let Backend::Custom(client) = &self.backend {
            return client
                .generate(
                    prompt,
                    &self.config.model,
                    u64::from(self.config.max_tokens),
                    self.config.temperature,
                )
                .await;
        }

        let content = self
            .prompt_with(prompt, u64::from(self.config.max_tokens))
            .await?;
        Ok(Completion::text(content))
    }

    async fn test_connection(&self) -> bool {
        let outcome = match &self.backend {
            Backend::Custom(client) => client.health().await,
            _ => self.prompt_with(PING_PROMPT, PING_MAX_TOKENS).await.map(|_| true),
        };

        match outcome {
            Ok(reachable) => reachable,
            Err(e) => {
                warn!("{} connection test failed: {}", self.id(), e);
                false
            }
        }
    }
}

/// Create a provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn LLMProvider>> {
    let provider = VendorProvider::new(config.clone())?;
    Ok(Arc::new(provider))
}
