use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::provider::{create_provider, LLMProvider};
use crate::config::ProviderConfig;

pub const NO_PROVIDER: &str = "No LLM provider available";

/// Normalized answer from any provider. A non-empty `error` means `content` is empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LLMResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens_used: Option<u64>,
    pub elapsed_seconds: Option<f64>,
    pub error: Option<String>,
}

impl LLMResponse {
    fn failure(provider: &str, model: &str, error: String, elapsed_seconds: Option<f64>) -> Self {
        Self {
            content: String::new(),
            provider: provider.to_string(),
            model: model.to_string(),
            tokens_used: None,
            elapsed_seconds,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.as_deref().map(|e| !e.is_empty()).unwrap_or(false)
    }
}

/// Routes generation requests to one of the configured providers.
///
/// The first provider handed in is the default. Provider configuration is
/// fixed for the lifetime of the gateway.
pub struct LLMGateway {
    providers: Vec<Arc<dyn LLMProvider>>,
}

impl LLMGateway {
    pub fn new(providers: Vec<Arc<dyn LLMProvider>>) -> Self {
        if let Some(first) = providers.first() {
            info!(
                "LLM gateway ready with {} provider(s), default {}",
                providers.len(),
                first.id()
            );
        } else {
            warn!("No LLM providers configured!");
        }
        Self { providers }
    }

    pub fn empty() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Instantiate every configured provider, skipping ones that fail to build.
    pub fn from_configs(configs: &[ProviderConfig]) -> Self {
        let providers = configs
            .iter()
            .filter_map(|config| match create_provider(config) {
                Ok(provider) => {
                    info!("{} provider configured (model {})", config.kind, config.model);
                    Some(provider)
                }
                Err(e) => {
                    warn!("Skipping {} provider: {}", config.kind, e);
                    None
                }
            })
            .collect();
        Self::new(providers)
    }

    pub fn available_providers(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.id().to_string()).collect()
    }

    pub fn default_provider(&self) -> Option<&str> {
        self.providers.first().map(|p| p.id())
    }

    pub fn provider(&self, id: &str) -> Option<&Arc<dyn LLMProvider>> {
        self.providers.iter().find(|p| p.id() == id)
    }

    /// Requested provider if configured, otherwise the default.
    fn select(&self, requested: Option<&str>) -> Option<&Arc<dyn LLMProvider>> {
        if let Some(id) = requested.filter(|id| !id.is_empty()) {
            match self.provider(id) {
                Some(provider) => return Some(provider),
                None => warn!("Provider '{}' not configured, using default", id),
            }
        }
        self.providers.first()
    }

    pub async fn generate(
        &self,
        prompt: &str,
        context: Option<&str>,
        provider: Option<&str>,
    ) -> LLMResponse {
        let Some(selected) = self.select(provider) else {
            return LLMResponse::failure("none", "none", NO_PROVIDER.to_string(), None);
        };

        let full_prompt = match context.filter(|c| !c.is_empty()) {
            Some(context) => format!("{}\n\n{}", context, prompt),
            None => prompt.to_string(),
        };

        let limit = selected.timeout();
        let start = Instant::now();
        let outcome = tokio::time::timeout(limit, selected.complete(&full_prompt)).await;
        let elapsed = start.elapsed().as_secs_f64();

        match outcome {
            Ok(Ok(completion)) => LLMResponse {
                content: completion.content,
                provider: selected.id().to_string(),
                model: selected.model().to_string(),
                tokens_used: completion.tokens_used,
                elapsed_seconds: Some(elapsed),
                error: None,
            },
            Ok(Err(e)) => {
                warn!("{} generation failed: {}", selected.id(), e);
                LLMResponse::failure(selected.id(), selected.model(), e.to_string(), Some(elapsed))
            }
            Err(_) => {
                let message = format!(
                    "Request to {} timed out after {}s",
                    selected.id(),
                    limit.as_secs_f64()
                );
                warn!("{}", message);
                LLMResponse::failure(selected.id(), selected.model(), message, Some(elapsed))
            }
        }
    }

    /// Check one provider; `None` when it is not configured.
    pub async fn test_connection(&self, id: &str) -> Option<bool> {
        match self.provider(id) {
            Some(provider) => Some(reachable(provider.as_ref()).await),
            None => None,
        }
    }

    pub async fn test_connections(&self) -> BTreeMap<String, bool> {
        let checks = self.providers.iter().map(|p| async move {
            let ok = reachable(p.as_ref()).await;
            (p.id().to_string(), ok)
        });
        join_all(checks).await.into_iter().collect()
    }
}

/// A connection test that outlives the provider's timeout counts as unreachable.
async fn reachable(provider: &dyn LLMProvider) -> bool {
    let limit = provider.timeout();
    match tokio::time::timeout(limit, provider.test_connection()).await {
        Ok(reachable) => reachable,
        Err(_) => {
            warn!(
                "Connection test for {} timed out after {}s",
                provider.id(),
                limit.as_secs_f64()
            );
            false
        }
    }
}
