use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::provider::{Completion, LLMProvider};

/// Mock provider for testing
///
/// Answers with a canned reply (or error) and remembers every prompt it saw.
pub struct MockProvider {
    id: String,
    model: String,
    reply: std::result::Result<String, String>,
    delay: Option<Duration>,
    timeout: Duration,
    reachable: bool,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            model: format!("{}-mock", id),
            reply: Ok(format!("mock answer from {}", id)),
            delay: None,
            timeout: Duration::from_secs(30),
            reachable: true,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = Ok(reply.to_string());
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.reply = Err(message.to_string());
        self
    }

    /// Sleep before answering; combine with a short timeout to exercise expiry.
    pub fn with_delay(mut self, delay: Duration, timeout: Duration) -> Self {
        self.delay = Some(delay);
        self.timeout = timeout;
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LLMProvider for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn complete(&self, prompt: &str) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            Ok(text) => Ok(Completion {
                content: text.clone(),
                tokens_used: Some(text.split_whitespace().count() as u64),
            }),
            Err(message) => Err(anyhow!("{}", message)),
        }
    }

    async fn test_connection(&self) -> bool {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reachable
    }
}
