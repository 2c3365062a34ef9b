use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// LLM vendors, listed in default-selection preference order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "claude")]
    Claude,
    #[serde(rename = "custom")]
    Custom,
}

impl ProviderKind {
    pub const PREFERENCE_ORDER: [ProviderKind; 4] = [
        ProviderKind::Gemini,
        ProviderKind::OpenAI,
        ProviderKind::Claude,
        ProviderKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Claude => "claude",
            ProviderKind::Custom => "custom",
        }
    }

    /// Environment variable prefix used for model/token/temperature overrides.
    fn env_prefix(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI",
            ProviderKind::OpenAI => "OPENAI",
            ProviderKind::Claude => "CLAUDE",
            ProviderKind::Custom => "CUSTOM_LLM",
        }
    }

    fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Claude => "ANTHROPIC_API_KEY",
            ProviderKind::Custom => "CUSTOM_LLM_API_KEY",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-1.5-flash",
            ProviderKind::OpenAI => "gpt-4",
            ProviderKind::Claude => "claude-3-sonnet-20240229",
            ProviderKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAI),
            "claude" | "anthropic" => Ok(ProviderKind::Claude),
            "custom" => Ok(ProviderKind::Custom),
            other => Err(crate::Error::Config(format!("unknown LLM provider '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl ProviderConfig {
    pub const DEFAULT_MAX_TOKENS: u32 = 2048;
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            model: kind.default_model().to_string(),
            base_url: None,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: Self::DEFAULT_TEMPERATURE,
            timeout_seconds: Self::DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub url: Option<String>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub verify_ssl: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            verify_ssl: true,
        }
    }
}

impl ClusterConfig {
    /// Both URL and token are present, so a connection can be attempted at startup.
    pub fn is_complete(&self) -> bool {
        self.url.is_some() && self.token.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cluster: ClusterConfig,
    /// Providers with credentials present, in preference order.
    pub providers: Vec<ProviderConfig>,
    pub history: HistoryConfig,
}

impl Config {
    pub fn load() -> crate::Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            server: ServerConfig {
                addr: get("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            },
            cluster: ClusterConfig {
                url: get("OPENSHIFT_CLUSTER_URL"),
                token: get("OPENSHIFT_TOKEN"),
                verify_ssl: get("OPENSHIFT_VERIFY_SSL")
                    .map(|v| v.to_lowercase() == "true")
                    .unwrap_or(true),
            },
            providers: ProviderKind::PREFERENCE_ORDER
                .iter()
                .filter_map(|kind| provider_from_lookup(*kind, &get))
                .collect(),
            history: HistoryConfig {
                capacity: parse_or(&get, "HISTORY_CAPACITY", 1000),
            },
        };

        if config.history.capacity == 0 {
            return Err(crate::Error::Config(
                "HISTORY_CAPACITY must be greater than zero".to_string(),
            ));
        }

        if let Some(url) = &config.cluster.url {
            url::Url::parse(url).map_err(|e| {
                crate::Error::Config(format!("OPENSHIFT_CLUSTER_URL is not a valid URL: {}", e))
            })?;
        }

        if config.providers.is_empty() {
            tracing::warn!("No LLM providers configured! LLM tools will report no provider available.");
        }

        Ok(config)
    }

    /// Convenience for tests: build from a map of variables.
    pub fn from_map(vars: &HashMap<String, String>) -> crate::Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }
}

fn provider_from_lookup<G>(kind: ProviderKind, get: &G) -> Option<ProviderConfig>
where
    G: Fn(&str) -> Option<String>,
{
    let api_key = get(kind.api_key_var())?;
    let prefix = kind.env_prefix();

    let base_url = get(&format!("{}_BASE_URL", prefix));
    if kind == ProviderKind::Custom && base_url.is_none() {
        tracing::warn!("CUSTOM_LLM_API_KEY is set but CUSTOM_LLM_BASE_URL is not; custom provider disabled");
        return None;
    }

    Some(ProviderConfig {
        kind,
        api_key,
        model: get(&format!("{}_MODEL", prefix))
            .unwrap_or_else(|| kind.default_model().to_string()),
        base_url,
        max_tokens: parse_or(get, &format!("{}_MAX_TOKENS", prefix), ProviderConfig::DEFAULT_MAX_TOKENS),
        temperature: parse_or(get, &format!("{}_TEMPERATURE", prefix), ProviderConfig::DEFAULT_TEMPERATURE),
        timeout_seconds: parse_or(
            get,
            &format!("{}_TIMEOUT_SECONDS", prefix),
            ProviderConfig::DEFAULT_TIMEOUT_SECONDS,
        ),
    })
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> T
where
    G: Fn(&str) -> Option<String>,
    T: FromStr + Copy + fmt::Display,
{
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                addr: "0.0.0.0:8080".to_string(),
            },
            cluster: ClusterConfig {
                url: None,
                token: None,
                verify_ssl: true,
            },
            providers: Vec::new(),
            history: HistoryConfig { capacity: 1000 },
        }
    }
}
