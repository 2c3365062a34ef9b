//! Tools Module
//!
//! Named cluster and LLM operations, the registry that describes them, the
//! dispatcher that runs them and the keyword classifier that maps free text
//! onto them.

pub mod classifier;
pub mod dispatcher;
pub mod registry;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use classifier::{Classification, QueryClassifier};
pub use dispatcher::ToolDispatcher;
pub use registry::{lookup, ArgKind, ArgSpec, ToolFamily, ToolSpec, TOOLS};

/// Caller-supplied arguments, keyed by name.
pub type ArgumentBag = Map<String, Value>;

/// Uniform envelope returned by every tool invocation.
///
/// `success == false` always carries a non-empty `error` and no `data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,
    pub data: Option<Map<String, Value>>,
    pub error: Option<String>,
    pub elapsed_seconds: Option<f64>,
}

impl ToolResult {
    pub fn success(data: Map<String, Value>, elapsed_seconds: Option<f64>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            elapsed_seconds,
        }
    }

    pub fn failure(error: impl Into<String>, elapsed_seconds: Option<f64>) -> Self {
        let mut error = error.into();
        if error.is_empty() {
            error = "Unknown error".to_string();
        }
        Self {
            success: false,
            data: None,
            error: Some(error),
            elapsed_seconds,
        }
    }

    /// Human-readable body: pretty JSON data on success, the message otherwise.
    pub fn render(&self) -> String {
        match (&self.data, &self.error) {
            (Some(data), _) if self.success => serde_json::to_string_pretty(data)
                .unwrap_or_else(|_| Value::Object(data.clone()).to_string()),
            (_, Some(error)) => error.clone(),
            _ => String::new(),
        }
    }
}

/// Why a tool invocation failed. Converted into a failed [`ToolResult`]
/// at the dispatcher boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ToolError {
    #[error("{0} is required")]
    MissingArgument(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Not connected to cluster")]
    NotConnected,
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("No LLM provider available")]
    NoProvider,
    #[error("Provider '{0}' not found")]
    ProviderNotFound(String),
    #[error("Failed to gather cluster information: {0}")]
    Gather(String),
    #[error("{0}")]
    Gateway(String),
}

impl From<crate::Error> for ToolError {
    fn from(err: crate::Error) -> Self {
        ToolError::Gateway(err.to_string())
    }
}
