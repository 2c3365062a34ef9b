//! Keyword routing of free-text queries to tools.
//!
//! Rules are tried in order and the first match wins. Anything unmatched
//! goes to `ask_llm` with the original text as the question.

use serde_json::{json, Value};

use super::ArgumentBag;
use crate::config::ClusterConfig;

/// A tool call derived from free text.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub tool: &'static str,
    pub arguments: ArgumentBag,
}

struct Query<'a> {
    original: &'a str,
    lowered: String,
}

impl Query<'_> {
    fn has(&self, word: &str) -> bool {
        self.lowered.contains(word)
    }
}

struct Rule {
    name: &'static str,
    matches: fn(&Query) -> bool,
    tool: &'static str,
    build: fn(&Query, &ClusterConfig) -> ArgumentBag,
}

// Literal namespaces recognised in pod queries, checked in this order.
const NAMESPACE_LITERALS: [&str; 2] = ["production", "development"];
const DEFAULT_NAMESPACE: &str = "default";

fn no_args(_: &Query, _: &ClusterConfig) -> ArgumentBag {
    ArgumentBag::new()
}

fn pod_args(query: &Query, _: &ClusterConfig) -> ArgumentBag {
    let namespace = NAMESPACE_LITERALS
        .iter()
        .find(|ns| query.has(ns))
        .copied()
        .unwrap_or(DEFAULT_NAMESPACE);
    let mut args = ArgumentBag::new();
    args.insert("namespace".to_string(), json!(namespace));
    args
}

fn connect_args(_: &Query, cluster: &ClusterConfig) -> ArgumentBag {
    let mut args = ArgumentBag::new();
    if let Some(url) = &cluster.url {
        args.insert("cluster_url".to_string(), json!(url));
    }
    if let Some(token) = &cluster.token {
        args.insert("token".to_string(), json!(token));
    }
    args.insert("verify_ssl".to_string(), Value::Bool(cluster.verify_ssl));
    args
}

fn question_args(query: &Query, _: &ClusterConfig) -> ArgumentBag {
    let mut args = ArgumentBag::new();
    args.insert("question".to_string(), json!(query.original));
    args
}

static RULES: &[Rule] = &[
    Rule {
        name: "namespace listing",
        // A pod listing scoped to a namespace belongs to the next rule.
        matches: |q| q.has("namespace") && q.has("list") && !q.has("pod"),
        tool: "list_namespaces",
        build: no_args,
    },
    Rule {
        name: "pod listing",
        matches: |q| q.has("pod") && q.has("list"),
        tool: "list_pods",
        build: pod_args,
    },
    Rule {
        name: "cluster connection",
        matches: |q| q.has("connect") || q.has("cluster"),
        tool: "connect_cluster",
        build: connect_args,
    },
    Rule {
        name: "assistant request",
        matches: |q| q.has("ai") || q.has("llm") || q.has("help"),
        tool: "ask_llm",
        build: question_args,
    },
];

/// Maps operator text onto a tool call. Connection parameters for
/// `connect_cluster` come from configuration, never from the text.
#[derive(Debug, Clone, Default)]
pub struct QueryClassifier {
    cluster: ClusterConfig,
}

impl QueryClassifier {
    pub fn new(cluster: ClusterConfig) -> Self {
        Self { cluster }
    }

    pub fn classify(&self, text: &str) -> Classification {
        let query = Query {
            original: text,
            lowered: text.to_lowercase(),
        };

        for rule in RULES {
            if (rule.matches)(&query) {
                tracing::debug!("Query matched {} rule", rule.name);
                return Classification {
                    tool: rule.tool,
                    arguments: (rule.build)(&query, &self.cluster),
                };
            }
        }

        Classification {
            tool: "ask_llm",
            arguments: question_args(&query, &self.cluster),
        }
    }
}
