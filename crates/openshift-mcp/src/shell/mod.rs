//! Host-facing front ends: the interactive REPL and the JSON-RPC tool
//! protocol (stdio and HTTP share the same handler).

pub mod repl;
pub mod rpc;
pub mod stdio;

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::history::{InteractionLog, InteractionRecord};
use crate::tools::{ArgumentBag, ToolDispatcher, ToolResult};

pub use repl::{HostShell, Reply};
pub use rpc::RpcHandler;

/// Snapshot for the `status` command and `/health`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionStatus {
    pub connected: bool,
    pub cluster_url: Option<String>,
    pub llm_providers: Vec<String>,
    pub default_provider: Option<String>,
    pub tools: usize,
    pub interactions: usize,
}

/// Dispatcher plus interaction log, shared by every front end of a process.
///
/// Invocations are serialized through the dispatcher lock, so a reconnect
/// can never interleave with a call that reads the cluster session.
#[derive(Clone)]
pub struct Session {
    dispatcher: Arc<Mutex<ToolDispatcher>>,
    history: Arc<Mutex<InteractionLog>>,
}

impl Session {
    pub fn new(dispatcher: ToolDispatcher, history: InteractionLog) -> Self {
        Self {
            dispatcher: Arc::new(Mutex::new(dispatcher)),
            history: Arc::new(Mutex::new(history)),
        }
    }

    /// Run a tool and record the interaction under `query`.
    pub async fn call(&self, query: &str, tool: &str, args: ArgumentBag) -> ToolResult {
        let start = Instant::now();
        let result = {
            let mut dispatcher = self.dispatcher.lock().await;
            dispatcher.invoke(tool, args).await
        };
        let elapsed = start.elapsed().as_secs_f64();

        let record = InteractionRecord::new(query, result.render(), tool, elapsed);
        self.history.lock().await.append(record);
        result
    }

    pub async fn history(&self, n: usize) -> Vec<InteractionRecord> {
        self.history.lock().await.last_n(n)
    }

    pub async fn status(&self) -> SessionStatus {
        let dispatcher = self.dispatcher.lock().await;
        let interactions = self.history.lock().await.len();
        SessionStatus {
            connected: dispatcher.is_connected(),
            cluster_url: dispatcher.cluster_url(),
            llm_providers: dispatcher.llm().available_providers(),
            default_provider: dispatcher.llm().default_provider().map(str::to_string),
            tools: dispatcher.tools().len(),
            interactions,
        }
    }
}
