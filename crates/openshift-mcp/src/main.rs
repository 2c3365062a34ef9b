use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use openshift_mcp::{
    config::Config,
    history::InteractionLog,
    kubernetes::KubeConnector,
    llm::LLMGateway,
    metrics,
    server::Server,
    shell::{stdio, HostShell, RpcHandler, Session},
    tools::{ArgumentBag, QueryClassifier, ToolDispatcher},
    Error, Result,
};

#[derive(Parser)]
#[command(name = "openshift-mcp")]
#[command(about = "OpenShift cluster tools and LLM assistance over a JSON-RPC tool protocol")]
struct Cli {
    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive shell (default)
    Repl,
    /// Line-delimited JSON-RPC on stdin/stdout
    Stdio,
    /// HTTP server with JSON-RPC and REST endpoints
    Serve {
        /// Listen address, overrides SERVER_ADDR
        #[arg(short, long)]
        addr: Option<String>,
    },
    /// Invoke one tool and print the result as JSON
    Call {
        /// Tool name
        tool: String,
        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries protocol traffic in stdio mode, so logs go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("openshift_mcp={},info", cli.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    info!(
        "Loaded configuration: {} LLM provider(s), cluster configured: {}",
        config.providers.len(),
        config.cluster.is_complete()
    );

    metrics::register_metrics();
    let session = build_session(&config).await;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            let shell = HostShell::new(session, QueryClassifier::new(config.cluster.clone()));
            shell
                .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
                .await
        }
        Commands::Stdio => stdio::serve_stdio(RpcHandler::new(session)).await,
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.server.addr.clone());
            Server::new(session).start(&addr).await
        }
        Commands::Call { tool, args } => {
            let args = match serde_json::from_str::<Value>(&args)? {
                Value::Object(map) => map,
                _ => return Err(Error::Validation("--args must be a JSON object".to_string())),
            };
            let result = session.call(&format!("call {}", tool), &tool, args).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

async fn build_session(config: &Config) -> Session {
    let llm = Arc::new(LLMGateway::from_configs(&config.providers));
    if llm.available_providers().is_empty() {
        warn!("No LLM providers configured; LLM tools will report errors");
    }

    let dispatcher = ToolDispatcher::new(Arc::new(KubeConnector), llm)
        .with_default_verify_ssl(config.cluster.verify_ssl);
    let session = Session::new(dispatcher, InteractionLog::new(config.history.capacity));

    if let (Some(url), Some(token)) = (&config.cluster.url, &config.cluster.token) {
        let mut args = ArgumentBag::new();
        args.insert("cluster_url".to_string(), json!(url));
        args.insert("token".to_string(), json!(token));
        args.insert("verify_ssl".to_string(), json!(config.cluster.verify_ssl));

        let result = session.call("startup connect", "connect_cluster", args).await;
        match result.error {
            None => info!("Connected to OpenShift cluster at {}", url),
            Some(e) => warn!("Startup connection to {} failed: {}", url, e),
        }
    }

    session
}
