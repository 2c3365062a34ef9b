//! Interactive operator shell.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::Session;
use crate::tools::{ArgumentBag, QueryClassifier, ToolResult, TOOLS};

const PROMPT: &str = "openshift> ";
const HISTORY_SHOWN: usize = 5;

const HELP: &str = "\
Commands:
  help                 show this message
  history              show the last 5 interactions
  status               show cluster and LLM provider status
  tools                list available tools
  tool <name> [json]   call a tool with JSON arguments
  quit | exit | q      leave the shell

Anything else is treated as a question, e.g.
  list all namespaces
  list pods in production namespace
  connect to cluster
  help me debug a crashloop";

/// What the shell wants done after a line.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Output(String),
    Quit,
    Nothing,
}

pub struct HostShell {
    session: Session,
    classifier: QueryClassifier,
}

impl HostShell {
    pub fn new(session: Session, classifier: QueryClassifier) -> Self {
        Self {
            session,
            classifier,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn handle_line(&self, line: &str) -> Reply {
        let line = line.trim();
        if line.is_empty() {
            return Reply::Nothing;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "quit" | "exit" | "q" if rest.is_empty() => Reply::Quit,
            "help" if rest.is_empty() => Reply::Output(HELP.to_string()),
            "history" if rest.is_empty() => Reply::Output(self.history().await),
            "status" if rest.is_empty() => Reply::Output(self.status().await),
            "tools" if rest.is_empty() => Reply::Output(tool_listing()),
            "tool" => Reply::Output(self.structured_call(line, rest).await),
            _ => {
                let classification = self.classifier.classify(line);
                debug!("Routing query to {}", classification.tool);
                let result = self
                    .session
                    .call(line, classification.tool, classification.arguments)
                    .await;
                Reply::Output(render(classification.tool, &result))
            }
        }
    }

    /// Read lines until EOF or a quit command.
    pub async fn run<R, W>(&self, mut reader: R, mut writer: W) -> crate::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        writer
            .write_all(b"OpenShift MCP shell. Type 'help' for commands.\n")
            .await?;
        let mut buf = Vec::new();

        loop {
            writer.write_all(PROMPT.as_bytes()).await?;
            writer.flush().await?;

            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let reply = match std::str::from_utf8(&buf) {
                Ok(line) => self.handle_line(line).await,
                Err(e) => {
                    warn!("Discarding non UTF-8 input line: {}", e);
                    Reply::Output(format!("❌ Error: input is not valid UTF-8: {}", e))
                }
            };

            match reply {
                Reply::Output(text) => {
                    writer.write_all(text.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                }
                Reply::Quit => break,
                Reply::Nothing => {}
            }
        }

        writer.write_all(b"Goodbye!\n").await?;
        writer.flush().await?;
        Ok(())
    }

    async fn structured_call(&self, line: &str, rest: &str) -> String {
        let (name, raw_args) = match rest.split_once(char::is_whitespace) {
            Some((name, raw)) => (name, raw.trim()),
            None => (rest, ""),
        };
        if name.is_empty() {
            return "❌ Error: usage: tool <name> [json-args]".to_string();
        }

        let args = if raw_args.is_empty() {
            ArgumentBag::new()
        } else {
            match serde_json::from_str::<Value>(raw_args) {
                Ok(Value::Object(map)) => map,
                Ok(_) => return "❌ Error: arguments must be a JSON object".to_string(),
                Err(e) => return format!("❌ Error: invalid JSON arguments: {}", e),
            }
        };

        let result = self.session.call(line, name, args).await;
        render(name, &result)
    }

    async fn history(&self) -> String {
        let records = self.session.history(HISTORY_SHOWN).await;
        if records.is_empty() {
            return "No interactions yet.".to_string();
        }

        records
            .iter()
            .map(|r| {
                format!(
                    "[{}] {} -> {} ({:.2}s)",
                    r.timestamp_utc.format("%H:%M:%S"),
                    r.user_query,
                    r.tool_used,
                    r.elapsed_seconds
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn status(&self) -> String {
        let status = self.session.status().await;
        let cluster = match &status.cluster_url {
            Some(url) if status.connected => format!("connected to {}", url),
            _ => "not connected".to_string(),
        };
        let providers = if status.llm_providers.is_empty() {
            "none".to_string()
        } else {
            status.llm_providers.join(", ")
        };

        format!(
            "Cluster: {}\nLLM providers: {}\nDefault provider: {}\nTools: {}\nInteractions: {}",
            cluster,
            providers,
            status.default_provider.as_deref().unwrap_or("none"),
            status.tools,
            status.interactions
        )
    }
}

fn tool_listing() -> String {
    TOOLS
        .iter()
        .map(|t| format!("  {:<30} {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render(tool: &str, result: &ToolResult) -> String {
    if result.success {
        format!("✅ {}\n{}", tool, result.render())
    } else {
        format!("❌ Error: {}", result.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClusterConfig;
    use crate::history::InteractionLog;
    use crate::kubernetes::{ClusterGateway, MockClusterConnector, MockClusterGateway};
    use crate::kubernetes::resources::NamespaceInfo;
    use crate::llm::{LLMGateway, LLMProvider, MockProvider};
    use crate::tools::ToolDispatcher;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn shell(connector: MockClusterConnector, providers: Vec<Arc<dyn LLMProvider>>) -> HostShell {
        let dispatcher = ToolDispatcher::new(Arc::new(connector), Arc::new(LLMGateway::new(providers)));
        let classifier = QueryClassifier::new(ClusterConfig {
            url: Some("https://api.test:6443".into()),
            token: Some("t".into()),
            verify_ssl: true,
        });
        HostShell::new(Session::new(dispatcher, InteractionLog::default()), classifier)
    }

    fn output(reply: Reply) -> String {
        match reply {
            Reply::Output(text) => text,
            other => panic!("expected output, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn quit_variants() {
        let s = shell(MockClusterConnector::new(), vec![]);
        for cmd in ["quit", "exit", "q", "  QUIT  "] {
            assert_eq!(s.handle_line(cmd).await, Reply::Quit);
        }
        assert_eq!(s.handle_line("   ").await, Reply::Nothing);
    }

    #[tokio::test]
    async fn free_text_is_classified_and_recorded() {
        let mut gateway = MockClusterGateway::new();
        gateway.expect_server_url().return_const("https://api.test:6443".to_string());
        gateway.expect_list_namespaces().times(1).returning(|| {
            Ok(vec![NamespaceInfo {
                name: "shop".into(),
                display_name: "shop".into(),
                description: String::new(),
                status: "Active".into(),
                created: None,
                labels: BTreeMap::new(),
            }])
        });
        let gateway: Arc<dyn ClusterGateway> = Arc::new(gateway);
        let mut connector = MockClusterConnector::new();
        connector
            .expect_connect()
            .times(1)
            .returning(move |_| Ok(gateway.clone()));

        let s = shell(connector, vec![]);

        let connected = output(s.handle_line("connect to cluster").await);
        assert!(connected.starts_with("✅ connect_cluster"), "{}", connected);

        let listed = output(s.handle_line("list all namespaces").await);
        assert!(listed.starts_with("✅ list_namespaces"));
        assert!(listed.contains("shop"));

        let history = output(s.handle_line("history").await);
        assert!(history.contains("connect to cluster -> connect_cluster"));
        assert!(history.contains("list all namespaces -> list_namespaces"));
    }

    #[tokio::test]
    async fn failures_render_as_errors() {
        let s = shell(MockClusterConnector::new(), vec![]);
        let text = output(s.handle_line("list pods in production namespace").await);
        assert_eq!(text, "❌ Error: Not connected to cluster");
    }

    #[tokio::test]
    async fn structured_tool_call() {
        let provider = Arc::new(MockProvider::new("gemini").with_reply("all good"));
        let s = shell(
            MockClusterConnector::new(),
            vec![provider.clone() as Arc<dyn LLMProvider>],
        );

        let text = output(s.handle_line(r#"tool ask_llm {"question": "is it fine?"}"#).await);

        assert!(text.starts_with("✅ ask_llm"));
        assert!(text.contains("all good"));
        assert_eq!(provider.prompts(), vec!["is it fine?".to_string()]);
    }

    #[tokio::test]
    async fn structured_call_with_bad_json() {
        let s = shell(MockClusterConnector::new(), vec![]);
        let text = output(s.handle_line("tool list_pods {oops").await);
        assert!(text.starts_with("❌ Error: invalid JSON arguments"));
        assert!(s.session().history(5).await.is_empty());
    }

    #[tokio::test]
    async fn history_shows_last_five() {
        let s = shell(MockClusterConnector::new(), vec![]);
        for i in 0..7 {
            s.handle_line(&format!("tool list_pods {{\"namespace\": \"ns{}\"}}", i))
                .await;
        }

        let text = output(s.handle_line("history").await);
        assert_eq!(text.lines().count(), 5);
        assert!(!text.contains("ns1\""));
        assert!(text.contains("ns6"));
    }

    #[tokio::test]
    async fn status_reports_providers() {
        let s = shell(
            MockClusterConnector::new(),
            vec![
                Arc::new(MockProvider::new("gemini")) as Arc<dyn LLMProvider>,
                Arc::new(MockProvider::new("openai")),
            ],
        );
        let text = output(s.handle_line("status").await);
        assert!(text.contains("Cluster: not connected"));
        assert!(text.contains("LLM providers: gemini, openai"));
        assert!(text.contains("Default provider: gemini"));
    }

    #[tokio::test]
    async fn run_loop_survives_invalid_utf8() {
        let s = shell(MockClusterConnector::new(), vec![]);
        let input: &[u8] = b"\xff\xfe garbage\nstatus\n";
        let mut out = Vec::new();

        s.run(input, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("❌ Error: input is not valid UTF-8"));
        assert!(text.contains("Cluster: not connected"));
        assert!(text.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn run_loop_stops_on_quit() {
        let s = shell(MockClusterConnector::new(), vec![]);
        let input = "help\nquit\nlist pods\n";
        let mut out = Vec::new();

        s.run(input.as_bytes(), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Commands:"));
        assert!(text.ends_with("Goodbye!\n"));
        assert!(s.session().history(5).await.is_empty());
    }
}
