//! Line-delimited JSON-RPC transport.

use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

use super::rpc::{error_response, JsonRpcError, RequestId};
use super::RpcHandler;

/// Serve JSON-RPC over the process's stdin/stdout until EOF.
pub async fn serve_stdio(handler: RpcHandler) -> crate::Result<()> {
    info!("Starting JSON-RPC server on stdio");
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(&handler, stdin, stdout).await
}

/// One request per line in, one response per line out. Notifications
/// produce no output; a line that is not UTF-8 gets a parse error.
pub async fn serve<R, W>(handler: &RpcHandler, mut reader: R, mut writer: W) -> crate::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                handler.process_message(line).await
            }
            Err(e) => {
                warn!("Discarding non UTF-8 request line: {}", e);
                Some(error_response(
                    Some(RequestId::Null),
                    JsonRpcError::parse_error().with_data(json!({ "message": e.to_string() })),
                ))
            }
        };
        let Some(response) = response else {
            continue;
        };

        let body = match serde_json::to_string(&response) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                continue;
            }
        };
        writer.write_all(body.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    info!("stdin closed, stopping JSON-RPC server");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::InteractionLog;
    use crate::kubernetes::MockClusterConnector;
    use crate::llm::LLMGateway;
    use crate::shell::Session;
    use crate::tools::ToolDispatcher;
    use serde_json::Value;
    use std::sync::Arc;

    fn handler() -> RpcHandler {
        let dispatcher = ToolDispatcher::new(
            Arc::new(MockClusterConnector::new()),
            Arc::new(LLMGateway::empty()),
        );
        RpcHandler::new(Session::new(dispatcher, InteractionLog::default()))
    }

    #[tokio::test]
    async fn answers_each_request_on_its_own_line() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n",
        );
        let mut output = Vec::new();

        serve(&handler(), input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["id"], 2);
        assert_eq!(lines[1]["result"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn writes_exactly_one_line_per_response() {
        let reader = tokio_test::io::Builder::new()
            .read(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n")
            .build();
        let writer = tokio_test::io::Builder::new()
            .write(b"{\"jsonrpc\":\"2.0\",\"result\":{},\"id\":1}\n")
            .build();

        serve(&handler(), BufReader::new(reader), writer).await.unwrap();
    }

    #[tokio::test]
    async fn invalid_utf8_line_does_not_end_the_session() {
        let input: &[u8] =
            b"\xff\xfe garbage\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n";
        let mut output = Vec::new();

        serve(&handler(), input, &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["error"]["code"], crate::shell::rpc::PARSE_ERROR);
        assert_eq!(lines[0]["id"], Value::Null);
        assert_eq!(lines[1]["id"], 1);
        assert_eq!(lines[1]["result"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn ask_without_provider_fails_as_tool_result() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":9,"method":"tools/call","params":{"name":"ask_llm","arguments":{"question":"hi"}}}"#,
            "\n",
        );
        let mut output = Vec::new();

        serve(&handler(), input.as_bytes(), &mut output).await.unwrap();

        let resp: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(resp["result"]["isError"], true);
        assert_eq!(resp["result"]["content"][0]["text"], "No LLM provider available");
    }
}
