//! JSON-RPC 2.0 types and the tool-protocol handler

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use super::Session;
use crate::tools::{ArgumentBag, TOOLS};

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

// Error codes (from JSON-RPC 2.0 spec)
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 Request ID (can be string, number, or null)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
    Null,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// `None` only when the key is absent; `"id": null` is `Some(RequestId::Null)`.
    #[serde(
        default,
        deserialize_with = "present_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RequestId>,
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<RequestId>, D::Error>
where
    D: Deserializer<'de>,
{
    RequestId::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<RequestId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error() -> Self {
        Self::new(PARSE_ERROR, "Parse error")
    }

    pub fn invalid_request() -> Self {
        Self::new(INVALID_REQUEST, "Invalid Request")
    }

    pub fn method_not_found() -> Self {
        Self::new(METHOD_NOT_FOUND, "Method not found")
    }

    pub fn invalid_params() -> Self {
        Self::new(INVALID_PARAMS, "Invalid params")
    }

    pub fn internal_error() -> Self {
        Self::new(INTERNAL_ERROR, "Internal error")
    }
}

pub fn success_response(id: Option<RequestId>, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: JSONRPC_VERSION.to_string(),
        result: Some(result),
        error: None,
        id,
    }
}

pub fn error_response(id: Option<RequestId>, error: JsonRpcError) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: JSONRPC_VERSION.to_string(),
        result: None,
        error: Some(error),
        id,
    }
}

/// `{"tools": [{name, description, inputSchema}]}` for every registered tool.
pub fn tool_catalog() -> Value {
    let tools: Vec<Value> = TOOLS
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema(),
            })
        })
        .collect();
    json!({ "tools": tools })
}

#[derive(Debug, Deserialize)]
struct ToolsCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Answers `initialize`, `ping`, `tools/list` and `tools/call`.
#[derive(Clone)]
pub struct RpcHandler {
    session: Session,
}

impl RpcHandler {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handle one raw message. `None` means it was a notification.
    pub async fn process_message(&self, body: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(body) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(error_response(
                    Some(RequestId::Null),
                    JsonRpcError::parse_error().with_data(json!({ "message": e.to_string() })),
                ));
            }
        };

        if raw.is_array() {
            return Some(error_response(
                Some(RequestId::Null),
                JsonRpcError::invalid_request()
                    .with_data(json!({ "message": "Batch requests are not supported" })),
            ));
        }

        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                return Some(error_response(
                    Some(RequestId::Null),
                    JsonRpcError::invalid_request().with_data(json!({ "message": e.to_string() })),
                ))
            }
        };

        self.handle(request).await
    }

    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("Processing method: {}", request.method);

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(error_response(
                request.id,
                JsonRpcError::invalid_request()
                    .with_data(json!({ "message": "Invalid JSON-RPC version" })),
            ));
        }

        // Notifications get no response
        let Some(id) = request.id.clone() else {
            debug!("Received notification {}, ignoring", request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => success_response(Some(id), self.initialize()),
            "ping" => success_response(Some(id), json!({})),
            "tools/list" => success_response(Some(id), self.tools_list()),
            "tools/call" => match self.tools_call(request.params).await {
                Ok(result) => success_response(Some(id), result),
                Err(e) => error_response(Some(id), e),
            },
            other => error_response(
                Some(id),
                JsonRpcError::method_not_found().with_data(json!({ "method": other })),
            ),
        };

        Some(response)
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": {
                "name": "openshift-mcp",
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    fn tools_list(&self) -> Value {
        tool_catalog()
    }

    async fn tools_call(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params = params.ok_or_else(|| {
            JsonRpcError::invalid_params()
                .with_data(json!({ "message": "Missing params for tools/call" }))
        })?;
        let call: ToolsCallParams = serde_json::from_value(params).map_err(|e| {
            JsonRpcError::invalid_params().with_data(json!({ "message": e.to_string() }))
        })?;

        let arguments: ArgumentBag = match call.arguments {
            None | Some(Value::Null) => ArgumentBag::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                warn!("tools/call {} with non-object arguments", call.name);
                return Err(JsonRpcError::invalid_params()
                    .with_data(json!({ "message": "arguments must be an object" })));
            }
        };

        let query = format!("tools/call {}", call.name);
        let result = self.session.call(&query, &call.name, arguments).await;

        let structured = serde_json::to_value(&result).map_err(|e| {
            JsonRpcError::internal_error().with_data(json!({ "message": e.to_string() }))
        })?;

        Ok(json!({
            "content": [{ "type": "text", "text": result.render() }],
            "isError": !result.success,
            "structuredContent": structured,
        }))
    }
}
