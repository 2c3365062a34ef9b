use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

use super::AppState;
use crate::{
    metrics,
    shell::rpc::tool_catalog,
    tools::{lookup, ArgumentBag},
};

const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let status = state.session().status().await;
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "connected": status.connected,
        "cluster_url": status.cluster_url,
        "llm_providers": status.llm_providers,
        "default_provider": status.default_provider,
    }))
}

pub async fn rpc(State(state): State<Arc<AppState>>, body: String) -> Response {
    match state.rpc.process_message(&body).await {
        Some(response) => Json(response).into_response(),
        // Notification
        None => StatusCode::ACCEPTED.into_response(),
    }
}

pub async fn list_tools() -> Json<Value> {
    Json(tool_catalog())
}

pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    if lookup(&name).is_none() {
        warn!("HTTP call for unknown tool {}", name);
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": format!("Unknown tool: {}", name) })),
        )
            .into_response();
    }

    let args: ArgumentBag = if body.is_empty() {
        ArgumentBag::new()
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return bad_request("request body must be a JSON object".to_string()),
            Err(e) => return bad_request(format!("invalid JSON body: {}", e)),
        }
    };

    let query = format!("POST /tools/{}", name);
    let result = state.session().call(&query, &name, args).await;
    Json(result).into_response()
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Json<Value> {
    let records = state
        .session()
        .history(params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .await;
    Json(json!({ "count": records.len(), "interactions": records }))
}

pub async fn metrics() -> Response {
    match metrics::gather_metrics() {
        Ok(body) => body.into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}
