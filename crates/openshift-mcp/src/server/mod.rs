mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::shell::{RpcHandler, Session};

/// Shared by every request. Tool invocations serialize on the session's
/// dispatcher lock.
pub struct AppState {
    pub rpc: RpcHandler,
}

impl AppState {
    pub fn session(&self) -> &Session {
        self.rpc.session()
    }
}

pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(session: Session) -> Self {
        Self {
            state: Arc::new(AppState {
                rpc: RpcHandler::new(session),
            }),
        }
    }

    pub fn build_router(self) -> Router {
        Router::new()
            .route("/health", get(routes::health))
            .route("/rpc", post(routes::rpc))
            .route("/tools", get(routes::list_tools))
            .route("/tools/{name}", post(routes::call_tool))
            .route("/history", get(routes::history))
            .route("/metrics", get(routes::metrics))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state)
    }

    pub async fn start(self, addr: &str) -> crate::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("HTTP server listening on {}", addr);

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| crate::Error::Internal(format!("HTTP server error: {}", e)))
    }
}
