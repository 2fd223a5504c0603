use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use tower_http::compression::CompressionLayer;

use crate::error::{NodeError, Result};
use crate::node::coordinator::Coordinator;
use crate::node::gateway::HttpGateway;
use crate::web::middleware::cors::create_cors_layer;
use crate::web::middleware::logging::create_logging_layer;
use crate::web::models::ErrorResponse;
use crate::web::routes::create_all_routes;

/// Shared application state every handler extracts: the coordinator wired to
/// the concrete HTTP gateway.
pub type AppState = Arc<Coordinator<HttpGateway>>;

pub struct WebServer {
    state: AppState,
    port: u16,
}

impl WebServer {
    pub fn new(state: AppState, port: u16) -> Self {
        WebServer { state, port }
    }

    fn app(&self) -> Router {
        Router::new()
            .merge(create_all_routes())
            .with_state(self.state.clone())
            .layer(create_cors_layer())
            .layer(CompressionLayer::new())
            .layer(create_logging_layer())
            .layer(axum::middleware::from_fn(handle_errors))
    }

    /// Serves the API until the process receives `SIGINT`.
    pub async fn start_with_shutdown(&self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        tracing::info!(%addr, "web: starting server");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| NodeError::BindError(e.to_string()))?;

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("web: shutdown signal received");
        };

        axum::serve(listener, self.app())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| NodeError::BindError(e.to_string()))
    }
}

/// Reformats any unhandled 500 into a structured body (teacher `web/server.rs`
/// `handle_errors` pattern). Handlers that already map their own failures to
/// 400/500 never reach this; it only catches what slips through.
async fn handle_errors(request: Request<Body>, next: Next) -> std::result::Result<Response, StatusCode> {
    let response = next.run(request).await;

    if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
        let error_response = ErrorResponse {
            error: "Internal Server Error".to_string(),
            message: "An unexpected error occurred".to_string(),
            status_code: 500,
        };
        return Ok(Json(error_response).into_response());
    }

    Ok(response)
}

