//! HTTP service.
//!
//! # Endpoints
//!
//! - `GET /health`: liveness check, `{"status": "available"}`
//! - `POST /explain`: `{"text_content": "..."}` to `{"summary": "..."}`
//! - `POST /parse`: `{"text_content": "..."}` to the analyzed document
//!
//! Undecodable request bodies are answered with `400`, configuration text
//! that cannot be tokenized with `500 failed to parse Terraform code`.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{ExplainResponse, SourceRequest};

use crate::config::ServerOptions;
use crate::error::Result;
use crate::explainer::Explainer;
use crate::Inspector;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Shared state of the service.
#[derive(Debug)]
pub struct AppState {
    pub inspector: Inspector,
    pub explainer: Explainer,
}

impl AppState {
    #[must_use]
    pub fn new(inspector: Inspector, explainer: Explainer) -> Self {
        Self { inspector, explainer }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>, options: &ServerOptions) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/explain", post(handlers::explain))
        .route("/parse", post(handlers::parse))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(options.max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to `options.bind` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns a `Server` error if the address cannot be bound or the server
/// stops with an error.
pub async fn serve(options: &ServerOptions, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&options.bind).await.map_err(|e| {
        crate::err!(Server {
            message: format!("failed to bind {}: {e}", options.bind),
        })
    })?;

    let addr = listener
        .local_addr()
        .map_or_else(|_| options.bind.clone(), |a| a.to_string());
    tracing::info!(addr = %addr, online = state.explainer.is_online(), "Server listening");

    axum::serve(listener, router(state, options))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| crate::err!(Server { message: e.to_string() }))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
