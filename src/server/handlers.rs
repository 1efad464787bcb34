//! Request handlers.

use crate::server::{ApiError, AppState};
use crate::types::ConfigurationDocument;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Body of `/explain` and `/parse`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRequest {
    /// Terraform configuration text
    #[serde(default)]
    pub text_content: String,
}

/// Body returned by `/explain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub summary: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "available" }))
}

pub async fn explain(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SourceRequest>, JsonRejection>,
) -> Result<Json<ExplainResponse>, ApiError> {
    let Json(request) = payload?;
    let document = state.inspector.inspect(&request.text_content)?;

    tracing::info!(
        resources = document.resources.len(),
        findings = document.findings.len(),
        online = state.explainer.is_online(),
        "Explaining configuration"
    );

    let summary = state.explainer.explain(&document).await;
    Ok(Json(ExplainResponse { summary }))
}

pub async fn parse(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SourceRequest>, JsonRejection>,
) -> Result<Json<ConfigurationDocument>, ApiError> {
    let Json(request) = payload?;
    let document = state.inspector.inspect(&request.text_content)?;

    tracing::info!(
        resources = document.resources.len(),
        findings = document.findings.len(),
        "Parsed configuration"
    );

    Ok(Json(document))
}
