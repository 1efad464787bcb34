//! Error responses of the HTTP service.

use crate::error::InfraExplainError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors returned by request handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid JSON")]
    InvalidJson(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("failed to parse Terraform code")]
    Parse(String),

    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Parse(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::InvalidJson(rejection.body_text())
        }
    }
}

impl From<InfraExplainError> for ApiError {
    fn from(err: InfraExplainError) -> Self {
        if err.is_parse_error() {
            Self::Parse(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::InvalidJson(detail) | Self::Parse(detail) | Self::Internal(detail) => {
                tracing::warn!(status = %self.status(), detail = %detail, "{self}");
            }
            Self::PayloadTooLarge => tracing::warn!(status = %self.status(), "{self}"),
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_map_to_500() {
        let err = crate::err!(Lexical {
            message: "unterminated string literal".to_string(),
            line: 1,
            column: 5,
        });
        let api: ApiError = err.into();
        assert!(matches!(api, ApiError::Parse(_)));
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.to_string(), "failed to parse Terraform code");
    }

    #[test]
    fn test_other_errors_are_internal() {
        let api: ApiError = crate::err!(Internal { message: "x".to_string() }).into();
        assert!(matches!(api, ApiError::Internal(_)));
    }
}
