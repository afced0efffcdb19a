use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::storage::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The relevance oracle failed; the whole run is abandoned.
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// The typesetter ran but produced no usable PDF.
    #[error("Compilation failed with status {status}")]
    Compile { status: i32, log: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Oracle(msg) => {
                tracing::error!("Oracle error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "ORACLE_UNAVAILABLE",
                    "The language model is unavailable; nothing was saved".to_string(),
                )
            }
            AppError::Compile { status, log } => {
                tracing::error!("Compilation failed with status {status}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "COMPILE_FAILED",
                    format!("LaTeX compilation failed (status {status}):\n{log}"),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::S3(msg) => {
                tracing::error!("S3 error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "S3_ERROR",
                    "An archive error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_oracle_error_maps_to_503() {
        let response = AppError::Oracle("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "ORACLE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_compile_error_carries_raw_log() {
        let response = AppError::Compile {
            status: 1,
            log: "! Undefined control sequence.".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "COMPILE_FAILED");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("! Undefined control sequence."));
    }

    #[tokio::test]
    async fn test_validation_error_keeps_message() {
        let response = AppError::Validation("html cannot be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "html cannot be empty");
    }
}
