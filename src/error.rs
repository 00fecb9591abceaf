//! Error handling for the camera node

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Camera endpoint unreachable (network error, timeout, error status)
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// Response body was not a valid image
    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    /// Local re-encoding failed
    #[error("Encode failure: {0}")]
    EncodeFailure(String),

    /// Detection model missing at startup (fatal)
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Error::UpstreamUnreachable(msg) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_UNREACHABLE", msg.clone())
            }
            Error::DecodeFailure(msg) => (StatusCode::BAD_GATEWAY, "DECODE_FAILURE", msg.clone()),
            Error::EncodeFailure(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ENCODE_FAILURE",
                msg.clone(),
            ),
            Error::ModelUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "MODEL_UNAVAILABLE",
                msg.clone(),
            ),
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", msg.clone()),
            Error::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", e.to_string()),
            Error::Serialization(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERIALIZATION_ERROR",
                e.to_string(),
            ),
            Error::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        tracing::error!(
            status = %status,
            error_code = %error_code,
            message = %message,
            "Request error"
        );

        let body = Json(json!({
            "error_code": error_code,
            "message": message
        }));

        (status, body).into_response()
    }
}
