//! HTTP response types and error-to-response mapping
//!
//! Every terminal request state maps 1:1 to an HTTP status and JSON body.
//! Handler-level errors are always converted to responses here, never
//! propagated to the listener.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{Error, ExecutionError};

/// Successful deploy or check response
#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub status: &'static str,
    pub message: String,
    /// Last portion of the script's stdout
    pub output: String,
}

impl DeployResponse {
    pub fn new(message: String, output: String) -> Self {
        Self {
            status: "success",
            message,
            output,
        }
    }
}

/// Error response body shared by all failure states
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
    /// Last portion of the script's stderr, present only for execution
    /// failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            status: "error",
            message,
            error: None,
        }
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }
}

/// Liveness response, fixed shape
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            service: env!("CARGO_PKG_NAME"),
        }
    }
}

/// Convert error types to HTTP status codes
pub fn error_to_status_code(error: &Error) -> StatusCode {
    match error {
        Error::Forbidden { .. } => StatusCode::FORBIDDEN,
        Error::UnknownAction { .. } => StatusCode::BAD_REQUEST,
        Error::ScriptMissing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        Error::Execution(ExecutionError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
        Error::Execution(ExecutionError::StartFailed { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = error_to_status_code(&self);
        let body = ErrorResponse::new(self.to_string());
        (status_code, Json(body)).into_response()
    }
}
