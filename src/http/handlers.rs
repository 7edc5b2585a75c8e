//! HTTP endpoint handlers
//!
//! One synchronous flow per request: the auth middleware has already
//! validated the caller by the time `handle_deploy` runs, so handlers only
//! dispatch the action, block on the script, and map the outcome to a
//! response.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    audit::AuditLog,
    config::Config,
    error::{Error, ExecutionError},
    execution::{tail, DeployAction, ExecutionResult, ScriptRunner, OUTPUT_TAIL_BYTES},
    http::responses::{DeployResponse, ErrorResponse, HealthResponse},
};

/// Application state shared across handlers. Read-only after startup; the
/// audit log is the only shared resource and serializes its own writes.
pub struct AppState {
    pub config: Config,
    pub audit: Arc<AuditLog>,
    pub runner: ScriptRunner,
}

/// POST /deploy - run the deploy script and report its outcome
pub async fn handle_deploy(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let (action, source) = match DeployAction::from_body(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "Rejected deploy request");
            return e.into_response();
        }
    };

    info!(
        action = action.as_str(),
        source = %source,
        "Received deploy request"
    );

    match state.runner.run(action).await {
        Ok(result) => execution_response(action, result, &state),
        Err(e) => {
            warn!(action = action.as_str(), error = %e, "Deploy request failed");
            e.into_response()
        }
    }
}

/// Map a completed (or timed-out) script run to its terminal response
fn execution_response(action: DeployAction, result: ExecutionResult, state: &AppState) -> Response {
    if result.timed_out {
        return Error::Execution(ExecutionError::Timeout {
            script: state.config.deploy.script_path().display().to_string(),
            timeout: action.timeout_secs(&state.config.deploy),
        })
        .into_response();
    }

    if result.success() {
        let message = match action {
            DeployAction::Deploy => "Deployment completed",
            DeployAction::Check => "Update check completed",
        };
        let response =
            DeployResponse::new(message.to_string(), tail(&result.stdout, OUTPUT_TAIL_BYTES));
        (StatusCode::OK, Json(response)).into_response()
    } else {
        let message = match action {
            DeployAction::Deploy => "Deployment failed",
            DeployAction::Check => "Update check failed",
        };
        warn!(
            action = action.as_str(),
            exit_code = ?result.exit_code,
            "Deploy script failed"
        );
        let response = ErrorResponse::new(message.to_string())
            .with_error(tail(&result.stderr, OUTPUT_TAIL_BYTES));
        (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
    }
}

/// GET /health - fixed liveness payload, no authentication
pub async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

/// Fallback for unknown routes
pub async fn handle_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Not Found".to_string())),
    )
}
