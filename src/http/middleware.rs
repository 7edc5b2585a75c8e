//! Request middleware: authentication for /deploy and best-effort request
//! auditing for every route

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    auth,
    error::Error,
    http::{handlers::AppState, responses::ErrorResponse},
};

/// Authenticate a deploy request against the configured secret.
///
/// The raw body is needed for signature verification, so it is buffered
/// here and the request reconstructed before the handler runs.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match to_bytes(body, state.config.server.max_request_size).await {
        Ok(bytes) => bytes,
        Err(_) => {
            warn!("Failed to read request body for authentication");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Failed to read request body".to_string())),
            )
                .into_response();
        }
    };

    let decision = auth::authorize(&state.config.auth.secret, &parts.headers, &body_bytes);
    if !decision.authorized {
        warn!(reason = %decision.reason, "Rejected unauthorized deploy request");
        return Error::Forbidden {
            reason: decision.reason,
        }
        .into_response();
    }

    let request = Request::from_parts(parts, Body::from(body_bytes.to_vec()));
    next.run(request).await
}

/// Record every request with its client address and final status, to both
/// the tracing stream and the append-only log. Applied as the outermost
/// layer so the recorded status is the one actually sent.
pub async fn audit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16();
    info!(
        client = %client,
        method = %method,
        path = %path,
        status,
        "Request handled"
    );
    state.audit.record(&client, &method, &path, &status.to_string());

    response
}
