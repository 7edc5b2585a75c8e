//! HTTP server setup: routing, middleware layering, and graceful shutdown

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    audit::AuditLog,
    config::Config,
    error::Result,
    execution::ScriptRunner,
    http::{
        handlers::{handle_deploy, handle_health, handle_not_found, AppState},
        middleware::{audit_middleware, auth_middleware},
    },
};

/// Start the HTTP server with the given configuration
pub async fn start_server(
    config: Config,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let audit = Arc::new(AuditLog::open(config.logging.file.as_deref()));
    audit.message(&format!(
        "Starting webhook server on port {}",
        config.server.port
    ));

    let app_state = Arc::new(AppState {
        runner: ScriptRunner::new(config.deploy.clone()),
        audit: audit.clone(),
        config,
    });

    let router = create_router(app_state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], app_state.config.server.port));
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        error!(error = %e, addr = %addr, "Failed to bind to address");
        crate::error::Error::Io(e)
    })?;

    info!(
        listen_addr = %listener.local_addr().unwrap_or(addr),
        deploy_root = %app_state.config.deploy.root.display(),
        open_mode = app_state.config.auth.secret.is_empty(),
        "HTTP server listening"
    );

    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        shutdown_signal.await;
        info!("Shutdown signal received, starting graceful shutdown");
    });

    if let Err(e) = server.await {
        error!(error = %e, "HTTP server error");
        return Err(crate::error::Error::Io(e));
    }

    audit.message("Shutting down");
    info!("HTTP server shutdown complete");
    Ok(())
}

/// Create the router with all endpoints and middleware.
///
/// Only /deploy is authenticated; /health and the 404 fallback are open.
/// Method mismatches on known paths (GET /deploy, POST /health) take the
/// same 404 path as unknown routes rather than axum's default 405. The
/// audit layer is outermost so every request is recorded with the status
/// that was actually sent.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let deploy_routes = Router::new()
        .route("/deploy", post(handle_deploy))
        .layer(from_fn_with_state(app_state.clone(), auth_middleware));

    Router::new()
        .merge(deploy_routes)
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .method_not_allowed_fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(
            app_state.config.server.max_request_size,
        ))
        .layer(from_fn_with_state(app_state.clone(), audit_middleware))
        .with_state(app_state)
}
