//! End-to-end tests for the webhook flow: routing, authentication, script
//! execution, and response mapping, driven through the real router with a
//! stub deploy script in a temporary deploy root.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

use deployhook::audit::AuditLog;
use deployhook::auth;
use deployhook::config::Config;
use deployhook::execution::ScriptRunner;
use deployhook::http::create_router;
use deployhook::http::handlers::AppState;

const SECRET: &str = "test-secret-key-for-hmac-validation";

fn write_script(root: &Path, contents: &str) {
    let scripts_dir = root.join("scripts");
    std::fs::create_dir_all(&scripts_dir).unwrap();
    let script = scripts_dir.join("sync-and-deploy.sh");
    std::fs::write(&script, contents).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn make_state(secret: &str, root: &Path, deploy_timeout: u64) -> Arc<AppState> {
    let mut config = Config::default();
    config.auth.secret = secret.to_string();
    config.deploy.root = root.to_path_buf();
    config.deploy.deploy_timeout = deploy_timeout;
    config.logging.file = None;

    Arc::new(AppState {
        runner: ScriptRunner::new(config.deploy.clone()),
        audit: Arc::new(AuditLog::disabled()),
        config,
    })
}

fn setup(secret: &str, script: &str) -> (axum::Router, TempDir) {
    let dir = tempdir().unwrap();
    write_script(dir.path(), script);
    let router = create_router(make_state(secret, dir.path(), 300));
    (router, dir)
}

fn deploy_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/deploy")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn signed_deploy_request(secret: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/deploy")
        .header("content-type", "application/json")
        .header("x-hub-signature-256", auth::signature_for(secret, body.as_bytes()))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_open_and_fixed() {
    let (router, _dir) = setup(SECRET, "#!/bin/sh\ntrue\n");

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "deployhook");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (router, _dir) = setup(SECRET, "#!/bin/sh\ntrue\n");

    let response = router
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrong_method_on_deploy_is_404() {
    let (router, _dir) = setup("", "#!/bin/sh\ntrue\n");

    let response = router
        .oneshot(
            Request::builder()
                .uri("/deploy")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn wrong_method_on_health_is_404() {
    let (router, _dir) = setup("", "#!/bin/sh\ntrue\n");

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn open_mode_accepts_unauthenticated_deploy() {
    let (router, _dir) = setup("", "#!/bin/sh\necho \"mode=$1\"\n");

    let response = router.oneshot(deploy_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Deployment completed");
    assert!(body["output"].as_str().unwrap().contains("mode=--auto"));
}

#[tokio::test]
async fn check_action_uses_check_flag() {
    let (router, _dir) = setup("", "#!/bin/sh\necho \"mode=$1\"\n");

    let response = router
        .oneshot(deploy_request(r#"{"action":"check"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Update check completed");
    assert!(body["output"].as_str().unwrap().contains("mode=--check"));
}

#[tokio::test]
async fn unknown_action_is_400() {
    let (router, _dir) = setup("", "#!/bin/sh\ntrue\n");

    let response = router
        .oneshot(deploy_request(r#"{"action":"restart"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("restart"));
}

#[tokio::test]
async fn malformed_body_defaults_to_deploy() {
    let (router, _dir) = setup("", "#!/bin/sh\necho \"mode=$1\"\n");

    let response = router.oneshot(deploy_request("not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["output"].as_str().unwrap().contains("mode=--auto"));
}

#[tokio::test]
async fn missing_credentials_rejected_with_403() {
    let (router, _dir) = setup(SECRET, "#!/bin/sh\ntrue\n");

    let response = router.oneshot(deploy_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn valid_signature_is_authorized() {
    let (router, _dir) = setup(SECRET, "#!/bin/sh\necho done\n");

    let response = router
        .oneshot(signed_deploy_request(SECRET, "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn mutated_body_invalidates_signature() {
    let (router, _dir) = setup(SECRET, "#!/bin/sh\ntrue\n");

    // Sign one body, send another differing by a single byte
    let signed_body = r#"{"action":"deploy"}"#;
    let sent_body = r#"{"action":"deploy" }"#;
    let request = Request::builder()
        .method("POST")
        .uri("/deploy")
        .header(
            "x-hub-signature-256",
            auth::signature_for(SECRET, signed_body.as_bytes()),
        )
        .body(Body::from(sent_body.to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn shared_secret_header_is_authorized() {
    let (router, _dir) = setup(SECRET, "#!/bin/sh\necho done\n");

    let request = Request::builder()
        .method("POST")
        .uri("/deploy")
        .header("x-webhook-secret", SECRET)
        .body(Body::from("{}"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_ignores_bad_auth_headers() {
    let (router, _dir) = setup(SECRET, "#!/bin/sh\ntrue\n");

    let request = Request::builder()
        .uri("/health")
        .header("x-webhook-secret", "wrong")
        .header("x-hub-signature-256", "sha256=garbage")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn timeout_returns_504_without_partial_output() {
    let dir = tempdir().unwrap();
    write_script(dir.path(), "#!/bin/sh\necho partial\nsleep 30\n");
    let router = create_router(make_state("", dir.path(), 1));

    let start = Instant::now();
    let response = router.oneshot(deploy_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    // The handler returned at the deadline, not after the sleep
    assert!(start.elapsed() < Duration::from_secs(10));

    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
    assert!(body.get("output").is_none());
}

#[tokio::test]
async fn missing_script_is_500_naming_path() {
    let dir = tempdir().unwrap();
    let router = create_router(make_state("", dir.path(), 300));

    let response = router.oneshot(deploy_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("sync-and-deploy.sh"));
}

#[tokio::test]
async fn failed_script_reports_stderr_tail() {
    let (router, _dir) = setup(
        "",
        "#!/bin/sh\necho \"sync conflict\" >&2\nexit 2\n",
    );

    let response = router.oneshot(deploy_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Deployment failed");
    assert!(body["error"].as_str().unwrap().contains("sync conflict"));
}

#[tokio::test]
async fn long_output_is_truncated_to_last_1000_bytes() {
    // 600 'a' bytes then 900 'b' bytes; the last 1000 are 100 'a' + 900 'b'
    let script = "#!/bin/sh\n\
        head -c 600 /dev/zero | tr '\\0' 'a'\n\
        head -c 900 /dev/zero | tr '\\0' 'b'\n";
    let (router, _dir) = setup("", script);

    let response = router.oneshot(deploy_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let output = body["output"].as_str().unwrap();
    assert_eq!(output.len(), 1000);
    assert_eq!(output, format!("{}{}", "a".repeat(100), "b".repeat(900)));
}
