//! Webhook request authentication
//!
//! Two independent proofs are accepted, checked in a deterministic order:
//!
//! 1. Signature proof: `X-Hub-Signature-256` carries
//!    `"sha256=" + hex(HMAC-SHA256(secret, body))`, compared in constant
//!    time. Compatible with GitHub webhook signatures.
//! 2. Shared-secret proof: `X-Webhook-Secret` exactly equals the configured
//!    secret. Plain equality is fine here: the header is compared against a
//!    fixed server-side value, not a digest.
//!
//! Either proof is sufficient. A malformed signature header (wrong prefix,
//! non-hex) counts as a signature failure and falls through to the
//! shared-secret check. An empty configured secret means open mode: every
//! request is authorized.

use axum::http::HeaderMap;
use constant_time_eq::constant_time_eq;
use ring::hmac;
use tracing::debug;

/// Header carrying the HMAC-SHA256 signature over the raw body
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Header carrying the shared secret verbatim
pub const SHARED_SECRET_HEADER: &str = "x-webhook-secret";

/// Authorization outcome for one request; computed once, never cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    pub authorized: bool,
    pub reason: String,
}

impl AuthDecision {
    fn allow(reason: &str) -> Self {
        Self {
            authorized: true,
            reason: reason.to_string(),
        }
    }

    fn deny(reason: &str) -> Self {
        Self {
            authorized: false,
            reason: reason.to_string(),
        }
    }
}

/// Decide whether a request may trigger a deployment.
///
/// `secret` is the configured shared secret, `headers` and `body` come from
/// the inbound request.
pub fn authorize(secret: &str, headers: &HeaderMap, body: &[u8]) -> AuthDecision {
    if secret.is_empty() {
        return AuthDecision::allow("open mode, no secret configured");
    }

    if let Some(signature) = header_str(headers, SIGNATURE_HEADER) {
        if signature_proof(secret, body, signature) {
            return AuthDecision::allow("valid signature");
        }
        debug!("Signature proof failed, falling through to shared-secret check");
    }

    if let Some(provided) = header_str(headers, SHARED_SECRET_HEADER) {
        if provided == secret {
            return AuthDecision::allow("valid shared secret");
        }
        debug!("Shared-secret proof failed");
    }

    AuthDecision::deny("no valid signature or shared secret")
}

/// Verify a `sha256=<hex>` signature over `body` in constant time
fn signature_proof(secret: &str, body: &[u8], signature: &str) -> bool {
    let Some(provided_hex) = signature.strip_prefix("sha256=") else {
        debug!("Invalid signature format - missing 'sha256=' prefix");
        return false;
    };

    let Ok(provided_bytes) = hex::decode(provided_hex) else {
        debug!("Invalid signature format - failed to decode hex");
        return false;
    };

    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let expected = hmac::sign(&key, body);

    constant_time_eq(expected.as_ref(), &provided_bytes)
}

/// Compute the signature header value for `body`. Used by callers that
/// trigger deployments programmatically, and by the tests.
pub fn signature_for(secret: &str, body: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let signature = hmac::sign(&key, body);
    format!("sha256={}", hex::encode(signature.as_ref()))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
