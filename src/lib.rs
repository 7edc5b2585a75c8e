//! deployhook - a minimal authenticated webhook receiver that triggers
//! deployments
//!
//! A remote event source (CI, an operator, a scheduled poller) POSTs to
//! `/deploy`; the request is authenticated by HMAC signature or shared
//! secret, the local sync-and-deploy script runs with a hard timeout, and
//! the outcome is reported synchronously in the response.

pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod execution;
pub mod http;
pub mod logging;
