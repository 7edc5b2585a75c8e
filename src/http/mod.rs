//! HTTP surface: routing, handlers, authentication middleware, and
//! request/response types

pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod server;

pub use server::{create_router, start_server};
