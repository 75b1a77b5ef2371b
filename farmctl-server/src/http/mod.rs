//! HTTP server layer
//!
//! Axum server with:
//! - Bearer-token authentication on every resource route
//! - Organization membership checks after existence checks
//! - CORS (localhost only by default) and request tracing
//! - JSON error responses

pub mod access;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
