//! farmctl-server: HTTP backend for farm records and AI insights
//!
//! Serves farms, crops, livestock, growth tracking, uploads and dashboards
//! over a Supabase Postgres database, and generates insights through an
//! OpenAI-compatible chat-completion API.

pub mod clients;
pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod services;

pub use config::{ConfigError, Settings};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
