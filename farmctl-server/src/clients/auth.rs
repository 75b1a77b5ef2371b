//! Bearer-token verification against Supabase Auth
//!
//! The token is resolved by asking the auth service who it belongs to
//! (`GET /auth/v1/user`). A rejected token is `AuthError::InvalidToken`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SupabaseSettings;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("auth is not configured ({0} not set)")]
    NotConfigured(&'static str),

    #[error("auth request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("auth service returned HTTP {status}")]
    Http { status: u16 },
}

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Resolves a bearer token to a user
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError>;
}

/// Supabase Auth (GoTrue) token verifier
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(settings: &SupabaseSettings) -> Result<Self, AuthError> {
        let base_url = settings
            .url
            .as_deref()
            .ok_or(AuthError::NotConfigured("SUPABASE_URL"))?
            .trim_end_matches('/')
            .to_string();
        let anon_key = settings
            .anon_key
            .clone()
            .ok_or(AuthError::NotConfigured("SUPABASE_ANON_KEY"))?;

        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("farmctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            anon_key,
        })
    }
}

#[async_trait]
impl TokenVerifier for SupabaseAuth {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<AuthUser>().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::InvalidToken),
            status => Err(AuthError::Http {
                status: status.as_u16(),
            }),
        }
    }
}
