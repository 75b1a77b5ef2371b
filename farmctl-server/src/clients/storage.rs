//! Object storage client (Supabase Storage)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::SupabaseSettings;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not configured ({0} not set)")]
    NotConfigured(&'static str),

    #[error("storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("storage returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

/// A stored object and where the public can fetch it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub path: String,
    pub url: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError>;
}

/// Supabase Storage bucket client
#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    http: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseStorage {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(settings: &SupabaseSettings) -> Result<Self, StorageError> {
        let base_url = settings
            .url
            .as_deref()
            .ok_or(StorageError::NotConfigured("SUPABASE_URL"))?
            .trim_end_matches('/')
            .to_string();
        let service_key = settings
            .service_role_key
            .clone()
            .ok_or(StorageError::NotConfigured("SUPABASE_SERVICE_ROLE_KEY"))?;

        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("farmctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            service_key,
            bucket: settings.storage_bucket.clone(),
        })
    }

    /// Public URL of an object in this bucket
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        let size = bytes.len();
        let response = self
            .http
            .post(format!(
                "{}/storage/v1/object/{}/{}",
                self.base_url, self.bucket, path
            ))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Http {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(bucket = %self.bucket, path, size, "Stored upload");
        Ok(StoredObject {
            path: path.to_string(),
            url: self.public_url(path),
        })
    }
}

/// Stand-in used when storage credentials are missing; every upload fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredStorage;

#[async_trait]
impl ObjectStorage for UnconfiguredStorage {
    async fn upload(&self, _: &str, _: &str, _: Vec<u8>) -> Result<StoredObject, StorageError> {
        Err(StorageError::NotConfigured("SUPABASE_SERVICE_ROLE_KEY"))
    }
}
