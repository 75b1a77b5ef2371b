//! Server configuration - file defaults plus environment overrides
//!
//! Precedence (highest first):
//! 1. CLI flags (applied by the binary)
//! 2. Environment variables (`DATABASE_URL`, `SUPABASE_URL`, `OPENAI_API_KEY`, ...)
//! 3. `~/.farmctl/config.toml`
//! 4. Built-in defaults

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_BIND: ([u8; 4], u16) = ([127, 0, 0, 1], 3030);
const DEFAULT_BUCKET: &str = "farm-uploads";
const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{key} is not set")]
    Missing { key: &'static str },
}

/// Effective configuration for the server and its outbound clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    pub ai: AiSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,
    /// Allow any CORS origin (default: localhost only)
    pub cors_permissive: bool,
    /// Supabase Postgres connection string
    pub database_url: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(DEFAULT_BIND),
            cors_permissive: false,
            database_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseSettings {
    /// Project URL, e.g. https://abcd.supabase.co
    pub url: Option<String>,
    /// Public anon key, sent as `apikey` when resolving user tokens
    pub anon_key: Option<String>,
    /// Service role key, used for storage uploads
    pub service_role_key: Option<String>,
    pub storage_bucket: String,
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            service_role_key: None,
            storage_bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Default config file location (~/.farmctl/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".farmctl").join("config.toml"))
    }

    /// Load the config file (if present) and apply process environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from an environment lookup. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get("FARMCTL_BIND") {
            self.server.bind_addr = bind.parse().map_err(|e| ConfigError::Invalid {
                key: "FARMCTL_BIND",
                reason: format!("{}", e),
            })?;
        }
        if let Some(flag) = get("FARMCTL_CORS_PERMISSIVE") {
            self.server.cors_permissive = parse_bool("FARMCTL_CORS_PERMISSIVE", &flag)?;
        }
        if let Some(url) = get("DATABASE_URL") {
            self.server.database_url = Some(url);
        }

        if let Some(url) = get("SUPABASE_URL") {
            self.supabase.url = Some(url.trim_end_matches('/').to_string());
        }
        if let Some(key) = get("SUPABASE_ANON_KEY") {
            self.supabase.anon_key = Some(key);
        }
        if let Some(key) = get("SUPABASE_SERVICE_ROLE_KEY") {
            self.supabase.service_role_key = Some(key);
        }
        if let Some(bucket) = get("FARMCTL_STORAGE_BUCKET") {
            self.supabase.storage_bucket = bucket;
        }

        if let Some(key) = get("OPENAI_API_KEY") {
            self.ai.api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.ai.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.ai.model = model;
        }

        Ok(())
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.server
            .database_url
            .as_deref()
            .ok_or(ConfigError::Missing { key: "DATABASE_URL" })
    }

    /// Copy with every secret replaced by a masked preview, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.server.database_url = copy.server.database_url.as_deref().map(mask_secret);
        copy.supabase.anon_key = copy.supabase.anon_key.as_deref().map(mask_secret);
        copy.supabase.service_role_key = copy.supabase.service_role_key.as_deref().map(mask_secret);
        copy.ai.api_key = copy.ai.api_key.as_deref().map(mask_secret);
        copy
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}

/// Keep the first four characters of a secret and mask the rest.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind_addr.port(), 3030);
        assert!(!settings.server.cors_permissive);
        assert_eq!(settings.supabase.storage_bucket, "farm-uploads");
        assert_eq!(settings.ai.model, "gpt-4o-mini");
        assert!(settings.database_url().is_err());
    }

    #[test]
    fn env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[
                ("FARMCTL_BIND", "0.0.0.0:8080"),
                ("FARMCTL_CORS_PERMISSIVE", "yes"),
                ("DATABASE_URL", "postgres://db/farm"),
                ("SUPABASE_URL", "https://proj.supabase.co/"),
                ("OPENAI_BASE_URL", "http://localhost:9999/v1/"),
                ("OPENAI_MODEL", "   "),
            ]))
            .unwrap();

        assert_eq!(settings.server.bind_addr.port(), 8080);
        assert!(settings.server.cors_permissive);
        assert_eq!(settings.database_url().unwrap(), "postgres://db/farm");
        assert_eq!(settings.supabase.url.as_deref(), Some("https://proj.supabase.co"));
        assert_eq!(settings.ai.base_url, "http://localhost:9999/v1");
        // Blank values are ignored
        assert_eq!(settings.ai.model, "gpt-4o-mini");
    }

    #[test]
    fn rejects_bad_bind() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(env(&[("FARMCTL_BIND", "not-an-addr")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "FARMCTL_BIND", .. }));
    }

    #[test]
    fn file_values_are_defaults_for_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[supabase]\nstorage_bucket = \"field-photos\"\n\n[ai]\nmodel = \"gpt-4o\""
        )
        .unwrap();

        let mut settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.supabase.storage_bucket, "field-photos");
        assert_eq!(settings.server.bind_addr.port(), 3030);

        settings.apply_env(env(&[("OPENAI_MODEL", "o3-mini")])).unwrap();
        assert_eq!(settings.ai.model, "o3-mini");
    }

    #[test]
    fn redacts_secrets() {
        let mut settings = Settings::default();
        settings.ai.api_key = Some("sk-abcdef123".into());
        settings.supabase.anon_key = Some("abc".into());

        let shown = settings.redacted();
        assert_eq!(shown.ai.api_key.as_deref(), Some("sk-a****"));
        assert_eq!(shown.supabase.anon_key.as_deref(), Some("****"));
    }
}
