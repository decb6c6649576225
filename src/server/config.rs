//! Server configuration.
//!
//! Loaded from an optional TOML file, with serde defaults for every field
//! so an empty file (or none at all) yields a runnable local setup.
//! `VOICEDROP_*` environment variables override the file afterwards, which
//! is how deployments point the same image at different ports and
//! databases.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration for the voicedrop server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listener settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session and upload policy.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Bind address for the HTTP listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Where the database and uploaded audio live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// sea-orm connection URL.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Directory for raw encoded message bytes.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
}

/// Product policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Session token lifetime.
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    /// Upper bound on a single decoded upload.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Loads the configuration: the TOML file if one was given, defaults
    /// otherwise, then `VOICEDROP_*` environment overrides on top.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Reads a TOML config file, without environment overrides.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    fn apply_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        fn parse<T: std::str::FromStr>(name: &str, raw: String) -> anyhow::Result<T>
        where
            T::Err: std::fmt::Display,
        {
            raw.parse()
                .map_err(|e| anyhow::anyhow!("invalid {name}={raw}: {e}"))
        }

        if let Some(host) = var("VOICEDROP_HOST") {
            self.http.host = host;
        }
        if let Some(port) = var("VOICEDROP_PORT") {
            self.http.port = parse("VOICEDROP_PORT", port)?;
        }
        if let Some(url) = var("VOICEDROP_DATABASE_URL") {
            self.storage.database_url = url;
        }
        if let Some(dir) = var("VOICEDROP_UPLOADS_DIR") {
            self.storage.uploads_dir = PathBuf::from(dir);
        }
        if let Some(days) = var("VOICEDROP_SESSION_TTL_DAYS") {
            self.policy.session_ttl_days = parse("VOICEDROP_SESSION_TTL_DAYS", days)?;
        }
        if let Some(bytes) = var("VOICEDROP_MAX_UPLOAD_BYTES") {
            self.policy.max_upload_bytes = parse("VOICEDROP_MAX_UPLOAD_BYTES", bytes)?;
        }
        Ok(())
    }

    /// The socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            storage: StorageConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            uploads_dir: default_uploads_dir(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: default_session_ttl_days(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_database_url() -> String {
    "sqlite://voice_messages.db?mode=rwc".to_string()
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_session_ttl_days() -> i64 {
    30
}

fn default_max_upload_bytes() -> usize {
    // Roughly five minutes of 48 kHz stereo PCM16.
    64 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_full_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:4000");
        assert_eq!(config.policy.session_ttl_days, 30);
        assert_eq!(config.storage.uploads_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn env_vars_override_file_values() {
        let mut config: ServerConfig = toml::from_str(
            r#"
            [http]
            port = 8080
            "#,
        )
        .unwrap();

        config
            .apply_overrides(|name| match name {
                "VOICEDROP_PORT" => Some("9090".to_string()),
                "VOICEDROP_DATABASE_URL" => Some("sqlite::memory:".to_string()),
                "VOICEDROP_SESSION_TTL_DAYS" => Some("7".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.storage.database_url, "sqlite::memory:");
        assert_eq!(config.policy.session_ttl_days, 7);
        // Untouched fields keep their file/default values.
        assert_eq!(config.storage.uploads_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn unparseable_env_override_is_an_error() {
        let mut config = ServerConfig::default();
        let result = config.apply_overrides(|name| {
            (name == "VOICEDROP_PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: ServerConfig = toml::from_str(
            r#"
            [http]
            port = 8080

            [storage]
            database_url = "sqlite::memory:"
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.storage.database_url, "sqlite::memory:");
        assert_eq!(config.policy.session_ttl_days, 30);
    }
}
