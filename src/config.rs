//! Server configuration: TOML file + environment overrides.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use gridsql_core::PageCacheConfig;

/// Environment variable overriding `upstream.api_token`.
pub const ENV_API_TOKEN: &str = "GRIDSQL_API_TOKEN";
/// Environment variable overriding `upstream.api_url`.
pub const ENV_API_URL: &str = "GRIDSQL_API_URL";

/// Main server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Upstream record-store access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    /// Base URL of the upstream API, no trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// API credential. Usually supplied via GRIDSQL_API_TOKEN rather than
    /// written into the file.
    #[serde(default)]
    pub api_token: String,
}

/// Page cache tuning. The TTL is the operator-facing knob; capacity
/// defaults are fine for every deployment seen so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Base log level: error, warn, info, debug, trace.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "compact" or "json".
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_api_url() -> String {
    "https://api.airtable.com".to_string()
}

fn default_max_pages() -> usize {
    100
}

fn default_ttl_seconds() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: String::new(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment overrides are applied separately via `apply_env_overrides()`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read config file: {}", e))?;
        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse config file: {}", e))?;
        Ok(config)
    }

    /// File if present, defaults otherwise; environment applied on top,
    /// then validated.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(&path)?
        } else {
            ServerConfig::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides. The credential in particular belongs in
    /// the environment, not on disk.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = env::var(ENV_API_TOKEN) {
            if !token.is_empty() {
                self.upstream.api_token = token;
            }
        }
        if let Ok(url) = env::var(ENV_API_URL) {
            if !url.is_empty() {
                self.upstream.api_url = url;
            }
        }
    }

    /// Validate configuration settings.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.upstream.api_token.is_empty() {
            return Err(anyhow::anyhow!(
                "upstream.api_token is required (set {} or add it to the config file)",
                ENV_API_TOKEN
            ));
        }
        if self.upstream.api_url.is_empty() {
            return Err(anyhow::anyhow!("upstream.api_url cannot be empty"));
        }
        if self.cache.max_pages == 0 {
            return Err(anyhow::anyhow!("cache.max_pages cannot be 0"));
        }
        if self.cache.ttl_seconds == 0 {
            return Err(anyhow::anyhow!("cache.ttl_seconds cannot be 0"));
        }
        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            other => {
                return Err(anyhow::anyhow!("invalid logging.level {:?}", other));
            }
        }
        Ok(())
    }

    /// Page-cache configuration for the core.
    pub fn page_cache(&self) -> PageCacheConfig {
        PageCacheConfig {
            capacity: self.cache.max_pages,
            ttl: Duration::from_secs(self.cache.ttl_seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_a_minimal_file_with_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [upstream]
            api_token = "key123"

            [cache]
            ttl_seconds = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.api_token, "key123");
        assert_eq!(config.upstream.api_url, "https://api.airtable.com");
        assert_eq!(config.cache.ttl_seconds, 30);
        assert_eq!(config.cache.max_pages, 100);
        assert_eq!(config.logging.level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn rejects_missing_token_and_zero_ttl() {
        let config = ServerConfig::default();
        assert!(config.validate().is_err());

        let config: ServerConfig = toml::from_str(
            r#"
            [upstream]
            api_token = "key123"

            [cache]
            ttl_seconds = 0
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_file_reports_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ServerConfig::from_file(&missing).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn reads_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[upstream]\napi_token = \"key123\"").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.upstream.api_token, "key123");
    }

    #[test]
    fn page_cache_settings_carry_over() {
        let config: ServerConfig = toml::from_str(
            r#"
            [upstream]
            api_token = "key123"

            [cache]
            max_pages = 7
            ttl_seconds = 42
            "#,
        )
        .unwrap();
        let cache = config.page_cache();
        assert_eq!(cache.capacity, 7);
        assert_eq!(cache.ttl, Duration::from_secs(42));
    }
}
