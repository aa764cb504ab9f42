//! Configuration management for Labsite server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    /// Connection URL of the key-value store. When unset the server falls
    /// back to the in-process store (development only).
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AnalyticsConfig {
    /// Shared secret required by the analytics and operator endpoints.
    /// When unset, every request to those endpoints is rejected.
    pub admin_secret: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeoConfig {
    /// Base URL of the IP geolocation provider.
    pub endpoint: String,
    /// Per-request timeout for geolocation lookups.
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PushConfig {
    /// Base64url-encoded P-256 public key handed out to browsers.
    pub vapid_public_key: Option<String>,
    /// ES256 signing key in PEM form.
    pub vapid_private_key: Option<String>,
    /// VAPID subject claim, a contact URI for the push service operator.
    pub vapid_subject: String,
    /// TTL header value for delivered notifications, in seconds.
    pub ttl_seconds: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackupConfig {
    /// Snapshots strictly older than this many days are evicted.
    pub retention_days: i64,
    /// Civil-date offset of the laboratory (UTC+9).
    pub utc_offset_hours: i32,
    /// Dashboard sections captured into each snapshot.
    pub sections: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub geo: GeoConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub backup: BackupConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix LABSITE_)
            .add_source(
                Environment::with_prefix("LABSITE")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override Redis URL from REDIS_URL env var if present
            .set_override_option("redis.url", env::var("REDIS_URL").ok())?
            // Override the shared secret from ADMIN_SECRET env var if present
            .set_override_option("analytics.admin_secret", env::var("ADMIN_SECRET").ok())?
            // Override VAPID credentials from env vars if present
            .set_override_option("push.vapid_public_key", env::var("VAPID_PUBLIC_KEY").ok())?
            .set_override_option("push.vapid_private_key", env::var("VAPID_PRIVATE_KEY").ok())?
            .set_override_option("push.vapid_subject", env::var("VAPID_SUBJECT").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://ip-api.com".to_string(),
            timeout_ms: 2000,
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            vapid_public_key: None,
            vapid_private_key: None,
            vapid_subject: "mailto:contact@labsite.org".to_string(),
            ttl_seconds: 86400,
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            retention_days: 7,
            utc_offset_hours: 9,
            sections: vec![
                "about".to_string(),
                "team".to_string(),
                "projects".to_string(),
                "publications".to_string(),
                "gallery".to_string(),
                "news".to_string(),
            ],
        }
    }
}
