use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lodge_site_core::content::RetryPolicy;
use lodge_site_core::media::DEFAULT_MAX_UPLOAD_BYTES;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// Secret signing admin session tokens.
    pub jwt_secret: String,
    /// The admin area password.
    pub admin_password: String,
    /// Admin session lifetime in hours.
    pub session_hours: i64,
    /// Mark the session cookie `Secure`; on when served over HTTPS.
    pub secure_cookies: bool,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
    /// Name shown in the navbar, footer and page titles.
    pub site_name: String,
    /// Directory holding uploaded images.
    pub media_dir: PathBuf,
    /// Directory holding stylesheets and bundled images.
    pub static_dir: PathBuf,
    /// Prefix of public image URLs, `{PUBLIC_BASE_URL}/media`.
    pub media_base_url: String,
    pub max_upload_bytes: u64,
    pub content_max_retries: u32,
    pub content_retry_delay_ms: u64,
    pub connectivity_interval_secs: u64,
}

fn var_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = var_or(name, default);
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port: parse_var("PORT", "3030")?,
            database_url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", "10")?,
            db_min_connections: parse_var("DB_MIN_CONNECTIONS", "1")?,
            jwt_secret: var_or("JWT_SECRET", "dev-secret-change-me-in-production"),
            admin_password: var_or("ADMIN_PASSWORD", "change-me"),
            session_hours: parse_var("SESSION_HOURS", "12")?,
            secure_cookies: parse_var("COOKIE_SECURE", "false")?,
            event_bus_capacity: parse_var("EVENT_BUS_CAPACITY", "256")?,
            log_level: var_or("LOG_LEVEL", "info"),
            site_name: var_or("SITE_NAME", "Pine Ridge RV Park & Lodge"),
            media_dir: PathBuf::from(var_or("MEDIA_DIR", "./data/media")),
            static_dir: PathBuf::from(var_or("STATIC_DIR", "./static")),
            media_base_url: format!(
                "{}/media",
                var_or("PUBLIC_BASE_URL", "").trim_end_matches('/')
            ),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string())?,
            content_max_retries: parse_var("CONTENT_MAX_RETRIES", "3")?,
            content_retry_delay_ms: parse_var("CONTENT_RETRY_DELAY_MS", "1000")?,
            connectivity_interval_secs: parse_var("CONNECTIVITY_INTERVAL_SECS", "30")?,
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.content_max_retries,
            Duration::from_millis(self.content_retry_delay_ms),
        )
    }

    pub fn connectivity_interval(&self) -> Duration {
        Duration::from_secs(self.connectivity_interval_secs.max(1))
    }

    /// Defaults suitable for tests; no environment is read.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            database_url: String::new(),
            db_max_connections: 1,
            db_min_connections: 0,
            jwt_secret: "test-secret".into(),
            admin_password: "campfire".into(),
            session_hours: 1,
            secure_cookies: false,
            event_bus_capacity: 64,
            log_level: "debug".into(),
            site_name: "Pine Ridge RV Park & Lodge".into(),
            media_dir: PathBuf::from("./data/media"),
            static_dir: PathBuf::from("./static"),
            media_base_url: "/media".into(),
            max_upload_bytes: 1024,
            content_max_retries: 1,
            content_retry_delay_ms: 1,
            connectivity_interval_secs: 30,
        }
    }
}
