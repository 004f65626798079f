//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! A `.env` file, if present, is loaded by `main` before [`ApiConfig::load`].

use std::env;
use std::str::FromStr;

/// SMTP relay settings. Present only when `SMTP_HOST` is set.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// JWT secret key for signing session tokens
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Externally reachable base URL, used in verification links
    pub public_base_url: String,

    /// Where a verified owner is sent after clicking the link
    pub login_redirect_url: String,

    /// Sender address of outgoing mail
    pub email_from: String,

    /// SMTP relay; `None` logs mail instead of sending it
    pub smtp: Option<SmtpConfig>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let http_port: u16 = parse_var("HTTP_PORT", "8080")?;

        let smtp = match env::var("SMTP_HOST").ok().filter(|h| !h.trim().is_empty()) {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse_var("SMTP_PORT", "587")?,
                username: require_var("SMTP_USERNAME")?,
                password: require_var("SMTP_PASSWORD")?,
            }),
            None => None,
        };

        let config = ApiConfig {
            http_port,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./shopfront.db".to_string()),

            db_max_connections: parse_var("DB_MAX_CONNECTIONS", "5")?,

            jwt_secret: env::var("JWT_SECRET")
                // In production this MUST be set via environment variable
                .unwrap_or_else(|_| "shopfront-dev-secret-change-in-production".to_string()),

            jwt_lifetime_secs: parse_var("JWT_LIFETIME_SECS", "259200")?, // 72 hours

            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{http_port}"))
                .trim_end_matches('/')
                .to_string(),

            login_redirect_url: env::var("LOGIN_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:5173/login".to_string()),

            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Shopfront <no-reply@shopfront.local>".to_string()),

            smtp,
        };

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue("JWT_SECRET".to_string()));
        }
        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }

        Ok(config)
    }

    /// Configuration for tests: in-process values, no SMTP.
    pub fn for_tests() -> Self {
        ApiConfig {
            http_port: 0,
            database_path: ":memory:".to_string(),
            db_max_connections: 1,
            jwt_secret: "test-secret".to_string(),
            jwt_lifetime_secs: 3600,
            public_base_url: "http://localhost:8080".to_string(),
            login_redirect_url: "http://localhost:5173/login".to_string(),
            email_from: "Shopfront <no-reply@shopfront.local>".to_string(),
            smtp: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

fn require_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingRequired(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
