use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// A required variable is absent or a value does not parse.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Fixed-window limit applied to login attempts per client IP.
#[derive(Debug, Clone, Copy)]
pub struct LoginRateLimit {
    pub max_attempts: u32,
    pub window_secs: u64,
}

/// Server configuration loaded from environment variables.
///
/// Optional fields have defaults suitable for local development; the
/// connection strings and JWT secret must always be supplied.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    pub redis_url: String,
    /// Upper bound on waiting for a pooled database connection (default: `5`).
    pub store_timeout_secs: u64,
    /// Upper bound on each revocation-list round trip (default: `3`).
    pub revocation_timeout_secs: u64,
    pub login_rate_limit: LoginRateLimit,
    /// Key the login limiter on the first `X-Forwarded-For` hop instead of
    /// the socket peer. Only safe behind a proxy that overwrites the header
    /// (default: `false`).
    pub trust_proxy: bool,
    /// JWT signing configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                        | Required | Default                 |
    /// |--------------------------------|----------|-------------------------|
    /// | `JWT_SECRET`                   | **yes**  | --                      |
    /// | `DATABASE_URL`                 | **yes**  | --                      |
    /// | `REDIS_URL`                    | **yes**  | --                      |
    /// | `HOST`                         | no       | `0.0.0.0`               |
    /// | `PORT`                         | no       | `3000`                  |
    /// | `CORS_ORIGINS`                 | no       | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`         | no       | `30`                    |
    /// | `STORE_TIMEOUT_SECS`           | no       | `5`                     |
    /// | `REVOCATION_TIMEOUT_SECS`      | no       | `3`                     |
    /// | `LOGIN_RATE_LIMIT_MAX`         | no       | `20`                    |
    /// | `LOGIN_RATE_LIMIT_WINDOW_SECS` | no       | `900`                   |
    /// | `TRUST_PROXY`                  | no       | `false`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            store_timeout_secs: env_or("STORE_TIMEOUT_SECS", 5)?,
            revocation_timeout_secs: env_or("REVOCATION_TIMEOUT_SECS", 3)?,
            login_rate_limit: LoginRateLimit {
                max_attempts: env_or("LOGIN_RATE_LIMIT_MAX", 20)?,
                window_secs: env_or("LOGIN_RATE_LIMIT_WINDOW_SECS", 900)?,
            },
            trust_proxy: env_or("TRUST_PROXY", false)?,
            jwt: JwtConfig::from_env()?,
        })
    }
}

/// Read a variable that must be present and non-empty.
pub(crate) fn required(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

/// Read and parse an optional variable, falling back to `default` when unset.
pub(crate) fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}
