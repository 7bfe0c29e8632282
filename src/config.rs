use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::risk::RiskLimits;

/// Configuration for the trust scoring engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Transport security configuration
    pub security: SecurityConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Risk workflow thresholds
    pub risk: RiskConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Require an API key on admin endpoints
    pub enable_admin_auth: bool,
    /// Transport rate limit per minute per IP
    pub rate_limit_per_minute: u32,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub postgres_url: String,
    /// Enable PostgreSQL (if false, uses in-memory stores)
    pub postgres_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Enable request/response logging
    pub log_requests: bool,
    /// Mask client IPs and keys in logs
    pub sanitize_logs: bool,
}

/// Thresholds for the verification workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Total score at and above which a signup is classified as a bot
    pub bot_score_threshold: u32,
    /// Signup attempts admitted per origin within the window
    pub signup_attempt_limit: i64,
    /// Trailing window for signup attempt counting, in minutes
    pub signup_window_minutes: i64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            bot_score_threshold: 70,
            signup_attempt_limit: 3,
            signup_window_minutes: 60,
        }
    }
}

impl RiskConfig {
    /// Convert to RiskLimits for use by the verification workflow.
    pub fn to_limits(&self) -> RiskLimits {
        RiskLimits {
            bot_score_threshold: self.bot_score_threshold,
            signup_attempt_limit: self.signup_attempt_limit,
            signup_window: chrono::Duration::minutes(self.signup_window_minutes),
        }
    }
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8820,
            },
            security: SecurityConfig {
                enable_admin_auth: true,
                rate_limit_per_minute: 60,
                max_request_size: 64 * 1024,
            },
            database: DatabaseConfig {
                postgres_url: "postgresql://localhost:5432/trustgate".to_string(),
                postgres_enabled: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                log_requests: true,
                sanitize_logs: true,
            },
            risk: RiskConfig::default(),
        }
    }
}

impl TrustConfig {
    /// Load configuration from TRUSTGATE_* environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var("TRUSTGATE_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = env::var("TRUSTGATE_PORT") {
            config.server.port = port.parse().context("Invalid TRUSTGATE_PORT value")?;
        }

        if let Ok(enable_auth) = env::var("TRUSTGATE_ENABLE_ADMIN_AUTH") {
            config.security.enable_admin_auth = enable_auth
                .parse()
                .context("Invalid TRUSTGATE_ENABLE_ADMIN_AUTH value")?;
        }

        if let Ok(rate_limit) = env::var("TRUSTGATE_RATE_LIMIT_PER_MINUTE") {
            config.security.rate_limit_per_minute = rate_limit
                .parse()
                .context("Invalid TRUSTGATE_RATE_LIMIT_PER_MINUTE value")?;
        }

        if let Ok(max_size) = env::var("TRUSTGATE_MAX_REQUEST_SIZE") {
            config.security.max_request_size = max_size
                .parse()
                .context("Invalid TRUSTGATE_MAX_REQUEST_SIZE value")?;
        }

        if let Ok(url) = env::var("TRUSTGATE_POSTGRES_URL") {
            config.database.postgres_url = url;
            config.database.postgres_enabled = true;
        }

        if let Ok(enabled) = env::var("TRUSTGATE_POSTGRES_ENABLED") {
            config.database.postgres_enabled = enabled
                .parse()
                .context("Invalid TRUSTGATE_POSTGRES_ENABLED value")?;
        }

        if let Ok(level) = env::var("TRUSTGATE_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(log_requests) = env::var("TRUSTGATE_LOG_REQUESTS") {
            config.logging.log_requests = log_requests
                .parse()
                .context("Invalid TRUSTGATE_LOG_REQUESTS value")?;
        }

        if let Ok(sanitize) = env::var("TRUSTGATE_SANITIZE_LOGS") {
            config.logging.sanitize_logs = sanitize
                .parse()
                .context("Invalid TRUSTGATE_SANITIZE_LOGS value")?;
        }

        if let Ok(threshold) = env::var("TRUSTGATE_BOT_SCORE_THRESHOLD") {
            config.risk.bot_score_threshold = threshold
                .parse()
                .context("Invalid TRUSTGATE_BOT_SCORE_THRESHOLD value")?;
        }

        if let Ok(limit) = env::var("TRUSTGATE_SIGNUP_ATTEMPT_LIMIT") {
            config.risk.signup_attempt_limit = limit
                .parse()
                .context("Invalid TRUSTGATE_SIGNUP_ATTEMPT_LIMIT value")?;
        }

        if let Ok(window) = env::var("TRUSTGATE_SIGNUP_WINDOW_MINUTES") {
            config.risk.signup_window_minutes = window
                .parse()
                .context("Invalid TRUSTGATE_SIGNUP_WINDOW_MINUTES value")?;
        }

        Ok(config)
    }

    /// Load admin API keys from the environment. Comma-separated list in
    /// TRUSTGATE_ADMIN_API_KEYS, single key in TRUSTGATE_ADMIN_API_KEY.
    pub fn admin_api_keys() -> Vec<String> {
        let mut keys = Vec::new();

        if let Ok(key) = env::var("TRUSTGATE_ADMIN_API_KEY") {
            if !key.is_empty() {
                keys.push(key);
            }
        }

        if let Ok(extra) = env::var("TRUSTGATE_ADMIN_API_KEYS") {
            for key in extra.split(',') {
                let key = key.trim();
                if !key.is_empty() {
                    keys.push(key.to_string());
                }
            }
        }

        keys
    }
}
