//! Configuration module for the YLT backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::{Credentials, LockoutPolicy};
use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite file backing the key-value store
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// The single account accepted by the login endpoint
    pub credentials: Credentials,
    /// Failed-attempt threshold and lock duration
    pub lockout: LockoutPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("YLT_DB_PATH")
            .unwrap_or_else(|_| "./data/ylt.sqlite".to_string())
            .into();

        let bind_addr = env::var("YLT_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::Validation(format!("Invalid YLT_BIND_ADDR format: {}", e)))?;

        let log_level = env::var("YLT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let credentials = Credentials {
            email: env::var("YLT_ADMIN_EMAIL").unwrap_or_else(|_| "admin@ylt.local".to_string()),
            password: env::var("YLT_ADMIN_PASSWORD").ok(),
        };

        let defaults = LockoutPolicy::default();
        let lockout = LockoutPolicy {
            max_attempts: parse_or("YLT_LOCKOUT_MAX_ATTEMPTS", defaults.max_attempts),
            duration: Duration::from_secs(parse_or(
                "YLT_LOCKOUT_SECONDS",
                defaults.duration.as_secs(),
            )),
        };

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            credentials,
            lockout,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
