//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::{DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
use crate::invoice::DEFAULT_MAX_ATTEMPTS;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lifetime of a cached order fetch, in seconds
    pub cache_ttl: u64,
    /// Interval between cache sweeps, in seconds
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// SQLite URL for the invoice table; in-memory store when unset
    pub database_url: Option<String>,
    /// Root of the sales-order API; order endpoints answer 503 when unset
    pub order_api_url: Option<String>,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Attempts per invoice allocation before giving up on conflicts
    pub allocation_attempts: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL` - Cache entry lifetime in seconds (default: 3600)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DATABASE_URL` - e.g. `sqlite://invoices.db` (default: unset)
    /// - `ORDER_API_URL` - e.g. `https://api.tradevine.com/v1` (default: unset)
    /// - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
    /// - `ALLOCATION_ATTEMPTS` - Conflict retries per allocation (default: 3)
    ///
    /// Durations, pool size and attempts must be positive; zero falls back
    /// to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cache_ttl: positive_env_or("CACHE_TTL", defaults.cache_ttl),
            sweep_interval: positive_env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            database_url: non_empty_env("DATABASE_URL"),
            order_api_url: non_empty_env("ORDER_API_URL"),
            db_max_connections: positive_env_or(
                "DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            ),
            allocation_attempts: positive_env_or(
                "ALLOCATION_ATTEMPTS",
                defaults.allocation_attempts,
            ),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn positive_env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Default + PartialEq + Copy + std::fmt::Display,
{
    let value = env_or(name, default);
    if value == T::default() {
        warn!("{} must be positive, using default {}", name, default);
        return default;
    }
    value
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_TTL.as_secs(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL.as_secs(),
            server_port: 3000,
            database_url: None,
            order_api_url: None,
            db_max_connections: 5,
            allocation_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_ttl, 3600);
        assert_eq!(config.sweep_interval, 300);
        assert_eq!(config.server_port, 3000);
        assert!(config.database_url.is_none());
        assert!(config.order_api_url.is_none());
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.allocation_attempts, 3);
    }

    #[test]
    fn test_config_durations() {
        let config = Config::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(60 * 60));
        assert_eq!(config.sweep_interval(), Duration::from_secs(5 * 60));
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("INVOICE_DESK_TEST_PORT", "not-a-number");
        assert_eq!(env_or::<u16>("INVOICE_DESK_TEST_PORT", 3000), 3000);

        env::set_var("INVOICE_DESK_TEST_PORT", "8080");
        assert_eq!(env_or::<u16>("INVOICE_DESK_TEST_PORT", 3000), 8080);

        env::remove_var("INVOICE_DESK_TEST_PORT");
        assert_eq!(env_or::<u16>("INVOICE_DESK_TEST_PORT", 3000), 3000);
    }

    #[test]
    fn test_zero_falls_back_to_default() {
        env::set_var("INVOICE_DESK_TEST_INTERVAL", "0");
        assert_eq!(positive_env_or::<u64>("INVOICE_DESK_TEST_INTERVAL", 300), 300);

        env::set_var("INVOICE_DESK_TEST_INTERVAL", "15");
        assert_eq!(positive_env_or::<u64>("INVOICE_DESK_TEST_INTERVAL", 300), 15);

        env::remove_var("INVOICE_DESK_TEST_INTERVAL");
        assert_eq!(positive_env_or::<u64>("INVOICE_DESK_TEST_INTERVAL", 300), 300);
    }

    #[test]
    fn test_from_env_rejects_zero_intervals() {
        env::set_var("CACHE_TTL", "0");
        env::set_var("SWEEP_INTERVAL", "0");
        env::set_var("DB_MAX_CONNECTIONS", "0");

        let config = Config::from_env();

        env::remove_var("CACHE_TTL");
        env::remove_var("SWEEP_INTERVAL");
        env::remove_var("DB_MAX_CONNECTIONS");

        assert_eq!(config.cache_ttl(), DEFAULT_TTL);
        assert_eq!(config.sweep_interval(), DEFAULT_SWEEP_INTERVAL);
        assert_eq!(config.db_max_connections, 5);
    }

    #[test]
    fn test_blank_urls_are_unset() {
        env::set_var("INVOICE_DESK_TEST_URL", "   ");
        assert!(non_empty_env("INVOICE_DESK_TEST_URL").is_none());

        env::set_var("INVOICE_DESK_TEST_URL", "http://localhost:9000/v1");
        assert_eq!(
            non_empty_env("INVOICE_DESK_TEST_URL").as_deref(),
            Some("http://localhost:9000/v1")
        );
        env::remove_var("INVOICE_DESK_TEST_URL");
    }
}
