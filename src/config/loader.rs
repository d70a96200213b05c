//! Load `Config` from environment variables, each with a default.
//!
//! Empty variables count as unset. A numeric variable that is set but does not
//! parse is an error: bad deployment config should stop startup, unlike bad
//! request parameters, which are ignored.

use super::types::{Config, DatabaseConfig, PoolConfig};
use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_TABLE: &str = "rets_property";

impl Config {
    /// Read from the process environment. Call `dotenvy::dotenv()` beforehand to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let pool_defaults = PoolConfig::default();
        Ok(Config {
            port: env.parsed("PORT", DEFAULT_PORT)?,
            environment: env.string("ENVIRONMENT", DEFAULT_ENVIRONMENT),
            frontend_url: env.string("FRONTEND_URL", DEFAULT_FRONTEND_URL),
            database: DatabaseConfig {
                host: env.string("DB_HOST", "localhost"),
                port: env.parsed("DB_PORT", 5432)?,
                user: env.string("DB_USER", "postgres"),
                password: env.string("DB_PASSWORD", ""),
                name: env.string("DB_NAME", "listings"),
                url: env.get("DATABASE_URL"),
                table: env.string("LISTINGS_TABLE", DEFAULT_TABLE),
                pool: PoolConfig {
                    max_connections: env.parsed("DB_MAX_CONNECTIONS", pool_defaults.max_connections)?,
                    min_connections: env.parsed("DB_MIN_CONNECTIONS", pool_defaults.min_connections)?,
                    max_lifetime: env.secs("DB_MAX_LIFETIME_SECS", pool_defaults.max_lifetime)?,
                    idle_timeout: env.secs("DB_IDLE_TIMEOUT_SECS", pool_defaults.idle_timeout)?,
                    acquire_timeout: env.secs("DB_ACQUIRE_TIMEOUT_SECS", pool_defaults.acquire_timeout)?,
                },
            },
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value: raw }),
        }
    }

    fn secs(&self, key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        self.parsed(key, default.as_secs()).map(Duration::from_secs)
    }
}
