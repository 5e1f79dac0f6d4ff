use std::{env, str::FromStr};

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "posts.db";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5002;
const DEFAULT_SESSION_TTL: u64 = 3600;
const DEFAULT_POOL_SIZE: u32 = 8;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Environment variable '{0}' not set")]
    Missing(&'static str),
    #[error("Environment variable '{key}' has an invalid value: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Process settings, read from the environment after `.env` has been loaded.
///
/// | variable | default |
/// |---|---|
/// | `DATABASE_URL` | `posts.db` |
/// | `REDIS_URL` | unset, sessions stay in memory |
/// | `SUPER_ADMIN_EMAIL` | required |
/// | `HOST` | `127.0.0.1` |
/// | `PORT` | `5002` |
/// | `SESSION_TTL_SECS` | `3600` |
/// | `DATABASE_POOL_SIZE` | `8` |
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub super_admin_email: String,
    pub host: String,
    pub port: u16,
    pub session_ttl: u64,
    pub pool_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Config {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            redis_url: get("REDIS_URL"),
            super_admin_email: get("SUPER_ADMIN_EMAIL")
                .map(|email| email.trim().to_string())
                .ok_or(ConfigError::Missing("SUPER_ADMIN_EMAIL"))?,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT)?,
            session_ttl: parse_nonzero(get("SESSION_TTL_SECS"), "SESSION_TTL_SECS", DEFAULT_SESSION_TTL)?,
            pool_size: parse_nonzero(get("DATABASE_POOL_SIZE"), "DATABASE_POOL_SIZE", DEFAULT_POOL_SIZE)?,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Like [`parse_or`], for counts where zero would leave the server unusable
fn parse_nonzero<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
{
    let value = parse_or(raw, key, default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
        });
    }
    Ok(value)
}
