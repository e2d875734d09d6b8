use crate::app_config::{AppConfig, Environment};
use crate::itinerary::UnknownLocationPolicy;
use crate::ConfigError;

pub const DEFAULT_CATALOG_PATH: &str = "./config/catalog.yaml";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Catalog location for commands that do not need the full config.
///
/// Reads `TOURDESK_CATALOG_PATH`, falling back to [`DEFAULT_CATALOG_PATH`].
#[must_use]
pub fn catalog_path_from_env() -> std::path::PathBuf {
    std::env::var("TOURDESK_CATALOG_PATH")
        .map_or_else(|_| DEFAULT_CATALOG_PATH.into(), std::path::PathBuf::from)
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("TOURDESK_ENV", "development"))?;

    let bind_addr: SocketAddr = parse_as(
        "TOURDESK_BIND_ADDR",
        &or_default("TOURDESK_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("TOURDESK_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("TOURDESK_CATALOG_PATH", DEFAULT_CATALOG_PATH));

    let db_max_connections: u32 = parse_as(
        "TOURDESK_DB_MAX_CONNECTIONS",
        &or_default("TOURDESK_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_as(
        "TOURDESK_DB_MIN_CONNECTIONS",
        &or_default("TOURDESK_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_as(
        "TOURDESK_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("TOURDESK_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let unknown_location_policy: UnknownLocationPolicy = parse_as(
        "TOURDESK_UNKNOWN_LOCATION_POLICY",
        &or_default("TOURDESK_UNKNOWN_LOCATION_POLICY", "reject"),
    )?;

    let rate_limit_per_minute: usize = parse_as(
        "TOURDESK_RATE_LIMIT_PER_MINUTE",
        &or_default("TOURDESK_RATE_LIMIT_PER_MINUTE", "120"),
    )?;
    if rate_limit_per_minute == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TOURDESK_RATE_LIMIT_PER_MINUTE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        catalog_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        unknown_location_policy,
        rate_limit_per_minute,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TOURDESK_ENV".to_string(),
            reason: format!("expected development, test, or production, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
