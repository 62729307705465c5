use std::env;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("environment variable {0} must not be empty")]
    Empty(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// From `DATABASE_URL`, or assembled field by field from `DB_*`
    pub database: PgConnectOptions,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub redis_url: Option<String>,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Empty("JWT_SECRET"));
        }

        let database = match lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            Some(url) => url.parse::<PgConnectOptions>().map_err(|e| ConfigError::Invalid {
                name: "DATABASE_URL",
                value: e.to_string(),
            })?,
            None => database_from_parts(&lookup)?,
        };

        Ok(Config {
            database,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            jwt_secret,
            redis_url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
            rate_limit_window_secs: parse_or(&lookup, "RATE_LIMIT_WINDOW", 60)?,
            rate_limit_requests: parse_or(&lookup, "RATE_LIMIT_REQUESTS", 20)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_or(&lookup, "PORT", 8080)?,
        })
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

// Credentials go through the builder, so they need no URL escaping.
fn database_from_parts<F>(lookup: &F) -> Result<PgConnectOptions, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("DB_HOST").ok_or(ConfigError::Missing("DB_HOST"))?;
    let port = parse_or(lookup, "DB_PORT", 5432)?;
    let user = lookup("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
    let name = lookup("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;

    let options = PgConnectOptions::new_without_pgpass()
        .host(&host)
        .port(port)
        .username(&user)
        .database(&name)
        .ssl_mode(PgSslMode::Disable);

    Ok(match lookup("DB_PASSWORD").filter(|pw| !pw.is_empty()) {
        Some(password) => options.password(&password),
        None => options,
    })
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
