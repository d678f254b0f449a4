use std::env;
use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_EMAIL_DOMAIN: &str = "lion.lmu.edu";
const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    /// Base URL of the hosted project; auth lives under `/auth/v1`.
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub allowed_email_domain: String,
    /// Calendar used for "today"/"tomorrow" chat answers.
    pub timezone: Tz,
    pub refresh_interval: Duration,
    pub geocoder_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/plot".to_string(),
            db_max_connections: 5,
            port: 3001,
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: String::new(),
            allowed_email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            timezone: DEFAULT_TIMEZONE,
            refresh_interval: Duration::from_secs(60),
            geocoder_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: parse_nonzero("DB_MAX_CONNECTIONS", "a positive integer")?
                .unwrap_or(defaults.db_max_connections),
            port: parse_var("PORT", "a port number")?.unwrap_or(defaults.port),
            supabase_url: env::var("SUPABASE_URL").unwrap_or(defaults.supabase_url),
            supabase_anon_key: env::var("SUPABASE_ANON_KEY").unwrap_or(defaults.supabase_anon_key),
            allowed_email_domain: env::var("ALLOWED_EMAIL_DOMAIN")
                .unwrap_or(defaults.allowed_email_domain),
            timezone: parse_var("PLOT_TIMEZONE", "an IANA time zone name")?
                .unwrap_or(defaults.timezone),
            refresh_interval: parse_nonzero::<u64>("EVENT_REFRESH_SECS", "a positive number of seconds")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.refresh_interval),
            geocoder_url: env::var("GEOCODER_URL").ok().filter(|v| !v.trim().is_empty()),
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// Like `parse_var`, but zero is rejected.
fn parse_nonzero<T>(name: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr + Default + PartialEq,
{
    match parse_var::<T>(name, expected)? {
        Some(value) if value == T::default() => Err(ConfigError::Invalid {
            name,
            expected,
            value: env::var(name).unwrap_or_default(),
        }),
        parsed => Ok(parsed),
    }
}
