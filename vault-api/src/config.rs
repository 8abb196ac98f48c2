//! Startup configuration, read once from the environment.

use envelope_vault::{EnvelopeError, MasterKey};
use std::fmt;

pub const MASTER_KEY_VAR: &str = "VAULT_MASTER_KEY";
pub const PORT_VAR: &str = "VAULT_PORT";
pub const LOG_FORMAT_VAR: &str = "VAULT_LOG_FORMAT";
pub const MAX_BODY_VAR: &str = "VAULT_MAX_BODY_BYTES";
pub const RATE_RPS_VAR: &str = "VAULT_RATE_LIMIT_RPS";
pub const RATE_BURST_VAR: &str = "VAULT_RATE_LIMIT_BURST";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
pub const DEFAULT_RATE_RPS: f64 = 20.0;
pub const DEFAULT_RATE_BURST: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Anything other than `json` falls back to pretty output.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(LOG_FORMAT_VAR).as_deref().map(str::trim) {
            Some("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingMasterKey,
    InvalidMasterKey(EnvelopeError),
    InvalidValue { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMasterKey => write!(f, "{} is not set", MASTER_KEY_VAR),
            Self::InvalidMasterKey(e) => write!(
                f,
                "{} must be 64 hex characters (32 bytes): {}",
                MASTER_KEY_VAR, e
            ),
            Self::InvalidValue { name, value } => write!(f, "invalid {}: {:?}", name, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug)]
pub struct Config {
    pub master_key: MasterKey,
    pub port: u16,
    pub max_body_bytes: usize,
    pub rate_limit_rps: f64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let master_key = match lookup(MASTER_KEY_VAR) {
            Some(text) if !text.trim().is_empty() => {
                MasterKey::from_hex(&text).map_err(ConfigError::InvalidMasterKey)?
            }
            _ => return Err(ConfigError::MissingMasterKey),
        };

        let port = parse_or(&lookup, PORT_VAR, DEFAULT_PORT)?;
        let max_body_bytes = parse_or(&lookup, MAX_BODY_VAR, DEFAULT_MAX_BODY_BYTES)?;
        let rate_limit_rps: f64 = parse_or(&lookup, RATE_RPS_VAR, DEFAULT_RATE_RPS)?;
        let rate_limit_burst = parse_or(&lookup, RATE_BURST_VAR, DEFAULT_RATE_BURST)?;

        if max_body_bytes == 0 {
            return Err(invalid(MAX_BODY_VAR, "0"));
        }
        if !rate_limit_rps.is_finite() || rate_limit_rps <= 0.0 {
            return Err(invalid(RATE_RPS_VAR, &rate_limit_rps.to_string()));
        }
        if rate_limit_burst == 0 {
            return Err(invalid(RATE_BURST_VAR, "0"));
        }

        Ok(Self {
            master_key,
            port,
            max_body_bytes,
            rate_limit_rps,
            rate_limit_burst,
        })
    }
}

fn invalid(name: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| invalid(name, &raw)),
    }
}
