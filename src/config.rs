use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Hyperbrowser API
    pub api_key: String,
    pub api_url: String,

    // Web Server
    pub web_host: String,
    pub web_port: u16,

    // Screenshot storage
    pub screenshot_dir: PathBuf,
    pub retention_max_age: Duration,

    // Result cache
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `HYPERBROWSER_API_KEY` is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Hyperbrowser API
            api_key: required_env("HYPERBROWSER_API_KEY")?,
            api_url: env_or_default("HYPERBROWSER_API_URL", "https://app.hyperbrowser.ai"),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 5000)?,

            // Screenshot storage
            screenshot_dir: PathBuf::from(env_or_default("SCREENSHOT_DIR", "static/screenshots")),
            retention_max_age: Duration::from_secs(parse_env_u64("RETENTION_MAX_AGE_SECS", 3600)?),

            // Result cache
            cache_ttl: Duration::from_secs(parse_env_u64("CACHE_TTL_SECS", 3600)?),
            cache_max_entries: parse_env_usize("CACHE_MAX_ENTRIES", 100)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "HYPERBROWSER_API_KEY".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.api_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "HYPERBROWSER_API_URL".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.cache_max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                name: "CACHE_MAX_ENTRIES".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_default_uses_default() {
        assert_eq!(env_or_default("HYPERCAP_NONEXISTENT_VAR", "fallback"), "fallback");
    }

    #[test]
    fn test_parse_env_u64_default() {
        assert_eq!(parse_env_u64("HYPERCAP_NONEXISTENT_VAR", 3600).unwrap(), 3600);
    }

    #[test]
    fn test_validate_rejects_zero_cache_capacity() {
        let config = Config {
            api_key: "key".to_string(),
            api_url: "https://app.hyperbrowser.ai".to_string(),
            web_host: "127.0.0.1".to_string(),
            web_port: 5000,
            screenshot_dir: PathBuf::from("static/screenshots"),
            retention_max_age: Duration::from_secs(3600),
            cache_ttl: Duration::from_secs(3600),
            cache_max_entries: 0,
        };
        assert!(config.validate().is_err());
    }
}
