//! Runtime configuration.
//!
//! Values come from an optional YAML file and are overridden by environment
//! variables prefixed with `APP_`, nested keys joined by `__`
//! (`APP_TOKEN_CONFIGURATION__EXPIRE_HOURS=2`).

use std::fmt::{Debug, Formatter};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

/// Default location of the YAML configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("configuration value `{0}` must not be empty")]
    MissingValue(&'static str),
    #[error("invalid token lifetime `{0}`: expected a positive number of hours")]
    InvalidTokenLifetime(String),
}

#[derive(Clone, Deserialize)]
pub struct JwtSettings {
    pub key: String,
}

impl Debug for JwtSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings").field("key", &"***").finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfiguration {
    pub issuer: String,
    pub audience: String,
    /// Lifetime in hours, kept as text and parsed by the token issuer.
    pub expire_hours: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub jwt: JwtSettings,
    pub token_configuration: TokenConfiguration,
}

/// Everything the token issuer needs, gathered from two config sections.
#[derive(Clone)]
pub struct TokenSettings {
    pub key: String,
    pub issuer: String,
    pub audience: String,
    pub expire_hours: String,
}

impl Debug for TokenSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("key", &"***")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expire_hours", &self.expire_hours)
            .finish()
    }
}

impl Settings {
    /// Load `path` (if it exists) and apply environment overrides.
    pub fn load(path: &str) -> Result<Self, ConfigurationError> {
        let settings = Config::builder()
            .add_source(File::new(path, FileFormat::Yaml).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        if settings.database_url.trim().is_empty() {
            return Err(ConfigurationError::MissingValue("database_url"));
        }
        Ok(settings)
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            key: self.jwt.key.clone(),
            issuer: self.token_configuration.issuer.clone(),
            audience: self.token_configuration.audience.clone(),
            expire_hours: self.token_configuration.expire_hours.clone(),
        }
    }
}
