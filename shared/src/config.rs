//! Configuration management for Lambda functions.

use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Parameter Store name of the default user pool JWKS URL
    pub default_jwks_param: String,
    /// Parameter Store name of the default settings document
    pub default_settings_param: String,
    /// Parameter Store name of the custom settings document
    pub custom_settings_param: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            default_jwks_param: env::var("DEFAULT_USER_POOL_JWKS_PARAM")?,
            default_settings_param: env::var("DEFAULT_SETTINGS_PARAM")?,
            custom_settings_param: env::var("CUSTOM_SETTINGS_PARAM")?,
        })
    }
}
