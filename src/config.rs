//! TOML configuration, loaded once at startup and passed by reference into
//! every component that needs it. There is no ambient global configuration.
//!
//! Secrets can be supplied or overridden through `CCS_*` environment
//! variables so they stay out of the config file in deployments.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub search: SearchBackendConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Connection settings for the OpenSearch backend.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchBackendConfig {
    pub endpoint: String,
    pub index: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// `basic` (username/password) or `noauth` (unauthenticated, accepts
    /// self-signed certificates; local development only).
    #[serde(default = "default_client_mode")]
    pub client_mode: String,
}

fn default_client_mode() -> String {
    "basic".to_string()
}

/// Bearer tokens for the HTTP API. An empty key disables the corresponding
/// routes (requests fail with a server error rather than passing unchecked).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub admin_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    apply_env_overrides(&mut config);

    if config.search.endpoint.is_empty() {
        anyhow::bail!("search.endpoint must be set");
    }
    if config.search.index.is_empty() {
        anyhow::bail!("search.index must be set");
    }

    match config.search.client_mode.as_str() {
        "noauth" => {}
        "basic" => {
            if config.search.username.is_empty() || config.search.password.is_empty() {
                anyhow::bail!(
                    "search.username and search.password are required for basic client mode"
                );
            }
        }
        other => anyhow::bail!(
            "Unknown client mode: '{}'. Must be basic or noauth.",
            other
        ),
    }

    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    let overrides: [(&str, &mut String); 8] = [
        ("CCS_OS_ENDPOINT", &mut config.search.endpoint),
        ("CCS_OS_INDEX", &mut config.search.index),
        ("CCS_OS_USER", &mut config.search.username),
        ("CCS_OS_PASSWORD", &mut config.search.password),
        ("CCS_OS_CLIENT_MODE", &mut config.search.client_mode),
        ("CCS_API_KEY", &mut config.api.key),
        ("CCS_ADMIN_API_KEY", &mut config.api.admin_key),
        ("CCS_BIND", &mut config.server.bind),
    ];
    for (name, slot) in overrides {
        if let Ok(value) = std::env::var(name) {
            if !value.is_empty() {
                *slot = value;
            }
        }
    }
}
