//! Configuration types and loading logic.

use std::collections::BTreeMap;

use ctxlog_tracing::TracingConfig;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tags: TagsConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Server listen configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

/// How requests are tagged.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsConfig {
    /// Tag key holding the request identifier.
    #[serde(default = "default_tag_key")]
    pub key: String,

    /// Request header an upstream caller may use to supply the identifier.
    /// The effective identifier is echoed back in the same header.
    #[serde(default = "default_tag_header")]
    pub header: String,

    /// Extra tags attached to every request.
    #[serde(default)]
    pub static_tags: BTreeMap<String, String>,
}

fn default_listen_address() -> String {
    "127.0.0.1:3090".to_string()
}

fn default_tag_key() -> String {
    "req_id".to_string()
}

fn default_tag_header() -> String {
    "x-request-id".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
        }
    }
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            key: default_tag_key(),
            header: default_tag_header(),
            static_tags: BTreeMap::new(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from TOML file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (CTXLOG_ prefix, __ for nesting)
    /// 2. TOML config file (optional)
    /// 3. Defaults
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("CTXLOG_").split("__"));
        Ok(Self::from_figment(figment)?)
    }

    fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }
}
