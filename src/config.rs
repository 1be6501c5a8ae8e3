//! Configuration management for Adsight.
//!
//! Handles loading configuration from TOML files and environment variables,
//! covering the LLM provider, the graph store connection, and the server
//! binding.

use crate::error::{AdsightError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use url::Url;

/// Main configuration structure for Adsight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Graph store connection.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Server binding.
    #[serde(default)]
    pub server: ServerConfig,

    /// Path to the markdown file describing the graph schema.
    #[serde(default = "default_schema_file")]
    pub schema_file: PathBuf,
}

fn default_schema_file() -> PathBuf {
    PathBuf::from("graph_schema.md")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            graph: GraphConfig::default(),
            server: ServerConfig::default(),
            schema_file: default_schema_file(),
        }
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider: "openai", "anthropic", or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name (e.g., "gpt-4o"). Empty means the provider default.
    #[serde(default)]
    pub model: Option<String>,
}

fn default_provider() -> String {
    "openai".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
        }
    }
}

/// Graph store connection configuration.
///
/// The graph store is reached over its HTTP transactional query endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Base endpoint, e.g. "http://localhost:7474".
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Database name within the store.
    #[serde(default = "default_database")]
    pub database: String,

    /// Username for basic auth.
    pub user: Option<String>,

    /// Password for basic auth (not recommended to store in config).
    pub password: Option<String>,

    /// Ad platform the dataset was ingested from (e.g. "google",
    /// "facebook"). Stamped onto query results for the frontend.
    pub platform: Option<String>,
}

fn default_endpoint() -> String {
    "http://localhost:7474".to_string()
}

fn default_database() -> String {
    "neo4j".to_string()
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            database: default_database(),
            user: None,
            password: None,
            platform: None,
        }
    }
}

impl GraphConfig {
    /// Validates the endpoint URL and returns it parsed.
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| AdsightError::config(format!("Invalid graph endpoint: {e}")))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AdsightError::config(format!(
                "Invalid scheme '{}' for graph endpoint. Expected 'http' or 'https'",
                url.scheme()
            )));
        }

        Ok(url)
    }

    /// Applies environment variables as defaults for unset fields.
    ///
    /// Reads `GRAPH_ENDPOINT`, `GRAPH_DATABASE`, `GRAPH_USERNAME` and
    /// `GRAPH_PASSWORD`.
    pub fn apply_env_defaults(&mut self) {
        if self.endpoint == default_endpoint() {
            if let Ok(endpoint) = std::env::var("GRAPH_ENDPOINT") {
                self.endpoint = endpoint;
            }
        }
        if self.database == default_database() {
            if let Ok(database) = std::env::var("GRAPH_DATABASE") {
                self.database = database;
            }
        }
        if self.user.is_none() {
            self.user = std::env::var("GRAPH_USERNAME").ok();
        }
        if self.password.is_none() {
            self.password = std::env::var("GRAPH_PASSWORD").ok();
        }
    }

    /// Returns a display-safe string (no password) for log output.
    pub fn display_string(&self) -> String {
        format!("{} @ {}", self.database, self.endpoint)
    }
}

/// Server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origin for the web frontend.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl ServerConfig {
    /// Returns the socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("adsight")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default configuration; environment variables
    /// can still fill in the connection details.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AdsightError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            AdsightError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
