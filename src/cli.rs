//! Command-line argument parsing for Adsight.

use clap::Parser;
use std::path::PathBuf;

/// Conversational analytics backend for graph-modeled advertising data.
#[derive(Parser, Debug)]
#[command(name = "adsight")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Host to bind (overrides config)
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to bind (overrides config)
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Path to the graph schema markdown file (overrides config)
    #[arg(long, value_name = "PATH", env = "ADSIGHT_SCHEMA_FILE")]
    pub schema_file: Option<PathBuf>,

    /// LLM provider to use (openai, anthropic, mock; overrides config)
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Model name (overrides config and provider default)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Run with mock LLM and mock graph clients (no credentials required)
    #[arg(long)]
    pub mock: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path, falling back to the platform default.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }
}
