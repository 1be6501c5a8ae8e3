//! Adsight - conversational analytics backend for graph-modeled advertising
//! data.

mod agents;
mod cli;
mod config;
mod error;
mod graph;
mod llm;
mod logging;
mod server;
mod workflow;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use cli::Cli;
use config::Config;
use graph::{HttpGraphConnector, MockGraphClient, MockGraphConnector};
use llm::LlmProvider;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment variables from .env take effect before config resolution.
    let _ = dotenvy::dotenv();
    logging::init();

    let cli = Cli::parse_args();
    let config = resolve_config(&cli)?;

    if !cli.mock && !config.schema_file.exists() {
        warn!(
            "Schema file '{}' does not exist; query generation will fail until it does",
            config.schema_file.display()
        );
    }

    let provider: LlmProvider = if cli.mock {
        LlmProvider::Mock
    } else {
        config
            .llm
            .provider
            .parse()
            .map_err(|e: String| error::AdsightError::config(e))?
    };

    let llm = llm::create_client(provider, config.llm.model.as_deref(), None)
        .context("Failed to create LLM client")?;

    let connector: Arc<dyn graph::GraphConnector> = if cli.mock {
        Arc::new(MockGraphConnector::new(MockGraphClient::new()))
    } else {
        Arc::new(HttpGraphConnector::new(config.graph.clone()))
    };

    info!(
        "Starting Adsight (provider: {}, graph: {}, schema: {})",
        provider,
        config.graph.display_string(),
        config.schema_file.display()
    );

    let state = AppState::new(&config, llm, connector);
    let app = server::build_app(state, &config.server.cors_origin)?;

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

/// Resolves the final configuration from the config file, environment and
/// CLI overrides (CLI wins).
fn resolve_config(cli: &Cli) -> error::Result<Config> {
    let config_path = cli.config_path();
    let mut config = Config::load_from_file(&config_path)?;

    config.graph.apply_env_defaults();

    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(schema_file) = &cli.schema_file {
        config.schema_file = schema_file.clone();
    }
    if let Some(provider) = &cli.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &cli.model {
        config.llm.model = Some(model.clone());
    }

    Ok(config)
}
