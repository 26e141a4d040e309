//! MCP Server Entry Point
//!
//! Initializes logging, loads configuration, builds the tool registry, and
//! serves the MCP endpoint over HTTP until Ctrl-C.

use anyhow::Result;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use nightshade_mcp_server::core::config::XAI_API_KEY_VAR;
use nightshade_mcp_server::core::{Config, HttpTransport, SessionManager};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env();

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);
    match config.credentials.xai_api_key {
        Some(_) => info!("{} loaded from environment", XAI_API_KEY_VAR),
        None => warn!(
            "{} is not set; xai_call will return a structured error",
            XAI_API_KEY_VAR
        ),
    }

    let transport = HttpTransport::new(config.transport.clone());
    let sessions = SessionManager::from_config(config)?;

    info!(
        "Server initialized with {} tools: {}",
        sessions.registry().len(),
        sessions.registry().tool_names().join(", ")
    );

    transport.run(sessions).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// `MCP_LOG_LEVEL` sets the base level; `RUST_LOG` directives refine it.
/// Output goes to stderr.
fn init_logging(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();
}
