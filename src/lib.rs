//! Nightshade MCP Server Library
//!
//! An MCP server exposing deterministic asset and scene editing tools to
//! game-engine editor plugins, plus an outbound call tool for the xAI API.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the protocol server, the
//!   per-connection session lifecycle, and the HTTP transport
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: the tool registry, argument schemas, and dispatch
//!
//! # Example
//!
//! ```rust,no_run
//! use nightshade_mcp_server::core::{Config, HttpTransport, SessionManager};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let transport = HttpTransport::new(config.transport.clone());
//!     let sessions = SessionManager::from_config(config)?;
//!     transport.run(sessions).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result, SessionManager};
