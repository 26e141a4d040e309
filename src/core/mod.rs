//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the MCP server,
//! including error handling, configuration, the per-connection session
//! lifecycle, and the HTTP transport layer.

pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use server::McpServer;
pub use session::{Session, SessionManager, SessionState, SessionStats};
pub use transport::{HttpConfig, HttpTransport};
