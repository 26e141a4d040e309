//! Transport layer for the MCP server.
//!
//! - **http**: the listener that routes requests to the MCP endpoint
//! - **streamable**: the sessionless per-request MCP transport
//! - **jsonrpc**: JSON-RPC 2.0 message types shared by both
//!
//! The listener hands each MCP request to the session manager, which builds
//! a fresh server and transport for it.

mod config;
mod error;
pub mod http;
pub mod jsonrpc;
pub mod streamable;

pub use config::{DEFAULT_PORT, HttpConfig};
pub use error::{TransportError, TransportResult};
pub use http::HttpTransport;
pub use streamable::{StreamableHttpTransport, internal_server_error};
