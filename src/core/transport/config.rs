//! Transport configuration types.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::config::PORT_VAR;

/// Default listen port for the HTTP transport.
pub const DEFAULT_PORT: u16 = 8787;

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path of the MCP endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_path() -> String {
    "/mcp".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: default_host(),
            rpc_path: default_rpc_path(),
        }
    }
}

impl HttpConfig {
    /// Create an HTTP transport config.
    pub fn new(port: u16, host: impl Into<String>) -> Self {
        Self {
            port,
            host: host.into(),
            ..Default::default()
        }
    }

    /// Load transport config from environment variables.
    pub fn from_env() -> Self {
        let port = match std::env::var(PORT_VAR) {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(
                    "Ignoring invalid {}={:?}, using {}",
                    PORT_VAR, raw, DEFAULT_PORT
                );
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };
        let host = std::env::var("MCP_HTTP_HOST").unwrap_or_else(|_| default_host());

        Self::new(port, host)
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        format!("HTTP on {}{}", self.address(), self.rpc_path)
    }
}
