//! Transport error types.

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised by the listener or a per-request transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to bind the listen address.
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop stopped with an I/O error.
    #[error("Server error: {0}")]
    ServeError(#[source] std::io::Error),

    /// A transport or session was used outside its connected lifetime.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request body could not be read.
    #[error("Failed to read request body: {0}")]
    BodyError(String),
}

impl TransportError {
    /// Create a bind error.
    pub fn bind(address: impl Into<String>, source: std::io::Error) -> Self {
        Self::BindError {
            address: address.into(),
            source,
        }
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a body error.
    pub fn body(msg: impl Into<String>) -> Self {
        Self::BodyError(msg.into())
    }
}
