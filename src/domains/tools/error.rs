//! Tool-specific error types.

use rmcp::ErrorData as McpError;
use thiserror::Error;

use super::schema::ValidationError;

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool {0} not found")]
    NotFound(String),

    /// A tool with the same name is already registered.
    #[error("Tool {0} is already registered")]
    Duplicate(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(#[from] ValidationError),

    /// The handler produced a result that does not match its output schema.
    #[error("Output of {tool} does not match its output schema: {reason}")]
    OutputMismatch { tool: String, reason: String },

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is safe to show to the caller verbatim.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidArguments(_))
    }

    /// Convert into the protocol error returned to the client.
    ///
    /// Caller errors keep their message; everything else collapses into a
    /// generic internal error so handler internals never leak.
    pub fn to_mcp_error(&self, tool: &str) -> McpError {
        match self {
            Self::NotFound(name) => McpError::invalid_params(format!("Tool {} not found", name), None),
            Self::InvalidArguments(e) => McpError::invalid_params(
                format!("Invalid arguments for tool {}: {}", tool, e),
                Some(serde_json::json!({ "field": e.field, "reason": e.reason })),
            ),
            _ => McpError::internal_error("Internal error", None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors_keep_message() {
        let err = ToolError::not_found("missing_tool").to_mcp_error("missing_tool");
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("missing_tool"));
    }

    #[test]
    fn test_handler_errors_are_generic() {
        let err = ToolError::internal("db password is hunter2").to_mcp_error("bulk_edit_assets");
        assert_eq!(err.code.0, -32603);
        assert_eq!(err.message, "Internal error");
    }

    #[test]
    fn test_validation_error_names_field() {
        let err: ToolError = ValidationError::missing("target").into();
        assert!(err.is_caller_error());
        let mcp = err.to_mcp_error("prefab_audit");
        assert!(mcp.message.contains("`target`"));
        assert!(mcp.message.contains("prefab_audit"));
    }
}
