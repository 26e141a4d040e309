//! Dispatch core - validate, run, and normalize tool calls.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::error::ToolError;
use super::registry::ToolRegistry;

/// Dispatches tool calls against a read-only registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// List all available tools.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.registry.tools()
    }

    /// Call a tool by name.
    ///
    /// Returns a result carrying both `structuredContent` and a single text
    /// block. Unknown tools and invalid arguments become `invalid_params`
    /// errors; any other failure, including a panicking handler, becomes a
    /// generic internal error.
    #[instrument(skip(self, arguments), fields(tool = %name))]
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        match self.try_dispatch(name, arguments.unwrap_or_default()).await {
            Ok(result) => {
                info!("Tool {} completed", name);
                Ok(result)
            }
            Err(e) if e.is_caller_error() => {
                warn!("Rejected call to {}: {}", name, e);
                Err(e.to_mcp_error(name))
            }
            Err(e) => {
                error!("Tool {} failed: {}", name, e);
                Err(e.to_mcp_error(name))
            }
        }
    }

    async fn try_dispatch(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<CallToolResult, ToolError> {
        let spec = self.registry.lookup(name)?;

        let structured = AssertUnwindSafe(spec.handler().call(arguments))
            .catch_unwind()
            .await
            .map_err(|_| ToolError::internal(format!("handler for {} panicked", name)))??;

        spec.check_output(&structured)?;

        to_call_result(structured)
    }
}

/// Wrap a structured value in the dual-channel tool response.
fn to_call_result(structured: Value) -> Result<CallToolResult, ToolError> {
    let text =
        serde_json::to_string_pretty(&structured).map_err(|e| ToolError::internal(e.to_string()))?;

    Ok(CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(structured),
        is_error: Some(false),
        meta: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::domains::tools::handlers::ToolHandler;
    use crate::domains::tools::registry::ToolSpec;
    use crate::domains::tools::schema::{AuditResult, ToolArguments};
    use rmcp::model::RawContent;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(ToolRegistry::builtin(&Config::default()).unwrap()))
    }

    fn args(value: Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    #[derive(Deserialize, JsonSchema)]
    struct NoArgs {}

    impl ToolArguments for NoArgs {}

    struct Panicking;

    #[async_trait::async_trait]
    impl ToolHandler for Panicking {
        async fn call(&self, _arguments: JsonObject) -> Result<Value, ToolError> {
            panic!("handler exploded");
        }
    }

    struct WrongShape;

    #[async_trait::async_trait]
    impl ToolHandler for WrongShape {
        async fn call(&self, _arguments: JsonObject) -> Result<Value, ToolError> {
            Ok(json!({ "status": "ok" }))
        }
    }

    struct Failing;

    #[async_trait::async_trait]
    impl ToolHandler for Failing {
        async fn call(&self, _arguments: JsonObject) -> Result<Value, ToolError> {
            Err(ToolError::internal("secret internals"))
        }
    }

    fn dispatcher_with(name: &'static str, handler: impl ToolHandler + 'static) -> Dispatcher {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolSpec::new::<NoArgs, AuditResult>(name, "Test", "Test tool", handler))
            .unwrap();
        Dispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_dispatch_returns_structured_and_text() {
        let result = dispatcher()
            .dispatch("prefab_audit", args(json!({ "target": "WeaponAssets" })))
            .await
            .unwrap();

        let structured = result.structured_content.clone().unwrap();
        assert_eq!(structured["status"], "audited");
        assert_eq!(result.content.len(), 1);
        let text = match &result.content[0].raw {
            RawContent::Text(text) => text.text.clone(),
            _ => panic!("Expected text content"),
        };
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, structured);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let err = dispatcher().dispatch("does_not_exist", None).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("does_not_exist"));
    }

    #[tokio::test]
    async fn test_validation_error_surfaces_field() {
        let err = dispatcher()
            .dispatch("generate_variants", args(json!({ "target": "Sword", "count": 13 })))
            .await
            .unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("`count`"));
    }

    #[tokio::test]
    async fn test_missing_arguments_default_to_empty_bag() {
        let err = dispatcher().dispatch("scene_refactor", None).await.unwrap_err();
        assert!(err.message.contains("`scene`"));
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_internal_error() {
        let err = dispatcher_with("boom", Panicking)
            .dispatch("boom", None)
            .await
            .unwrap_err();
        assert_eq!(err.code.0, -32603);
        assert_eq!(err.message, "Internal error");
    }

    #[tokio::test]
    async fn test_output_schema_mismatch_is_internal_error() {
        let err = dispatcher_with("wrong", WrongShape)
            .dispatch("wrong", None)
            .await
            .unwrap_err();
        assert_eq!(err.code.0, -32603);
    }

    #[tokio::test]
    async fn test_handler_failure_does_not_leak() {
        let err = dispatcher_with("failing", Failing)
            .dispatch("failing", None)
            .await
            .unwrap_err();
        assert!(!err.message.contains("secret"));
    }
}
