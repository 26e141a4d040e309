//! MCP Server implementation.
//!
//! An [`McpServer`] is the protocol-level handler bound to the tool registry.
//! A fresh instance is built for every inbound connection by the session
//! manager; the registry it dispatches into is shared and read-only.

use rmcp::{ErrorData as McpError, ServerHandler, model::*};
use std::sync::Arc;
use tracing::debug;

use super::config::Config;
use crate::domains::tools::{Dispatcher, ToolRegistry};

const INSTRUCTIONS: &str = "Nightshade exposes deterministic asset and scene editing tools for \
game-engine editors, plus xai_call for forwarding requests to the xAI API. Every tool result \
carries structuredContent and a text rendering of it.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Registry-bound tool dispatcher.
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Create a new MCP server bound to `registry`.
    pub fn new(config: Arc<Config>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(registry),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// List all available tools.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.dispatcher.list_tools()
    }

    /// Call a tool by name.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatcher.dispatch(name, arguments).await
    }

    /// Release the server. Consumes the handle so it cannot be used afterwards.
    pub fn close(self) {
        debug!("MCP server {} closed", self.name());
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        };
        info.server_info.name = self.name().to_string();
        info.server_info.version = self.version().to_string();
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> McpServer {
        let config = Config::default();
        let registry = ToolRegistry::builtin(&config).unwrap();
        McpServer::new(Arc::new(config), Arc::new(registry))
    }

    #[test]
    fn test_info_advertises_tools_only() {
        let info = server().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
        assert_eq!(info.server_info.name, "nightshade-mcp");
    }

    #[test]
    fn test_list_tools_in_registration_order() {
        let names: Vec<String> = server()
            .list_tools()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "bulk_edit_assets",
                "generate_variants",
                "normalize_dps",
                "prefab_audit",
                "scene_refactor",
                "xai_call",
            ]
        );
    }

    #[test]
    fn test_instances_share_registry() {
        let config = Arc::new(Config::default());
        let registry = Arc::new(ToolRegistry::builtin(&config).unwrap());
        let a = McpServer::new(config.clone(), registry.clone());
        let b = McpServer::new(config, registry.clone());
        assert_eq!(a.list_tools().len(), b.list_tools().len());
        assert_eq!(Arc::strong_count(&registry), 3);
    }

    #[tokio::test]
    async fn test_call_tool_through_server() {
        let args = serde_json::json!({ "target": "Sword" });
        let result = server()
            .call_tool("generate_variants", args.as_object().cloned())
            .await
            .unwrap();
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["affectedAssets"][0], "Sword_variant_1");
    }
}
