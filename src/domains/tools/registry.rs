//! Tool Registry - central registration of all tools.
//!
//! The registry is built once at startup in a fixed order and is read-only
//! afterwards, so it is shared behind an `Arc` by every session.

use std::collections::HashMap;
use std::sync::Arc;

use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::core::config::Config;

use super::definitions::{
    BulkEditTool, GenerateVariantsTool, NormalizeDpsTool, PrefabAuditTool, SceneRefactorTool,
    XaiCallTool,
};
use super::error::ToolError;
use super::handlers::ToolHandler;
use super::schema::{ToolArguments, conforms};

// ============================================================================
// Tool Spec
// ============================================================================

/// The registered description of one invocable tool.
#[derive(Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: Arc<JsonObject>,
    pub output_schema: Arc<JsonObject>,
    output_check: fn(&Value) -> Result<(), String>,
    handler: Arc<dyn ToolHandler>,
}

impl ToolSpec {
    /// Describe a tool taking `P` and producing `O`.
    pub fn new<P, O>(
        name: &'static str,
        title: &'static str,
        description: &'static str,
        handler: impl ToolHandler + 'static,
    ) -> Self
    where
        P: ToolArguments,
        O: JsonSchema + DeserializeOwned + 'static,
    {
        Self {
            name,
            title,
            description,
            input_schema: cached_schema_for_type::<P>(),
            output_schema: cached_schema_for_type::<O>(),
            output_check: conforms::<O>,
            handler: Arc::new(handler),
        }
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }

    /// Check a handler result against the declared output schema.
    pub fn check_output(&self, structured: &Value) -> Result<(), ToolError> {
        (self.output_check)(structured).map_err(|reason| ToolError::OutputMismatch {
            tool: self.name.to_string(),
            reason,
        })
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.into(),
            title: Some(self.title.into()),
            description: Some(self.description.into()),
            input_schema: self.input_schema.clone(),
            output_schema: Some(self.output_schema.clone()),
            annotations: None,
            icons: None,
            meta: None,
        }
    }
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry with every built-in tool.
    ///
    /// This is the single source of truth for the tool catalog.
    pub fn builtin(config: &Config) -> Result<Self, ToolError> {
        let mut registry = Self::new();
        registry.register(BulkEditTool::spec())?;
        registry.register(GenerateVariantsTool::spec())?;
        registry.register(NormalizeDpsTool::spec())?;
        registry.register(PrefabAuditTool::spec())?;
        registry.register(SceneRefactorTool::spec())?;
        registry.register(XaiCallTool::spec(&config.credentials)?)?;
        Ok(registry)
    }

    /// Add a tool. Names must be unique.
    pub fn register(&mut self, spec: ToolSpec) -> Result<(), ToolError> {
        if self.index.contains_key(spec.name) {
            return Err(ToolError::Duplicate(spec.name.to_string()));
        }
        debug!("Registered tool: {}", spec.name);
        self.index.insert(spec.name, self.tools.len());
        self.tools.push(spec);
        Ok(())
    }

    /// Find a tool by name.
    pub fn lookup(&self, name: &str) -> Result<&ToolSpec, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::not_found(name))
    }

    /// Get all tool names in registration order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name).collect()
    }

    /// Get all tools as Tool models, in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolSpec::to_tool).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
