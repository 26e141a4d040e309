//! Bulk edit tool definition.
//!
//! Applies a set of field modifications to every asset under a target.

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::domains::tools::handlers::{DeterministicHandler, build_result, dry_run_status};
use crate::domains::tools::registry::ToolSpec;
use crate::domains::tools::schema::{
    AuditResult, ToolArguments, default_dry_run,
};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the bulk edit tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BulkEditParams {
    /// Asset folder or collection to edit.
    pub target: String,

    /// Field name to new value.
    #[serde(default)]
    pub modifications: JsonObject,

    /// Preview the edit without applying it.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
}

impl ToolArguments for BulkEditParams {}

// ============================================================================
// Tool Definition
// ============================================================================

/// Bulk edit tool - sets fields across a target's assets.
pub struct BulkEditTool;

impl BulkEditTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "bulk_edit_assets";

    pub const TITLE: &'static str = "Bulk Edit Assets";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Apply field modifications to every asset under a target. Defaults to a dry run that only reports the planned changes.";

    #[instrument(skip_all, fields(target = %params.target))]
    pub fn execute(params: &BulkEditParams) -> AuditResult {
        info!(
            "Bulk edit of {} field(s) on {}",
            params.modifications.len(),
            params.target
        );

        let summary = format!(
            "{} on {}: {} field(s){}",
            Self::NAME,
            params.target,
            params.modifications.len(),
            if params.dry_run { " (dry run)" } else { "" }
        );

        let details = params
            .modifications
            .iter()
            .map(|(field, value)| format!("{}.{} = {}", params.target, field, value))
            .collect();

        build_result(Self::NAME, dry_run_status(params.dry_run), summary, details)
    }

    pub fn spec() -> ToolSpec {
        ToolSpec::new::<BulkEditParams, AuditResult>(
            Self::NAME,
            Self::TITLE,
            Self::DESCRIPTION,
            DeterministicHandler::new(Self::execute),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
