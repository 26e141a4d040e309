//! Prefab audit tool definition.
//!
//! Runs a list of named checks over the prefabs under a target.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::domains::tools::handlers::{DeterministicHandler, build_result};
use crate::domains::tools::registry::ToolSpec;
use crate::domains::tools::schema::{AuditResult, ToolArguments};

fn default_checks() -> Vec<String> {
    ["naming", "collision", "performance"]
        .into_iter()
        .map(String::from)
        .collect()
}

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the prefab audit tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PrefabAuditParams {
    /// Prefab folder or collection to audit.
    pub target: String,

    /// Checks to run, in order.
    #[serde(default = "default_checks")]
    pub checks: Vec<String>,
}

impl ToolArguments for PrefabAuditParams {}

// ============================================================================
// Tool Definition
// ============================================================================

/// Prefab audit tool - reports one line per check.
pub struct PrefabAuditTool;

impl PrefabAuditTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "prefab_audit";

    pub const TITLE: &'static str = "Prefab Audit";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Audit the prefabs under a target for naming, collision, and performance issues. Read-only.";

    #[instrument(skip_all, fields(target = %params.target))]
    pub fn execute(params: &PrefabAuditParams) -> AuditResult {
        info!("Auditing {} with {} check(s)", params.target, params.checks.len());

        let summary = format!(
            "{} on {}: {} check(s)",
            Self::NAME,
            params.target,
            params.checks.len()
        );

        let details = params
            .checks
            .iter()
            .map(|check| format!("{}:{} passed", params.target, check))
            .collect();

        build_result(Self::NAME, "audited", summary, details)
    }

    pub fn spec() -> ToolSpec {
        ToolSpec::new::<PrefabAuditParams, AuditResult>(
            Self::NAME,
            Self::TITLE,
            Self::DESCRIPTION,
            DeterministicHandler::new(Self::execute),
        )
    }
}
