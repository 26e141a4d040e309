//! Scene refactor tool definition.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::domains::tools::handlers::{DeterministicHandler, build_result, dry_run_status};
use crate::domains::tools::registry::ToolSpec;
use crate::domains::tools::schema::{
    AuditResult, ToolArguments, default_dry_run,
};

fn default_steps() -> Vec<String> {
    vec![
        "remove_empty_groups".to_string(),
        "rebuild_navigation".to_string(),
    ]
}

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the scene refactor tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SceneRefactorParams {
    /// Scene (level/map) to refactor.
    pub scene: String,

    /// Refactor steps, in execution order.
    #[serde(default = "default_steps")]
    pub steps: Vec<String>,

    /// Plan the steps without applying them.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
}

impl ToolArguments for SceneRefactorParams {}

// ============================================================================
// Tool Definition
// ============================================================================

/// Scene refactor tool - runs ordered structural clean-up steps on a scene.
pub struct SceneRefactorTool;

impl SceneRefactorTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "scene_refactor";

    pub const TITLE: &'static str = "Scene Refactor";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Run ordered refactor steps (e.g. removing empty groups, rebuilding navigation) on a scene. Defaults to a dry run.";

    #[instrument(skip_all, fields(scene = %params.scene))]
    pub fn execute(params: &SceneRefactorParams) -> AuditResult {
        info!("Refactoring scene {} ({} step(s))", params.scene, params.steps.len());

        let verb = if params.dry_run { "planned" } else { "applied" };

        let summary = format!(
            "{} on {}: {} step(s) {}",
            Self::NAME,
            params.scene,
            params.steps.len(),
            verb
        );

        let details = params
            .steps
            .iter()
            .map(|step| format!("{}::{} {}", params.scene, step, verb))
            .collect();

        build_result(Self::NAME, dry_run_status(params.dry_run), summary, details)
    }

    pub fn spec() -> ToolSpec {
        ToolSpec::new::<SceneRefactorParams, AuditResult>(
            Self::NAME,
            Self::TITLE,
            Self::DESCRIPTION,
            DeterministicHandler::new(Self::execute),
        )
    }
}
