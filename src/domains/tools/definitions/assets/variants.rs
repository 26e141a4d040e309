//! Generate variants tool definition.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::domains::tools::handlers::{DeterministicHandler, build_result};
use crate::domains::tools::registry::ToolSpec;
use crate::domains::tools::schema::{AuditResult, ToolArguments, ValidationError};

/// Inclusive bounds for the number of variants.
pub const MIN_VARIANTS: u32 = 1;
pub const MAX_VARIANTS: u32 = 12;

fn default_count() -> u32 {
    3
}

fn default_constraints() -> Vec<String> {
    vec![
        "naming_conventions".to_string(),
        "balance_budget".to_string(),
    ]
}

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the generate variants tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GenerateVariantsParams {
    /// Base asset to derive variants from.
    pub target: String,

    /// How many variants to generate (1-12).
    #[serde(default = "default_count")]
    #[schemars(range(min = 1, max = 12))]
    pub count: u32,

    /// Constraints every variant must respect.
    #[serde(default = "default_constraints")]
    pub constraints: Vec<String>,
}

impl ToolArguments for GenerateVariantsParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_VARIANTS..=MAX_VARIANTS).contains(&self.count) {
            return Err(ValidationError::out_of_range(
                "count",
                format_args!("an integer between {} and {}", MIN_VARIANTS, MAX_VARIANTS),
                &self.count.into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Generate variants tool - derives numbered variants of a base asset.
pub struct GenerateVariantsTool;

impl GenerateVariantsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "generate_variants";

    pub const TITLE: &'static str = "Generate Variants";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Generate 1-12 numbered variants of a base asset that respect the given constraints.";

    #[instrument(skip_all, fields(target = %params.target, count = params.count))]
    pub fn execute(params: &GenerateVariantsParams) -> AuditResult {
        info!("Generating {} variant(s) of {}", params.count, params.target);

        let constraints = if params.constraints.is_empty() {
            "no constraints".to_string()
        } else {
            params.constraints.join(", ")
        };

        let summary = format!(
            "{} on {}: {} variant(s)",
            Self::NAME,
            params.target,
            params.count
        );

        let details = (1..=params.count)
            .map(|i| format!("{}_variant_{} respecting {}", params.target, i, constraints))
            .collect();

        build_result(Self::NAME, "generated", summary, details)
    }

    pub fn spec() -> ToolSpec {
        ToolSpec::new::<GenerateVariantsParams, AuditResult>(
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
