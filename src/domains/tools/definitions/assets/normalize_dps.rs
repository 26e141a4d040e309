//! Normalize DPS tool definition.
//!
//! Rebalances damage-per-second values under a target toward a goal value,
//! accepting anything inside a tolerance window.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::domains::tools::handlers::{DeterministicHandler, build_result, dry_run_status};
use crate::domains::tools::registry::ToolSpec;
use crate::domains::tools::schema::{
    AuditResult, ToolArguments, ValidationError, default_dry_run,
};

pub const MIN_TOLERANCE: f64 = 0.0;
pub const MAX_TOLERANCE: f64 = 10.0;

fn default_target_dps() -> f64 {
    25.0
}

fn default_tolerance() -> f64 {
    2.0
}

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the normalize DPS tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NormalizeDpsParams {
    /// Asset folder or collection to rebalance.
    pub target: String,

    /// Damage per second every asset should converge on.
    #[serde(default = "default_target_dps")]
    pub target_dps: f64,

    /// Accepted deviation from `target_dps` (0-10).
    #[serde(default = "default_tolerance")]
    #[schemars(range(min = 0, max = 10))]
    pub tolerance: f64,

    /// Preview the rebalance without applying it.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
}

impl ToolArguments for NormalizeDpsParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_TOLERANCE..=MAX_TOLERANCE).contains(&self.tolerance) {
            return Err(ValidationError::out_of_range(
                "tolerance",
                format_args!("a number between {} and {}", MIN_TOLERANCE, MAX_TOLERANCE),
                &self.tolerance.into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Normalize DPS tool - pulls damage output toward a common target.
pub struct NormalizeDpsTool;

impl NormalizeDpsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "normalize_dps";

    pub const TITLE: &'static str = "Normalize DPS";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Normalize damage-per-second across a target's assets to a goal value within a tolerance window.";

    #[instrument(skip_all, fields(target = %params.target))]
    pub fn execute(params: &NormalizeDpsParams) -> AuditResult {
        info!(
            "Normalizing {} to {} DPS (±{})",
            params.target, params.target_dps, params.tolerance
        );

        let low = params.target_dps - params.tolerance;
        let high = params.target_dps + params.tolerance;

        let summary = format!(
            "{} on {}: target {} DPS ±{}{}",
            Self::NAME,
            params.target,
            params.target_dps,
            params.tolerance,
            if params.dry_run { " (dry run)" } else { "" }
        );

        let details = vec![
            format!("{} target_dps -> {}", params.target, params.target_dps),
            format!("{} accepted window {}..{}", params.target, low, high),
            format!(
                "{} outliers {}",
                params.target,
                if params.dry_run { "flagged" } else { "rescaled" }
            ),
        ];

        build_result(Self::NAME, dry_run_status(params.dry_run), summary, details)
    }

    pub fn spec() -> ToolSpec {
        ToolSpec::new::<NormalizeDpsParams, AuditResult>(
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> Result<NormalizeDpsParams, ValidationError> {
        NormalizeDpsParams::from_arguments(value.as_object().unwrap())
    }

    #[test]
    fn test_defaults() {
        let p = params(json!({ "target": "Rifles" })).unwrap();
        assert_eq!(p.target_dps, 25.0);
        assert_eq!(p.tolerance, 2.0);
        assert!(p.dry_run);

        let result = NormalizeDpsTool::execute(&p);
        assert_eq!(result.status, "dry_run");
        assert_eq!(result.diff[0], "normalize_dps on Rifles: target 25 DPS ±2 (dry run)");
        assert_eq!(result.diff[2], "Rifles accepted window 23..27");
        assert!(result.affected_assets.iter().all(|a| a == "Rifles"));
    }

    #[test]
    fn test_tolerance_bounds() {
        assert!(params(json!({ "target": "R", "tolerance": 10 })).is_ok());
        assert!(params(json!({ "target": "R", "tolerance": 0 })).is_ok());

        let err = params(json!({ "target": "R", "tolerance": 11 })).unwrap_err();
        assert_eq!(err.field, "tolerance");
        let err = params(json!({ "target": "R", "tolerance": -0.5 })).unwrap_err();
        assert_eq!(err.field, "tolerance");
    }

    #[test]
    fn test_target_dps_must_be_number() {
        let err = params(json!({ "target": "R", "target_dps": "fast" })).unwrap_err();
        assert_eq!(err.field, "target_dps");
    }
}
