//! Tool handlers module.
//!
//! A handler turns a raw argument bag into a structured result. The five
//! editing tools are pure functions of their validated arguments and share
//! [`build_result`]; they are wrapped by [`DeterministicHandler`]. The
//! outbound call tool implements [`ToolHandler`] directly.

use std::marker::PhantomData;

use chrono::{DateTime, SecondsFormat, Utc};
use rmcp::model::JsonObject;
use serde_json::Value;

use super::error::ToolError;
use super::schema::{AuditResult, ToolArguments};

/// Maximum number of detail lines kept in a result.
pub const MAX_DETAIL_LINES: usize = 5;

/// Trait implemented by every registered tool handler.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Validate `arguments` and run the tool, returning its structured result.
    async fn call(&self, arguments: JsonObject) -> Result<Value, ToolError>;
}

/// Adapter for tools whose body is a pure function of typed arguments.
pub struct DeterministicHandler<P> {
    run: fn(&P) -> AuditResult,
    _params: PhantomData<fn() -> P>,
}

impl<P> DeterministicHandler<P> {
    pub fn new(run: fn(&P) -> AuditResult) -> Self {
        Self {
            run,
            _params: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<P: ToolArguments> ToolHandler for DeterministicHandler<P> {
    async fn call(&self, arguments: JsonObject) -> Result<Value, ToolError> {
        let params = P::from_arguments(&arguments)?;
        let result = (self.run)(&params);
        serde_json::to_value(result).map_err(|e| ToolError::internal(e.to_string()))
    }
}

// ============================================================================
// Result Builder
// ============================================================================

/// Status label for tools that support a dry run.
pub fn dry_run_status(dry_run: bool) -> &'static str {
    if dry_run { "dry_run" } else { "applied" }
}

/// Build an [`AuditResult`] stamped with the current time.
pub fn build_result(
    tool: &str,
    status: &str,
    summary: String,
    details: Vec<String>,
) -> AuditResult {
    build_result_at(tool, status, summary, details, Utc::now())
}

/// Build an [`AuditResult`] stamped with `now`.
///
/// Details beyond [`MAX_DETAIL_LINES`] are dropped. Each affected asset is the
/// first whitespace-delimited token of a kept detail line.
pub fn build_result_at(
    tool: &str,
    status: &str,
    summary: String,
    mut details: Vec<String>,
    now: DateTime<Utc>,
) -> AuditResult {
    details.truncate(MAX_DETAIL_LINES);

    let affected_assets = details
        .iter()
        .map(|line| line.split_whitespace().next().unwrap_or_default().to_string())
        .collect();

    let logs = vec![
        format!("Validated {} input", tool),
        format!(
            "Timestamp: {}",
            now.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        summary.clone(),
    ];

    let mut diff = Vec::with_capacity(details.len() + 1);
    diff.push(summary);
    diff.extend(details);

    AuditResult {
        status: status.to_string(),
        diff,
        affected_assets,
        logs,
    }
}
