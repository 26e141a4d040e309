//! Schema layer - typed tool arguments and the shared output shapes.
//!
//! Every tool owns one concrete argument record. Records are decoded with
//! serde straight from the raw argument bag, so `#[serde(default)]` supplies
//! the defaults and the field types are the type checks. A small
//! [`ToolArguments::validate`] hook then enforces numeric bounds. Fields the
//! tool does not declare are ignored: editor clients routinely send extra
//! keys (e.g. `command`).
//!
//! The same records derive [`JsonSchema`] so the advertised `inputSchema`
//! and the validation rules come from one place.

use std::fmt;

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

// ============================================================================
// Validation Errors
// ============================================================================

/// An argument failed validation against its tool's input schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: String,

    /// What was wrong with it.
    pub reason: String,
}

impl ValidationError {
    /// A required field was omitted.
    pub fn missing(field: &str) -> Self {
        Self {
            field: field.to_string(),
            reason: "missing required field".to_string(),
        }
    }

    /// A field decoded fine but its value is outside the accepted range.
    pub fn out_of_range(field: &str, expected: impl fmt::Display, received: &Value) -> Self {
        Self {
            field: field.to_string(),
            reason: format!("expected {}, received {}", expected, received),
        }
    }

    fn decode(field: impl Into<String>, err: &serde_json::Error) -> Self {
        Self {
            field: field.into(),
            reason: err.to_string(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field `{}`: {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// Argument Records
// ============================================================================

/// A typed, fully-defaulted argument record for one tool.
pub trait ToolArguments: DeserializeOwned + JsonSchema + Sized + Send + Sync + 'static {
    /// Decode a raw argument bag and check it.
    ///
    /// Explicit `null` values count as omitted, so they pick up the field's
    /// default (or fail as missing when the field is required).
    fn from_arguments(arguments: &JsonObject) -> Result<Self, ValidationError> {
        let bag: JsonObject = arguments
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let params = decode::<Self>(bag)?;
        params.validate()?;
        Ok(params)
    }

    /// Range checks that the field types alone cannot express.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Default for every `dry_run` flag: preview rather than apply.
pub fn default_dry_run() -> bool {
    true
}

fn decode<T: DeserializeOwned>(bag: JsonObject) -> Result<T, ValidationError> {
    serde_json::from_value(Value::Object(bag.clone()))
        .map_err(|err| ValidationError::decode(blame::<T>(&bag, &err), &err))
}

/// Name the field behind a decode error.
///
/// serde_json reports missing fields by name but type errors only by value.
/// For those, the culprit is the supplied key whose removal changes the
/// error.
fn blame<T: DeserializeOwned>(bag: &JsonObject, err: &serde_json::Error) -> String {
    let message = err.to_string();
    if let Some(field) = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
    {
        return field.to_string();
    }

    bag.keys()
        .find(|key| {
            let mut rest = bag.clone();
            rest.remove(key.as_str());
            match T::deserialize(&Value::Object(rest)) {
                Ok(_) => true,
                Err(other) => other.to_string() != message,
            }
        })
        .cloned()
        .unwrap_or_else(|| "arguments".to_string())
}

// ============================================================================
// Output Shapes
// ============================================================================

/// Canonical structured output shared by every deterministic tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuditResult {
    /// Outcome label (e.g. `dry_run`, `applied`).
    pub status: String,

    /// Summary line followed by at most five detail lines.
    pub diff: Vec<String>,

    /// First token of each detail line.
    pub affected_assets: Vec<String>,

    /// Exactly three informational lines.
    pub logs: Vec<String>,
}

/// Outcome of an outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Ok,
    Error,
}

/// Structured output of the outbound call tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct OutboundCallResult {
    pub status: CallStatus,

    /// Upstream response body, verbatim (success only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Human-readable failure description (error only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OutboundCallResult {
    pub fn ok(data: Value) -> Self {
        Self {
            status: CallStatus::Ok,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CallStatus::Error,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Check that a structured value has the shape of `T`.
pub fn conforms<T: DeserializeOwned>(value: &Value) -> Result<(), String> {
    T::deserialize(value).map(|_| ()).map_err(|e| e.to_string())
}

// ============================================================================
// Tests
// ============================================================================
