//! xAI call tool definition.
//!
//! Forwards a JSON payload to a chat-completion style endpoint with bearer
//! authentication. This is the only tool that performs network I/O. Every
//! outcome, including a missing credential and upstream failures, is
//! reported as a structured result rather than a protocol error.

use std::time::Duration;

use reqwest::StatusCode;
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::core::config::{CredentialsConfig, XAI_API_KEY_VAR};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::handlers::ToolHandler;
use crate::domains::tools::registry::ToolSpec;
use crate::domains::tools::schema::{OutboundCallResult, ToolArguments};

/// Default xAI chat completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.x.ai/v1/chat/completions";

/// Upper bound on one outbound call, connect to last body byte.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the xAI call tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct XaiCallParams {
    /// URL to POST the payload to. An unusable URL is reported like any
    /// other failed call.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// JSON body sent as-is.
    #[serde(default)]
    pub payload: JsonObject,
}

impl ToolArguments for XaiCallParams {}

// ============================================================================
// Tool Definition
// ============================================================================

/// xAI call tool - one authenticated POST per invocation, never retried.
pub struct XaiCallTool {
    client: reqwest::Client,
    timeout: Duration,
    api_key: Option<String>,
}

impl XaiCallTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "xai_call";

    pub const TITLE: &'static str = "xAI API Call";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "POST a JSON payload to the xAI API (or another compatible endpoint) using the server's XAI_API_KEY. Returns the upstream response body verbatim.";

    /// Create the tool with the fixed [`REQUEST_TIMEOUT`].
    pub fn new(credentials: &CredentialsConfig) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ToolError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(
            client,
            REQUEST_TIMEOUT,
            credentials.xai_api_key.clone(),
        ))
    }

    pub(crate) fn with_client(
        client: reqwest::Client,
        timeout: Duration,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            timeout,
            api_key,
        }
    }

    /// Timeout applied to every outbound request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn spec(credentials: &CredentialsConfig) -> Result<ToolSpec, ToolError> {
        Ok(ToolSpec::new::<XaiCallParams, OutboundCallResult>(
            Self::NAME,
            Self::TITLE,
            Self::DESCRIPTION,
            Self::new(credentials)?,
        ))
    }

    /// Execute the outbound call.
    #[instrument(skip_all, fields(endpoint = %params.endpoint))]
    pub async fn execute(&self, params: &XaiCallParams) -> OutboundCallResult {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("{} is not configured, skipping outbound call", XAI_API_KEY_VAR);
            return OutboundCallResult::error(format!(
                "Missing {} in environment.",
                XAI_API_KEY_VAR
            ));
        };

        info!("Calling {} (timeout {:?})", params.endpoint, self.timeout);

        let response = match self
            .client
            .post(&params.endpoint)
            .timeout(self.timeout)
            .bearer_auth(api_key)
            .json(&params.payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Outbound call failed: {}", e);
                return OutboundCallResult::error(e.to_string());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read upstream body: {}", e);
                return OutboundCallResult::error(e.to_string());
            }
        };

        debug!("Upstream answered {} ({} bytes)", status, body.len());

        if status.is_success() {
            OutboundCallResult::ok(parse_body(body))
        } else {
            warn!("Upstream returned {}", status);
            OutboundCallResult::error(upstream_error_message(status, &body))
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for XaiCallTool {
    async fn call(&self, arguments: JsonObject) -> Result<Value, ToolError> {
        let params = XaiCallParams::from_arguments(&arguments)?;
        let result = self.execute(&params).await;
        serde_json::to_value(result).map_err(|e| ToolError::internal(e.to_string()))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Return a JSON body as parsed JSON, anything else as a JSON string.
fn parse_body(body: String) -> Value {
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}

/// Pick the most useful message out of a failed upstream response.
fn upstream_error_message(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return format!("Request failed with status code {}", status.as_u16());
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("error") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => format!("Request failed with status code {}", status.as_u16()),
        },
        Ok(Value::String(message)) => message,
        Ok(_) => format!("Request failed with status code {}", status.as_u16()),
        Err(_) => body.trim().to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::schema::CallStatus;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool(api_key: Option<&str>) -> XaiCallTool {
        XaiCallTool::new(&CredentialsConfig {
            xai_api_key: api_key.map(String::from),
        })
        .unwrap()
    }

    fn params(endpoint: String, payload: Value) -> XaiCallParams {
        XaiCallParams {
            endpoint,
            payload: payload.as_object().cloned().unwrap_or_default(),
        }
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = tool(None)
            .execute(&params(format!("{}/v1/chat/completions", server.uri()), json!({})))
            .await;

        assert_eq!(
            result,
            OutboundCallResult::error("Missing XAI_API_KEY in environment.")
        );
        server.verify().await;
    }

    #[tokio::test]
    async fn test_success_returns_body_verbatim() {
        let server = MockServer::start().await;
        let upstream = json!({ "id": "cmpl-1", "choices": [{ "message": { "content": "hi" } }] });
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "model": "grok-beta" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let result = tool(Some("test-key"))
            .execute(&params(
                format!("{}/v1/chat/completions", server.uri()),
                json!({ "model": "grok-beta" }),
            ))
            .await;

        assert_eq!(result, OutboundCallResult::ok(upstream));
    }

    #[tokio::test]
    async fn test_upstream_error_string_is_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "error": "bad request" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = tool(Some("k")).execute(&params(server.uri(), json!({}))).await;

        assert_eq!(result.status, CallStatus::Error);
        assert_eq!(result.message.as_deref(), Some("bad request"));
    }

    #[tokio::test]
    async fn test_upstream_error_object_is_stringified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                json!({ "error": { "message": "invalid key", "code": 401 } }),
            ))
            .mount(&server)
            .await;

        let result = tool(Some("k")).execute(&params(server.uri(), json!({}))).await;

        let message = result.message.unwrap();
        let reparsed: Value = serde_json::from_str(&message).unwrap();
        assert_eq!(reparsed, json!({ "message": "invalid key", "code": 401 }));
    }

    #[tokio::test]
    async fn test_empty_error_body_uses_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = tool(Some("k")).execute(&params(server.uri(), json!({}))).await;
        assert_eq!(
            result.message.as_deref(),
            Some("Request failed with status code 503")
        );
    }

    #[tokio::test]
    async fn test_timeout_is_reported_as_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let tool = XaiCallTool::with_client(
            reqwest::Client::new(),
            Duration::from_millis(100),
            Some("k".into()),
        );

        let result = tool.execute(&params(server.uri(), json!({}))).await;
        assert_eq!(result.status, CallStatus::Error);
        assert!(result.message.is_some());
    }

    #[tokio::test]
    async fn test_each_call_is_an_independent_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
            .expect(2)
            .mount(&server)
            .await;

        let tool = tool(Some("k"));
        for _ in 0..2 {
            let result = tool.execute(&params(server.uri(), json!({}))).await;
            assert_eq!(result, OutboundCallResult::ok(json!("plain text")));
        }
    }

    #[test]
    fn test_new_uses_thirty_second_timeout() {
        assert_eq!(REQUEST_TIMEOUT, Duration::from_secs(30));
        assert_eq!(tool(Some("k")).timeout(), REQUEST_TIMEOUT);
        assert_eq!(tool(None).timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_defaults() {
        let p = XaiCallParams::from_arguments(&JsonObject::new()).unwrap();
        assert_eq!(p.endpoint, DEFAULT_ENDPOINT);
        assert!(p.payload.is_empty());

        let bad = json!({ "payload": "hello" });
        let err = XaiCallParams::from_arguments(bad.as_object().unwrap()).unwrap_err();
        assert_eq!(err.field, "payload");
    }

    #[tokio::test]
    async fn test_unusable_endpoint_is_a_structured_error() {
        let tool = tool(Some("k"));
        for endpoint in ["not a url", "ftp://example.com/upload"] {
            let arguments = json!({ "endpoint": endpoint, "payload": {} });
            let p = XaiCallParams::from_arguments(arguments.as_object().unwrap()).unwrap();
            let result = tool.execute(&p).await;
            assert_eq!(result.status, CallStatus::Error);
            assert!(result.message.is_some());
        }
    }

    #[test]
    fn test_upstream_error_message_precedence() {
        let status = StatusCode::BAD_GATEWAY;
        assert_eq!(upstream_error_message(status, r#"{"error":"down"}"#), "down");
        assert_eq!(upstream_error_message(status, r#""just text""#), "just text");
        assert_eq!(upstream_error_message(status, "<html>oops</html>"), "<html>oops</html>");
        assert_eq!(
            upstream_error_message(status, r#"{"detail":"x"}"#),
            "Request failed with status code 502"
        );
    }
}
