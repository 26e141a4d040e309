//! Sessionless streamable HTTP transport.
//!
//! A transport serves exactly one HTTP exchange in JSON-response mode: no
//! session id is issued, no SSE stream is opened, and every POST is answered
//! with a plain `application/json` body. It is connected to one
//! [`McpServer`] and discarded afterwards.

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::Request,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http::{HeaderValue, Method, StatusCode, header};
use rmcp::{
    ServerHandler,
    model::{CallToolRequestParam, ListToolsResult},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::jsonrpc::{JsonRpcMessage, JsonRpcRequest, JsonRpcResponse, SERVER_ERROR};
use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// Largest request body accepted on the MCP endpoint.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Per-request MCP transport.
#[derive(Default)]
pub struct StreamableHttpTransport {
    server: Option<McpServer>,
    headers_sent: bool,
    closed: bool,
}

impl StreamableHttpTransport {
    /// Create a transport that negotiates no session and answers in JSON.
    pub fn sessionless() -> Self {
        Self::default()
    }

    /// Attach the server that will handle this transport's messages.
    pub fn connect(&mut self, server: McpServer) -> TransportResult<()> {
        if self.closed {
            return Err(TransportError::connection("transport is closed"));
        }
        if self.server.is_some() {
            return Err(TransportError::connection("transport is already connected"));
        }
        self.server = Some(server);
        Ok(())
    }

    /// Whether a response has already been produced for this exchange.
    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Handle the HTTP exchange and produce its response.
    pub async fn handle_request(&mut self, request: Request) -> TransportResult<Response> {
        if self.closed {
            return Err(TransportError::connection("transport is closed"));
        }
        let server = self
            .server
            .clone()
            .ok_or_else(|| TransportError::connection("transport is not connected"))?;

        let response = match *request.method() {
            Method::POST => handle_post(&server, request).await?,
            Method::DELETE => {
                debug!("Client requested transport termination");
                self.close();
                StatusCode::OK.into_response()
            }
            _ => method_not_allowed(),
        };

        self.headers_sent = true;
        Ok(response)
    }

    /// Close the transport. Returns `true` only for the call that actually
    /// closed it.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        self.server = None;
        true
    }
}

async fn handle_post(server: &McpServer, request: Request) -> TransportResult<Response> {
    if !is_json_content(request.headers().get(header::CONTENT_TYPE)) {
        warn!("Rejecting POST without application/json content type");
        return Ok(error_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            JsonRpcResponse::error(
                None,
                SERVER_ERROR,
                "Unsupported Media Type: Content-Type must be application/json",
            ),
        ));
    }

    let body: Bytes = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| TransportError::body(e.to_string()))?;

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Rejecting unparseable request body: {}", e);
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                JsonRpcResponse::parse_error(),
            ));
        }
    };

    let (items, batch) = match payload {
        Value::Array(items) => (items, true),
        single => (vec![single], false),
    };

    let mut messages = Vec::with_capacity(items.len());
    for item in items {
        match JsonRpcMessage::classify(item) {
            Some(message) => messages.push(message),
            None => {
                warn!("Rejecting payload that is not a JSON-RPC 2.0 message");
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    JsonRpcResponse::invalid_request(None),
                ));
            }
        }
    }
    if messages.is_empty() {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            JsonRpcResponse::invalid_request(None),
        ));
    }

    let mut responses = Vec::new();
    for message in messages {
        let JsonRpcMessage::Request(request) = message else {
            debug!("Ignoring client response message");
            continue;
        };
        if request.is_notification() {
            handle_notification(&request);
            continue;
        }
        responses.push(process_request(server, request).await);
    }

    let response = match (responses.len(), batch) {
        (0, _) => StatusCode::ACCEPTED.into_response(),
        (_, true) => Json(responses).into_response(),
        (_, false) => match responses.pop() {
            Some(single) => Json(single).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        },
    };
    Ok(response)
}

/// Process a JSON-RPC request and return the response.
async fn process_request(server: &McpServer, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Received JSON-RPC request: {}", request.method);

    match request.method.as_str() {
        "initialize" => to_success(request.id, &server.get_info()),
        "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
        "tools/list" => {
            let result = ListToolsResult {
                tools: server.list_tools(),
                next_cursor: None,
                meta: None,
            };
            to_success(request.id, &result)
        }
        "tools/call" => handle_tools_call(server, request).await,
        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

async fn handle_tools_call(server: &McpServer, request: JsonRpcRequest) -> JsonRpcResponse {
    let Some(params) = request.params else {
        return JsonRpcResponse::invalid_params(request.id, "Missing params");
    };
    let params: CallToolRequestParam = match serde_json::from_value(params) {
        Ok(params) => params,
        Err(e) => {
            return JsonRpcResponse::invalid_params(
                request.id,
                format!("Invalid tools/call params: {}", e),
            );
        }
    };

    match server.call_tool(&params.name, params.arguments).await {
        Ok(result) => to_success(request.id, &result),
        Err(e) => JsonRpcResponse::from_mcp_error(request.id, e),
    }
}

fn handle_notification(request: &JsonRpcRequest) {
    if request.method.starts_with("notifications/") {
        debug!("Received notification: {}", request.method);
    } else {
        debug!("Ignoring id-less request for {}", request.method);
    }
}

fn to_success<T: Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            warn!("Failed to serialize result: {}", e);
            JsonRpcResponse::internal_error(id, "Internal error")
        }
    }
}

fn is_json_content(content_type: Option<&HeaderValue>) -> bool {
    content_type
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("application/json"))
}

fn method_not_allowed() -> Response {
    let mut response = error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        JsonRpcResponse::error(None, SERVER_ERROR, "Method not allowed."),
    );
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("POST, DELETE"));
    response
}

fn error_response(status: StatusCode, body: JsonRpcResponse) -> Response {
    (status, Json(body)).into_response()
}

/// Fixed body returned when the exchange fails before any response exists.
pub fn internal_server_error() -> Response {
    let body = r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal server error"},"id":null}"#;
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/json")],
        Body::from(body),
    )
        .into_response()
}
