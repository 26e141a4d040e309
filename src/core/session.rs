//! Per-connection session lifecycle.
//!
//! Every qualifying request on the MCP endpoint gets its own [`McpServer`]
//! and [`StreamableHttpTransport`]. The [`Session`] owning them moves through
//! `Idle -> Connecting -> Active -> Closing -> Closed` and tears both down
//! exactly once, either from an explicit [`Session::close`] or from `Drop`
//! when the request future is cancelled because the client went away.

use axum::{extract::Request, response::Response};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, debug, error, info_span};

use super::config::Config;
use super::error::Result;
use super::server::McpServer;
use super::transport::{StreamableHttpTransport, TransportError, TransportResult, internal_server_error};
use crate::domains::tools::ToolRegistry;

/// Lifecycle state of a single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Active,
    Closing,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Active => "active",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicU64,
    transports_closed: AtomicU64,
    servers_closed: AtomicU64,
}

/// Point-in-time copy of the session counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub opened: u64,
    pub transports_closed: u64,
    pub servers_closed: u64,
}

impl SessionStats {
    /// Sessions whose server has not been released yet.
    pub fn live(&self) -> u64 {
        self.opened.saturating_sub(self.servers_closed)
    }
}

/// One connection's server and transport.
pub struct Session {
    id: u64,
    state: SessionState,
    server: Option<McpServer>,
    transport: Option<StreamableHttpTransport>,
    counters: Arc<Counters>,
}

impl Session {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the transport already produced a response.
    pub fn headers_sent(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.headers_sent())
    }

    fn transition(&mut self, next: SessionState) {
        debug!(connection = self.id, "{} -> {}", self.state, next);
        self.state = next;
    }

    /// Connect the transport to the server and hand it the request.
    pub async fn serve(&mut self, request: Request) -> TransportResult<Response> {
        if self.state != SessionState::Connecting {
            return Err(TransportError::connection(format!(
                "cannot serve a session in state {}",
                self.state
            )));
        }
        let server = self
            .server
            .clone()
            .ok_or_else(|| TransportError::connection("session has no server"))?;
        self.transport
            .as_mut()
            .ok_or_else(|| TransportError::connection("session has no transport"))?
            .connect(server)?;
        self.transition(SessionState::Active);

        self.transport
            .as_mut()
            .ok_or_else(|| TransportError::connection("session has no transport"))?
            .handle_request(request)
            .await
    }

    /// Release the transport and the server. Safe to call more than once.
    pub fn close(&mut self) {
        if matches!(self.state, SessionState::Closing | SessionState::Closed) {
            return;
        }
        self.transition(SessionState::Closing);

        if let Some(mut transport) = self.transport.take() {
            transport.close();
            self.counters.transports_closed.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(server) = self.server.take() {
            server.close();
            self.counters.servers_closed.fetch_add(1, Ordering::Relaxed);
        }

        self.transition(SessionState::Closed);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            debug!(connection = self.id, "Connection closed before the exchange completed");
            self.close();
        }
    }
}

/// Builds a fresh server and transport per request and tracks teardown.
#[derive(Clone)]
pub struct SessionManager {
    config: Arc<Config>,
    registry: Arc<ToolRegistry>,
    counters: Arc<Counters>,
}

impl SessionManager {
    pub fn new(config: Arc<Config>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            config,
            registry,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Build the tool registry for `config` and wrap it in a manager.
    pub fn from_config(config: Config) -> Result<Self> {
        let registry = ToolRegistry::builtin(&config)?;
        Ok(Self::new(Arc::new(config), Arc::new(registry)))
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            opened: self.counters.opened.load(Ordering::Relaxed),
            transports_closed: self.counters.transports_closed.load(Ordering::Relaxed),
            servers_closed: self.counters.servers_closed.load(Ordering::Relaxed),
        }
    }

    /// Open a session: build a server bound to the shared registry and a
    /// sessionless transport for it.
    pub fn open(&self) -> Session {
        let id = self.counters.opened.fetch_add(1, Ordering::Relaxed) + 1;
        let mut session = Session {
            id,
            state: SessionState::Idle,
            server: None,
            transport: None,
            counters: self.counters.clone(),
        };
        session.transition(SessionState::Connecting);
        session.server = Some(McpServer::new(self.config.clone(), self.registry.clone()));
        session.transport = Some(StreamableHttpTransport::sessionless());
        session
    }

    /// Serve one HTTP exchange on its own session.
    pub async fn handle(&self, request: Request) -> Response {
        let mut session = self.open();
        let span = info_span!("session", connection = session.id());

        async move {
            let result = session.serve(request).await;
            let response = match result {
                Ok(response) => response,
                // The transport only marks headers as sent once it holds a
                // complete response, so any error here can still be answered.
                Err(e) => {
                    error!(headers_sent = session.headers_sent(), "Error handling MCP request: {}", e);
                    internal_server_error()
                }
            };
            session.close();
            response
        }
        .instrument(span)
        .await
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("tools", &self.registry.len())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, StatusCode, header};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn manager() -> SessionManager {
        SessionManager::from_config(Config::default()).unwrap()
    }

    fn tools_list() -> Request {
        http::Request::builder()
            .method(Method::POST)
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }).to_string(),
            ))
            .unwrap()
    }

    #[test]
    fn test_open_moves_to_connecting() {
        let manager = manager();
        let session = manager.open();
        assert_eq!(session.state(), SessionState::Connecting);
        assert_eq!(session.id(), 1);
        assert_eq!(manager.stats().live(), 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let manager = manager();
        let mut session = manager.open();
        session.close();
        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        drop(session);

        let stats = manager.stats();
        assert_eq!(stats.opened, 1);
        assert_eq!(stats.transports_closed, 1);
        assert_eq!(stats.servers_closed, 1);
    }

    #[test]
    fn test_drop_tears_down_abandoned_session() {
        let manager = manager();
        drop(manager.open());
        let stats = manager.stats();
        assert_eq!(stats.transports_closed, 1);
        assert_eq!(stats.servers_closed, 1);
        assert_eq!(stats.live(), 0);
    }

    #[tokio::test]
    async fn test_serve_activates_session() {
        let manager = manager();
        let mut session = manager.open();
        let response = session.serve(tools_list()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(session.state(), SessionState::Active);
        assert!(session.headers_sent());

        session.close();
        assert!(session.serve(tools_list()).await.is_err());
    }

    #[tokio::test]
    async fn test_handle_closes_once_per_request() {
        let manager = manager();
        for _ in 0..5 {
            let response = manager.handle(tools_list()).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        let stats = manager.stats();
        assert_eq!(stats.opened, 5);
        assert_eq!(stats.transports_closed, 5);
        assert_eq!(stats.servers_closed, 5);
    }

    #[tokio::test]
    async fn test_unpolled_request_opens_nothing() {
        let manager = manager();
        drop(manager.handle(tools_list()));
        assert_eq!(manager.stats(), SessionStats::default());
    }

    #[tokio::test]
    async fn test_disconnect_mid_call_tears_down_once() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&upstream)
            .await;

        let mut config = Config::default();
        config.credentials.xai_api_key = Some("test-key".to_string());
        let manager = SessionManager::from_config(config).unwrap();

        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "method": "tools/call",
                    "params": {
                        "name": "xai_call",
                        "arguments": { "endpoint": upstream.uri(), "payload": {} }
                    }
                })
                .to_string(),
            ))
            .unwrap();

        let mut in_flight = Box::pin(manager.handle(request));
        tokio::select! {
            _ = &mut in_flight => panic!("request completed before the upstream answered"),
            _ = tokio::time::sleep(Duration::from_millis(300)) => {}
        }

        let stats = manager.stats();
        assert_eq!(stats.opened, 1);
        assert_eq!(stats.live(), 1);
        assert_eq!(stats.transports_closed, 0);

        // Hyper drops the handler future when the client goes away.
        drop(in_flight);

        let stats = manager.stats();
        assert_eq!(stats.transports_closed, 1);
        assert_eq!(stats.servers_closed, 1);
        assert_eq!(stats.live(), 0);
    }
}
