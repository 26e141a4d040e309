//! HTTP listener for the MCP endpoint.
//!
//! Routes by exact path and method: `OPTIONS` on the MCP path answers the
//! CORS pre-flight, `GET /` serves a plain-text banner, and `POST`/`GET`/
//! `DELETE` on the MCP path are handed to the [`SessionManager`]. Everything
//! else is a 404.

use axum::{
    Router,
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue, StatusCode, Uri,
        header::{
            self,
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS,
        },
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{info, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::session::SessionManager;

/// Plain-text body of `GET /`.
pub const BANNER: &str = "Nightshade MCP server is running. Send MCP requests to /mcp.\n";

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "POST, GET, OPTIONS";
const ALLOW_HEADERS: &str = "content-type, mcp-session-id";
const EXPOSE_HEADERS: &str = "Mcp-Session-Id";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Build the application router.
    pub fn router(&self, sessions: SessionManager) -> Router {
        router(&self.config.rpc_path, sessions)
    }

    /// Bind and serve until Ctrl-C.
    pub async fn run(self, sessions: SessionManager) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(sessions);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {}", self.config.description());
        info!("  → MCP:    POST/GET/DELETE {}", self.config.rpc_path);
        info!("  → Banner: GET /");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(TransportError::ServeError)?;

        Ok(())
    }
}

/// Build the router serving `rpc_path` and the root banner.
pub fn router(rpc_path: &str, sessions: SessionManager) -> Router {
    let cors = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static(EXPOSE_HEADERS),
        ));

    let mcp = post(handle_mcp)
        .get(handle_mcp)
        .delete(handle_mcp)
        .options(preflight)
        .fallback(fallback)
        .layer(cors);

    Router::new()
        .route(rpc_path, mcp)
        .route("/", get(root_handler).fallback(fallback))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(sessions)
}

async fn handle_mcp(State(sessions): State<SessionManager>, request: Request) -> Response {
    sessions.handle(request).await
}

/// CORS pre-flight. Fixed response whatever the request carries.
async fn preflight() -> impl IntoResponse {
    let headers: [(HeaderName, &'static str); 4] = [
        (ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN),
        (ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS),
        (ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS),
        (ACCESS_CONTROL_EXPOSE_HEADERS, EXPOSE_HEADERS),
    ];
    (StatusCode::NO_CONTENT, headers)
}

/// Root handler - plain-text banner.
async fn root_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], BANNER)
}

/// Unmatched path or method. A request target without a path (authority
/// form, or no URL at all) is malformed rather than missing.
async fn fallback(uri: Uri) -> StatusCode {
    if uri.path().is_empty() {
        warn!("Rejecting request with malformed target {:?}", uri);
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
