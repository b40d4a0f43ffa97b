//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, request ID)
//! - Own the shared origin HTTP client
//! - Drive the rewrite pipeline per request:
//!   request rewrite → origin call → header rewrite → body decision
//! - Convert any stage failure into the diagnostic error response

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::header::{
        HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE,
    },
    http::{Method, Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{request_id::SetRequestIdLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::error::{error_chain, ProxyError};
use crate::http::body::{is_rewritable_content_type, rewrite_text};
use crate::http::context::RequestContext;
use crate::http::request::{rewrite_request, UuidRequestId, X_REQUEST_ID};
use crate::http::response::rewrite_headers;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub client: Client<HttpsConnector<HttpConnector>, Body>,
}

/// HTTP server for the masking proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails only if the platform's TLS root store cannot be loaded.
    pub fn new(config: ProxyConfig) -> Result<Self, std::io::Error> {
        // The legacy client never follows redirects, which is load-bearing:
        // the proxy must observe and rewrite Location itself.
        let https = HttpsConnectorBuilder::new()
            .with_native_roots()?
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(https);

        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            client,
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            origin = %self.config.origin.base(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler: runs the pipeline, mapping any failure to the
/// uniform diagnostic response.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    match proxy(state, request).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                status = %response.status(),
                "Request proxied"
            );
            response
        }
        Err(err) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %err,
                "Proxy pipeline failed"
            );
            error_response(&err)
        }
    }
}

/// The rewrite pipeline for a single request. Stateless across requests;
/// each stage is a pure transformation between the I/O boundaries.
async fn proxy(state: AppState, request: Request<Body>) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let ctx = RequestContext::from_parts(&parts);
    let method = parts.method.clone();

    let outbound = rewrite_request(parts, body, &ctx, &state.config.origin)?;

    // Single pass-through attempt; failures surface as the 500 diagnostic.
    let origin_response = state.client.request(outbound).await?;

    let (origin_parts, origin_body) = origin_response.into_parts();
    let (mut headers, cookies) = rewrite_headers(&origin_parts.headers, &ctx, &state.config.origin)?;

    // CORS preflight: rewritten headers only, no body, no cookie append.
    if method == Method::OPTIONS {
        let mut response = Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Body::empty())?;
        *response.headers_mut() = headers;
        return Ok(response);
    }

    let content_type = origin_parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let body = if is_rewritable_content_type(content_type) {
        // Textual documents are buffered whole; the rewrite changes their
        // length, so the stale Content-Length must not be carried over.
        let bytes = axum::body::to_bytes(Body::new(origin_body), usize::MAX).await?;
        let text = String::from_utf8_lossy(&bytes);
        let rewritten = rewrite_text(&text, state.config.origin.host(), &ctx);
        headers.remove(CONTENT_LENGTH);
        Body::from(rewritten)
    } else {
        // Binary-safe pass-through: the body streams, untouched.
        Body::new(origin_body)
    };

    let mut response = Response::builder()
        .status(origin_parts.status)
        .body(body)?;
    *response.headers_mut() = headers;

    // One header line per cookie, in origin order. Joining them into a
    // single line would corrupt cookies whose values contain commas.
    for cookie in &cookies {
        response
            .headers_mut()
            .append(SET_COOKIE, HeaderValue::from_str(cookie)?);
    }

    Ok(response)
}

/// The uniform diagnostic response: visible to browser clients thanks to
/// the permissive CORS header, instead of being masked by a CORS failure.
fn error_response(err: &ProxyError) -> Response {
    let body = format!("Proxy Error: {}\n\nStack:\n{}", err, error_chain(err));
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}
