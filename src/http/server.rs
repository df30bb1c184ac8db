//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Fetch the calendar from the origin and rewrite the response
//! - Drain in-flight requests on shutdown

use axum::{
    extract::State,
    http::Uri,
    response::Response,
    routing::any,
    Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::error::ProxyError;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::http::response::{calendar_headers, calendar_response, not_found};
use crate::origin::OriginClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub origin: OriginClient,
}

/// HTTP server for the calendar proxy.
pub struct HttpServer {
    router: Router,
    origin_base_url: String,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let origin = OriginClient::new(&config.origin, &config.timeouts)?;
        Ok(Self::with_origin(config, origin))
    }

    /// Create a server around an already built origin client.
    pub fn with_origin(config: ProxyConfig, origin: OriginClient) -> Self {
        let origin_base_url = origin.base_url().to_string();
        let state = AppState { origin };
        let router = Self::build_router(&config, state);
        Self {
            router,
            origin_base_url,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            origin = %self.origin_base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Fetches `<origin><path>` and returns it as a calendar download.
async fn proxy_handler(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, ProxyError> {
    let path = uri.path();

    let upstream = state.origin.fetch(path).await?;
    let status = upstream.status();

    if !status.is_success() {
        tracing::info!(path = %path, upstream_status = %status, "Origin did not succeed, answering 404");
        return Ok(not_found());
    }

    let upstream_headers = upstream.headers().clone();
    let body = upstream.text().await?;
    let headers = calendar_headers(&upstream_headers, path)?;

    tracing::debug!(
        path = %path,
        status = %status,
        body_len = body.len(),
        "Serving calendar"
    );

    Ok(calendar_response(status, headers, body))
}
