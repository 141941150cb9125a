//! HTTP relay between the terminal client and the recommendation backend.
//!
//! Serves `POST /api/recommendations` on a local port (default 8787).  Each
//! request is validated, forwarded to `<upstream>/api/recommendations` with
//! exactly **one** upstream call, and the answer is normalised:
//!
//! • upstream 2xx → the upstream bytes, unmodified, with status 200.  The body
//!   must decode into `ApiResponse` and pass `validate()`; anything else is a
//!   502 so a malformed payload never reaches the client.
//! • upstream non-2xx → the upstream status with
//!   `{"error": "Backend error: <reason phrase>"}`.  The upstream body is
//!   logged here and never echoed.
//! • anything that throws (bad request JSON, connect failure, deadline) → 500
//!   with the error text.
//!
//! The proxy re-uses one `reqwest::Client` so TLS sessions are shared.
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};

use jams_proto::api::{ApiResponse, ErrorBody, RecommendationRequest, RECOMMENDATIONS_PATH};
use jams_proto::config::ProxyConfig;

// ── Shared state ──────────────────────────────────────────────────────────────

/// Upstream base URL plus a persistent HTTP client.
#[derive(Clone)]
pub struct ProxyState {
    client: Client,
    upstream_url: String,
}

impl ProxyState {
    pub fn new(upstream_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;
        let upstream_url = upstream_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            upstream_url,
        })
    }

    pub fn from_config(config: &ProxyConfig) -> anyhow::Result<Self> {
        Self::new(config.upstream_url.clone(), config.upstream_timeout())
    }

    /// Full URL of the upstream recommendation endpoint.
    pub fn upstream_endpoint(&self) -> String {
        format!("{}{}", self.upstream_url, RECOMMENDATIONS_PATH)
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("playlist_url is required")]
    MissingPlaylistUrl,
    #[error("Backend error: {}", status_text(.0))]
    UpstreamRejected(StatusCode),
    #[error("Backend error: invalid response payload")]
    InvalidPayload,
    #[error("{0}")]
    MalformedRequest(#[from] serde_json::Error),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingPlaylistUrl => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamRejected(status) => *status,
            ProxyError::InvalidPayload => StatusCode::BAD_GATEWAY,
            ProxyError::MalformedRequest(_) | ProxyError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let mut message = self.to_string();
        if message.trim().is_empty() {
            message = "Internal Server Error".to_string();
        }
        (self.status(), Json(ErrorBody::new(message))).into_response()
    }
}

/// Reason phrase for `status`, the equivalent of fetch's `statusText`.
fn status_text(status: &StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown Status")
}

// ── Relay ─────────────────────────────────────────────────────────────────────

/// Validate `body`, forward it upstream and return the bytes to pass through.
pub async fn relay(state: &ProxyState, body: &[u8]) -> Result<Bytes, ProxyError> {
    let request: RecommendationRequest = serde_json::from_slice(body)?;
    info!("proxy: request received for {:?}", request.playlist_url);

    let playlist_url = request
        .playlist_url()
        .ok_or(ProxyError::MissingPlaylistUrl)?;

    let target = state.upstream_endpoint();
    info!("proxy: forwarding to {}", target);

    let upstream = state
        .client
        .post(&target)
        .json(&RecommendationRequest::new(playlist_url))
        .send()
        .await?;

    let upstream_status = upstream.status();
    if !upstream_status.is_success() {
        let detail = upstream.text().await.unwrap_or_default();
        warn!(
            "proxy: upstream returned {} for {}: {}",
            upstream_status, playlist_url, detail
        );
        let status =
            StatusCode::from_u16(upstream_status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return Err(ProxyError::UpstreamRejected(status));
    }

    let bytes = upstream.bytes().await?;
    let decoded: ApiResponse = serde_json::from_slice(&bytes).map_err(|e| {
        warn!("proxy: upstream payload does not decode: {}", e);
        ProxyError::InvalidPayload
    })?;
    if let Err(e) = decoded.validate() {
        warn!("proxy: upstream payload breaks the contract: {}", e);
        return Err(ProxyError::InvalidPayload);
    }

    info!(
        "proxy: upstream answered success={} recommendations={}",
        decoded.success,
        decoded.recommendations.as_ref().map_or(0, Vec::len)
    );
    Ok(bytes)
}

// ── Route handlers ────────────────────────────────────────────────────────────

async fn recommendations(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    relay(&state, &body)
        .await
        .map(|bytes| ([(header::CONTENT_TYPE, "application/json")], bytes).into_response())
        .inspect_err(|e| match e {
            ProxyError::MissingPlaylistUrl => debug!("proxy: rejected request without playlist_url"),
            ProxyError::MalformedRequest(_) | ProxyError::Transport(_) => {
                error!("proxy: error calling backend: {}", e)
            }
            ProxyError::UpstreamRejected(_) | ProxyError::InvalidPayload => {}
        })
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "RedditJams proxy",
    }))
}

async fn service_info() -> Json<serde_json::Value> {
    Json(json!({
        "service": "RedditJams - recommendation proxy",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            format!("POST {}", RECOMMENDATIONS_PATH),
            "GET /api/health",
        ],
    }))
}

// ── Server startup ────────────────────────────────────────────────────────────

pub fn router(state: ProxyState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(service_info))
        .route("/api/health", get(health))
        .route(RECOMMENDATIONS_PATH, post(recommendations))
        .layer(cors)
        .with_state(state)
}

/// Serve the proxy on an already-bound listener until the server stops.
pub async fn serve(listener: TcpListener, state: ProxyState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(
            "Recommendation proxy listening on http://{} → {}",
            addr,
            state.upstream_endpoint()
        );
    }
    axum::serve(listener, router(state)).await
}

/// Bind `bind_address:port` and serve in a background task.
pub fn start_server(
    bind_address: String,
    port: u16,
    state: ProxyState,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let addr = format!("{}:{}", bind_address, port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                warn!("Failed to bind recommendation proxy on {}: {}", addr, e);
                return;
            }
        };
        if let Err(e) = serve(listener, state).await {
            warn!("Recommendation proxy error: {}", e);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ProxyError::MissingPlaylistUrl.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::UpstreamRejected(StatusCode::SERVICE_UNAVAILABLE).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ProxyError::InvalidPayload.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_upstream_rejection_message_uses_reason_phrase() {
        let e = ProxyError::UpstreamRejected(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(e.to_string(), "Backend error: Service Unavailable");
        let e = ProxyError::UpstreamRejected(StatusCode::NOT_FOUND);
        assert_eq!(e.to_string(), "Backend error: Not Found");
    }

    #[test]
    fn test_upstream_endpoint_strips_trailing_slash() {
        let state = ProxyState::new("http://backend.local/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            state.upstream_endpoint(),
            "http://backend.local/api/recommendations"
        );
    }
}
