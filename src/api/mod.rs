// src/api/mod.rs
// =============================================================================
// This module is the HTTP surface of the service.
//
// Routes:
//   GET /health               -> liveness check
//   GET /scrape?url=<url>     -> scrape a page, returns page 1 of its links
//   GET /scrape/:id/:page     -> another page of a previous scrape
//
// An optional `X-Session-Id` header picks the storage partition. Requests
// without one share the "default" partition.
//
// Submodules:
// - service: the scrape and page operations
// - pagination: page maths and response assembly
// - error: request failures and their HTTP status codes
// =============================================================================

mod error;
mod pagination;
mod service;

pub use error::ApiError;
pub use service::AppState;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::models::PageResult;

pub const SESSION_HEADER: &str = "x-session-id";
pub const DEFAULT_SESSION: &str = "default";

#[derive(Debug, Deserialize)]
pub struct ScrapeQuery {
    url: Option<String>,
}

// Builds the axum Router with all endpoints
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/scrape", get(scrape_handler))
        .route("/scrape/:id/:page", get(page_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Binds the port and serves until the process is stopped
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn scrape_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ScrapeQuery>,
) -> Result<Json<PageResult>, ApiError> {
    let session = session_key(&headers);
    service::scrape(&state, session, query.url.as_deref())
        .await
        .map(Json)
        .inspect_err(|e| tracing::warn!(error = %e, "scrape request failed"))
}

async fn page_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, page)): Path<(String, String)>,
) -> Result<Json<PageResult>, ApiError> {
    let session = session_key(&headers);
    service::page(&state, session, &id, &page)
        .await
        .map(Json)
        .inspect_err(|e| tracing::warn!(request_id = %id, error = %e, "page request failed"))
}

// The session partition a request belongs to
fn session_key(headers: &HeaderMap) -> &str {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_SESSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::build_client;
    use crate::cli::Settings;
    use crate::models::{LinkStatus, PageAnalysis};
    use axum::body::Body;
    use axum::http::{HeaderValue, Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_state() -> Arc<AppState> {
        let settings = Settings {
            port: 0,
            page_size: 10,
            scrape_timeout: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(5),
            max_concurrent_probes: None,
            strict_tls: false,
        };
        Arc::new(AppState::new(settings, build_client(false).unwrap()))
    }

    fn stored(state: &AppState, session: &str, urls: &[String]) -> String {
        let analysis = PageAnalysis {
            links: urls.iter().map(|u| LinkStatus::unprobed(u.as_str())).collect(),
            external_count: urls.len(),
            ..Default::default()
        };
        state.sessions.for_session(session).put(analysis)
    }

    // Sends one request through the router and returns status + JSON body
    async fn send(state: Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let (status, body) = send(app_state(), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_bad_page_number_is_json_error() {
        let state = app_state();
        let id = stored(&state, DEFAULT_SESSION, &["http://127.0.0.1:1/".to_string()]);

        let (status, body) = send(state, get_request(&format!("/scrape/{}/abc", id))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid page number");
    }

    #[tokio::test]
    async fn test_scrape_without_url_is_json_error() {
        let (status, body) = send(app_state(), get_request("/scrape")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "url query parameter is required");
    }

    #[tokio::test]
    async fn test_session_header_selects_partition() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/linked"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let state = app_state();
        let id = stored(&state, "alice", &[format!("{}/linked", server.uri())]);
        let uri = format!("/scrape/{}/1", id);

        let request = Request::builder()
            .uri(uri.as_str())
            .header(SESSION_HEADER, "alice")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(Arc::clone(&state), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["request_id"], id.as_str());
        assert_eq!(body["session_id"], "alice");
        assert_eq!(body["scraped"]["paginated"]["urls"][0]["http_status"], 200);

        // Same ID, but outside alice's partition
        let (status, body) = send(Arc::clone(&state), get_request(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "request ID not found");

        let request = Request::builder()
            .uri(uri.as_str())
            .header(SESSION_HEADER, "bob")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(state, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_session_key_defaults() {
        let headers = HeaderMap::new();
        assert_eq!(session_key(&headers), DEFAULT_SESSION);

        let mut blank = HeaderMap::new();
        blank.insert(SESSION_HEADER, HeaderValue::from_static("  "));
        assert_eq!(session_key(&blank), DEFAULT_SESSION);
    }

    #[test]
    fn test_session_key_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("abc123"));
        assert_eq!(session_key(&headers), "abc123");
    }
}
