// src/api/service.rs
// =============================================================================
// The two operations the service offers, independent of HTTP framing:
//
// 1. scrape(url): validate, fetch, analyse, store, probe page 1, respond
// 2. page(id, n): look up a stored analysis, probe page n, respond
//
// Probe results are never cached: every page view checks its links again.
// =============================================================================

use reqwest::Client;
use url::Url;

use super::error::ApiError;
use super::pagination::{build_page, page_bounds, PageContext};
use crate::checker;
use crate::cli::Settings;
use crate::models::{PageAnalysis, PageResult};
use crate::storage::SessionRegistry;

// Shared state handed to every request
pub struct AppState {
    pub settings: Settings,
    pub client: Client,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(settings: Settings, client: Client) -> Self {
        AppState {
            settings,
            client,
            sessions: SessionRegistry::new(),
        }
    }
}

// Scrape operation: analyse `raw_url` and return page 1 of its links
pub async fn scrape(
    state: &AppState,
    session: &str,
    raw_url: Option<&str>,
) -> Result<PageResult, ApiError> {
    let url = normalize_url(raw_url.unwrap_or_default())?;
    scrape_url(state, session, url).await
}

// Everything after validation, split out so it can run against local test servers
async fn scrape_url(state: &AppState, session: &str, url: Url) -> Result<PageResult, ApiError> {
    tracing::info!(%url, session, "scraping page");

    let body = checker::fetch_document(&state.client, url.as_str(), state.settings.scrape_timeout)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "page fetch failed");
            ApiError::from(e)
        })?;

    // Parsing and walking a large page is CPU work, keep it off the async workers
    let base = url.clone();
    let analysis = tokio::task::spawn_blocking(move || checker::analyze_html(&body, &base))
        .await
        .map_err(|e| {
            tracing::error!(%url, error = %e, "page analysis did not complete");
            ApiError::FetchFailed
        })?;

    let store = state.sessions.for_session(session);
    let request_id = store.put(analysis.clone());
    tracing::info!(
        request_id = %request_id,
        links = analysis.links.len(),
        stored = store.len(),
        "page analysed"
    );

    let page_size = state.settings.page_size;
    let bounds = page_bounds(1, analysis.links.len(), page_size).unwrap_or(0..0);

    Ok(probe_and_build(state, session, &request_id, 1, bounds, analysis).await)
}

// Page operation: re-probe and return page `raw_page` of a stored analysis
pub async fn page(
    state: &AppState,
    session: &str,
    request_id: &str,
    raw_page: &str,
) -> Result<PageResult, ApiError> {
    let analysis = state
        .sessions
        .for_session(session)
        .get(request_id)
        .ok_or_else(|| {
            tracing::debug!(request_id, session, "request ID not found");
            ApiError::RequestNotFound
        })?;

    let page_num = raw_page
        .parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or(ApiError::InvalidPageNumber)?;

    let bounds = page_bounds(page_num, analysis.links.len(), state.settings.page_size)
        .ok_or_else(|| {
            tracing::debug!(request_id, page = page_num, "page out of range");
            ApiError::PageNotFound
        })?;

    Ok(probe_and_build(state, session, request_id, page_num, bounds, analysis).await)
}

async fn probe_and_build(
    state: &AppState,
    session: &str,
    request_id: &str,
    page: usize,
    bounds: std::ops::Range<usize>,
    mut analysis: PageAnalysis,
) -> PageResult {
    let inaccessible = checker::probe_links(
        &state.client,
        &mut analysis.links,
        bounds.start,
        bounds.end,
        state.settings.probe_options(),
    )
    .await;

    build_page(
        PageContext {
            request_id,
            session_id: session,
            page,
            page_size: state.settings.page_size,
            bounds,
            inaccessible,
        },
        &analysis,
    )
}

// Validates a user-supplied URL
//
// - Empty input is MissingUrl
// - A missing scheme becomes "http://"
// - The host must reduce to a registrable domain ("example.com", not
//   "localhost" or an IP address)
pub fn normalize_url(raw: &str) -> Result<Url, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::MissingUrl);
    }

    let with_scheme = if has_http_scheme(raw) {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let url = Url::parse(&with_scheme).map_err(|e| {
        tracing::debug!(url = raw, error = %e, "rejected malformed url");
        ApiError::InvalidUrl
    })?;

    if checker::registrable_domain(&url).is_none() {
        tracing::debug!(url = raw, "rejected url without a registrable domain");
        return Err(ApiError::InvalidUrl);
    }

    Ok(url)
}

fn has_http_scheme(raw: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        raw.get(..scheme.len())
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::build_client;
    use crate::models::LinkStatus;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state(page_size: usize) -> AppState {
        let settings = Settings {
            port: 0,
            page_size,
            scrape_timeout: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(5),
            max_concurrent_probes: None,
            strict_tls: false,
        };
        AppState::new(settings, build_client(false).unwrap())
    }

    async fn mount(server: &MockServer, route: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    fn stored(state: &AppState, session: &str, urls: &[String]) -> String {
        let analysis = PageAnalysis {
            html_version: "HTML 5".to_string(),
            title: "Stored".to_string(),
            links: urls.iter().map(|u| LinkStatus::unprobed(u.as_str())).collect(),
            internal_count: urls.len(),
            ..Default::default()
        };
        state.sessions.for_session(session).put(analysis)
    }

    #[test]
    fn test_normalize_adds_scheme() {
        let url = normalize_url("example.com/path?q=1").unwrap();
        assert_eq!(url.as_str(), "http://example.com/path?q=1");

        let url = normalize_url("HTTPS://www.example.co.uk").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        assert!(matches!(normalize_url(""), Err(ApiError::MissingUrl)));
        assert!(matches!(normalize_url("   "), Err(ApiError::MissingUrl)));
        assert!(matches!(normalize_url("http://localhost:8080"), Err(ApiError::InvalidUrl)));
        assert!(matches!(normalize_url("127.0.0.1"), Err(ApiError::InvalidUrl)));
        assert!(matches!(normalize_url("http://exa mple.com"), Err(ApiError::InvalidUrl)));
        assert!(matches!(normalize_url("http://co.uk"), Err(ApiError::InvalidUrl)));
    }

    #[tokio::test]
    async fn test_scrape_requires_url() {
        let state = state(10);
        let result = scrape(&state, "default", None).await;
        assert!(matches!(result, Err(ApiError::MissingUrl)));
    }

    #[tokio::test]
    async fn test_scrape_analyses_stores_and_probes_first_page() {
        let server = MockServer::start().await;
        let html = r#"
            <html><head><title>Landing</title></head><body>
              <h1>Welcome</h1>
              <a href="/ok">ok</a>
              <a href="/missing">missing</a>
              <a href="/later">later</a>
              <form><input type="password"></form>
            </body></html>
        "#;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;
        mount(&server, "/ok", 200).await;
        mount(&server, "/missing", 404).await;

        let state = state(2);
        let url = Url::parse(&format!("{}/", server.uri())).unwrap();
        let result = scrape_url(&state, "default", url).await.unwrap();

        assert_eq!(result.pagination.current_page, 1);
        assert_eq!(result.pagination.total_pages, 2);
        assert_eq!(result.pagination.next_page, Some(format!("/scrape/{}/2", result.request_id)));
        assert_eq!(result.scraped.title, "Landing");
        assert_eq!(result.scraped.headings.get("h1"), Some(&1));
        assert!(result.scraped.contains_login_form);
        assert_eq!(result.scraped.total_urls, 3);
        assert_eq!(result.scraped.internal_urls, 3);
        assert_eq!(result.scraped.paginated.inaccessible_urls, 1);
        assert_eq!(result.scraped.paginated.urls[0].http_status, 200);
        assert_eq!(result.scraped.paginated.urls[1].http_status, 404);

        // The stored snapshot keeps its unprobed links
        let stored = state.sessions.for_session("default").get(&result.request_id).unwrap();
        assert!(stored.links.iter().all(|l| l.http_status == 0));
    }

    #[tokio::test]
    async fn test_page_probes_requested_slice() {
        let server = MockServer::start().await;
        mount(&server, "/a", 200).await;
        mount(&server, "/b", 503).await;
        mount(&server, "/c", 200).await;

        let state = state(2);
        let urls: Vec<String> = ["/a", "/b", "/c"]
            .iter()
            .map(|p| format!("{}{}", server.uri(), p))
            .collect();
        let id = stored(&state, "default", &urls);

        let result = page(&state, "default", &id, "2").await.unwrap();
        assert_eq!(result.request_id, id);
        assert_eq!(result.session_id, "default");
        assert_eq!(result.pagination.current_page, 2);
        assert_eq!(result.pagination.prev_page, Some(format!("/scrape/{}/1", id)));
        assert_eq!(result.pagination.next_page, None);
        assert_eq!(result.scraped.paginated.urls.len(), 1);
        assert_eq!(result.scraped.paginated.urls[0].http_status, 200);
        assert_eq!(result.scraped.paginated.inaccessible_urls, 0);
    }

    #[tokio::test]
    async fn test_page_errors() {
        let state = state(2);
        let urls = vec!["http://127.0.0.1:1/".to_string()];
        let id = stored(&state, "default", &urls);

        let missing = page(&state, "default", "missing-id", "1").await;
        assert!(matches!(missing, Err(ApiError::RequestNotFound)));
        let zero = page(&state, "default", &id, "0").await;
        assert!(matches!(zero, Err(ApiError::InvalidPageNumber)));
        let word = page(&state, "default", &id, "abc").await;
        assert!(matches!(word, Err(ApiError::InvalidPageNumber)));
        let past_end = page(&state, "default", &id, "2").await;
        assert!(matches!(past_end, Err(ApiError::PageNotFound)));
        let other_session = page(&state, "other", &id, "1").await;
        assert!(matches!(other_session, Err(ApiError::RequestNotFound)));
    }

    #[tokio::test]
    async fn test_repeated_page_views_probe_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/again"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let state = state(10);
        let id = stored(&state, "default", &[format!("{}/again", server.uri())]);

        page(&state, "default", &id, "1").await.unwrap();
        page(&state, "default", &id, "1").await.unwrap();
        // MockServer verifies the two hits when dropped
    }
}
