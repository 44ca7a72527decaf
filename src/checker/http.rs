// src/checker/http.rs
// =============================================================================
// This module does all outgoing HTTP: fetching the page we analyse and
// probing its links for reachability.
//
// Key functionality:
// - Builds the one shared reqwest client (connection pooling)
// - Fetches a page body and sorts failures into timeout / unreachable / other
// - Probes a range of links concurrently with one GET per link
//
// Probing writes each result straight into its own LinkStatus. Every probe
// owns a different element of the slice, so the only shared state is the
// inaccessible counter, which is an atomic.
// =============================================================================

use futures::stream::{self, StreamExt}; // StreamExt gives us .for_each_concurrent()
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::models::LinkStatus;

// Why fetching the page itself failed
//
// Each variant surfaces to the caller as a different response.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },
    #[error("could not connect to {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to fetch {url}: {source}")]
    Other {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            FetchError::Timeout { url }
        } else if error.is_connect() {
            FetchError::Unreachable { url, source: error }
        } else {
            FetchError::Other { url, source: error }
        }
    }
}

// Settings for one probe batch
#[derive(Debug, Clone, Copy)]
pub struct ProbeOptions {
    /// Deadline for each individual probe
    pub timeout: Duration,
    /// Maximum probes in flight at once; None = the whole range at once
    pub max_concurrent: Option<usize>,
}

// Builds the HTTP client shared by every request
//
// Timeouts are set per request (fetch and probe use different ones), so
// the client itself has none.
pub fn build_client(strict_tls: bool) -> reqwest::Result<Client> {
    Client::builder()
        .danger_accept_invalid_certs(!strict_tls)
        .redirect(reqwest::redirect::Policy::limited(10))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

// Fetches a page and returns its body
//
// The body is returned whatever the status code: an error page is still a
// page we can analyse.
pub async fn fetch_document(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    tracing::debug!(url, status = response.status().as_u16(), "fetched page");

    response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))
}

// Probes links[start..end] and returns how many are inaccessible
//
// Indices outside the range are never touched. The range is clamped to the
// slice, so an end past the last link just stops at the last link.
//
// The call returns only after every probe in the range has a result.
//
// Note: with max_concurrent = None every link in the range is requested at
// once. The range is one pagination page, so this is bounded by page size.
pub async fn probe_links(
    client: &Client,
    links: &mut [LinkStatus],
    start: usize,
    end: usize,
    options: ProbeOptions,
) -> usize {
    let end = end.min(links.len());
    let start = start.min(end);

    let inaccessible = AtomicUsize::new(0);
    let counter = &inaccessible;

    stream::iter(links[start..end].iter_mut())
        .for_each_concurrent(options.max_concurrent, |link| async move {
            if !probe_single_link(client, link, options.timeout).await {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        })
        .await;

    let count = inaccessible.into_inner();
    tracing::info!(start, end, inaccessible = count, "probed links");
    count
}

// Issues one GET and records the outcome on the link
//
// Returns true when the link is accessible (2xx)
async fn probe_single_link(client: &Client, link: &mut LinkStatus, timeout: Duration) -> bool {
    link.http_status = 0;
    link.error.clear();

    match client.get(&link.url).timeout(timeout).send().await {
        Ok(response) => {
            link.http_status = response.status().as_u16();
            if !link.is_accessible() {
                tracing::debug!(url = %link.url, status = link.http_status, "link not accessible");
            }
            link.is_accessible()
        }
        Err(e) => {
            tracing::debug!(url = %link.url, error = %e, "link probe failed");
            link.error = e.to_string();
            false
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is for_each_concurrent?
//    - Runs a future for every item of a stream, many at the same time
//    - Its limit argument caps how many run at once (None = no cap)
//    - It finishes only when every future has finished
//
// 2. How can several futures mutate the same slice?
//    - iter_mut() hands out one &mut LinkStatus per element
//    - The borrow checker knows these never overlap, so no lock is needed
//
// 3. Why AtomicUsize for the counter?
//    - It's the one value every probe writes to
//    - fetch_add is a lock-free increment that is safe to share
// -----------------------------------------------------------------------------
