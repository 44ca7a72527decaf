// src/models.rs
// =============================================================================
// Data types shared by the analyzer, the prober, the store and the API.
//
// PageAnalysis is built once per scrape and stored as-is. LinkStatus entries
// start unprobed (status 0, no error) and are filled in by the prober on the
// per-request copy handed out by the store.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// The version reported when the root element carries no `version` attribute
pub const DEFAULT_HTML_VERSION: &str = "HTML 5";

/// Reachability record for one discovered link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStatus {
    /// Absolute URL, resolved against the scraped page
    pub url: String,
    /// HTTP status of the last probe, 0 when unprobed or when transport failed
    pub http_status: u16,
    /// Transport failure description, empty unless the probe failed
    pub error: String,
}

impl LinkStatus {
    pub fn unprobed(url: impl Into<String>) -> Self {
        LinkStatus {
            url: url.into(),
            ..Default::default()
        }
    }

    /// A probed link is accessible only with a 2xx status
    pub fn is_accessible(&self) -> bool {
        (200..=299).contains(&self.http_status) && self.error.is_empty()
    }
}

/// Everything the analyzer learns about one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub html_version: String,
    pub title: String,
    /// h1..h6 -> occurrences; tags that never appear are absent
    pub heading_counts: BTreeMap<String, usize>,
    /// Links in document order
    pub links: Vec<LinkStatus>,
    pub internal_count: usize,
    pub external_count: usize,
    pub has_login_form: bool,
}

// -----------------------------------------------------------------------------
// Response shapes
//
// These mirror the JSON the service returns. Field names are the wire names.
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_size: usize,
    pub current_page: usize,
    pub total_pages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedUrls {
    pub inaccessible_urls: usize,
    pub urls: Vec<LinkStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedData {
    pub html_version: String,
    pub title: String,
    pub headings: BTreeMap<String, usize>,
    pub contains_login_form: bool,
    pub total_urls: usize,
    pub internal_urls: usize,
    pub external_urls: usize,
    pub paginated: PaginatedUrls,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub request_id: String,
    pub session_id: String,
    pub pagination: Pagination,
    pub scraped: ScrapedData,
}
