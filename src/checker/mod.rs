// src/checker/mod.rs
// =============================================================================
// This module contains the page analysis and link checking logic.
//
// Submodules:
// - html: Walks a parsed page and collects its metadata and links
// - domain: Decides whether a link is internal or external
// - http: Fetches pages and probes links concurrently
//
// This file (mod.rs) is the module root - it re-exports the public API so
// the rest of the application can write `checker::probe_links()`.
// =============================================================================

mod domain;
mod html;
mod http;

pub use domain::registrable_domain;
pub use html::analyze_html;
pub use http::{build_client, fetch_document, probe_links, FetchError, ProbeOptions};
