// src/api/pagination.rs
// =============================================================================
// Pagination maths and response assembly.
//
// Nothing here does I/O: it only slices the link list and fills in the
// response shape.
// =============================================================================

use std::ops::Range;

use crate::models::{PageAnalysis, PageResult, PaginatedUrls, Pagination, ScrapedData};

/// Number of pages needed for `total` links, `ceil(total / page_size)`.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size)
}

/// Index range of links shown on `page` (1-based).
///
/// Returns None when the page starts at or after the end of the list.
pub fn page_bounds(page: usize, total: usize, page_size: usize) -> Option<Range<usize>> {
    let start = page.checked_sub(1)?.checked_mul(page_size)?;
    if start >= total {
        return None;
    }
    let end = start.saturating_add(page_size).min(total);
    Some(start..end)
}

pub fn page_path(request_id: &str, page: usize) -> String {
    format!("/scrape/{}/{}", request_id, page)
}

/// Inputs for one assembled page.
pub struct PageContext<'a> {
    pub request_id: &'a str,
    pub session_id: &'a str,
    pub page: usize,
    pub page_size: usize,
    pub bounds: Range<usize>,
    pub inaccessible: usize,
}

/// Merges the analysis, the probed slice and pagination pointers.
pub fn build_page(ctx: PageContext<'_>, analysis: &PageAnalysis) -> PageResult {
    let total = analysis.links.len();
    let end = ctx.bounds.end.min(total);
    let start = ctx.bounds.start.min(end);

    let prev_page = (ctx.page > 1).then(|| page_path(ctx.request_id, ctx.page - 1));
    let next_page = (end < total).then(|| page_path(ctx.request_id, ctx.page + 1));

    PageResult {
        request_id: ctx.request_id.to_string(),
        session_id: ctx.session_id.to_string(),
        pagination: Pagination {
            page_size: ctx.page_size,
            current_page: ctx.page,
            total_pages: total_pages(total, ctx.page_size),
            prev_page,
            next_page,
        },
        scraped: ScrapedData {
            html_version: analysis.html_version.clone(),
            title: analysis.title.clone(),
            headings: analysis.heading_counts.clone(),
            contains_login_form: analysis.has_login_form,
            total_urls: total,
            internal_urls: analysis.internal_count,
            external_urls: analysis.external_count,
            paginated: PaginatedUrls {
                inaccessible_urls: ctx.inaccessible,
                urls: analysis.links[start..end].to_vec(),
            },
        },
    }
}
