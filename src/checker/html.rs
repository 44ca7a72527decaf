// src/checker/html.rs
// =============================================================================
// This module analyses an HTML page in a single walk over its node tree.
//
// What we collect:
// - HTML version (from a `version` attribute on <html>, else "HTML 5")
// - The text of the first <title>
// - How many h1..h6 headings appear
// - Every <a href> as an absolute URL, classified internal/external
// - Whether any <form> contains a password input (a login form)
//
// We use the `scraper` crate to parse (it's built on html5ever, which
// recovers from any malformed input, so parsing never fails) and walk the
// underlying `ego_tree` nodes ourselves with an explicit stack. An explicit
// stack keeps very deep documents from overflowing the call stack.
// =============================================================================

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node};
use url::Url;

use super::domain::{self, LinkScope};
use crate::models::{LinkStatus, PageAnalysis, DEFAULT_HTML_VERSION};

// The element kinds the analyzer reacts to
//
// Tag names from html5ever are already lowercase, so one match on the name
// decides the kind and the walk below only deals with variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind<'a> {
    Root,
    Heading(&'a str),
    Anchor,
    Form,
    Input,
    Title,
    Other,
}

impl<'a> ElementKind<'a> {
    fn of(name: &'a str) -> Self {
        match name {
            "html" => ElementKind::Root,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => ElementKind::Heading(name),
            "a" => ElementKind::Anchor,
            "form" => ElementKind::Form,
            "input" => ElementKind::Input,
            "title" => ElementKind::Title,
            _ => ElementKind::Other,
        }
    }
}

// Parses `html` and analyses it
//
// Parameters:
//   html: the raw page body
//   base_url: the URL the page was fetched from (for resolving relative links)
pub fn analyze_html(html: &str, base_url: &Url) -> PageAnalysis {
    let document = Html::parse_document(html);
    analyze_document(&document, base_url)
}

// Walks an already parsed document in pre-order, visiting each node once
//
// The document is only read, never modified.
pub fn analyze_document(document: &Html, base_url: &Url) -> PageAnalysis {
    let mut analysis = PageAnalysis {
        html_version: DEFAULT_HTML_VERSION.to_string(),
        ..Default::default()
    };
    let mut title: Option<String> = None;

    let mut stack = vec![document.tree.root()];

    while let Some(node) = stack.pop() {
        if let Node::Element(element) = node.value() {
            match ElementKind::of(element.name()) {
                ElementKind::Root => {
                    if let Some(version) = element.attr("version") {
                        analysis.html_version = version.to_string();
                    }
                }
                ElementKind::Heading(tag) => {
                    *analysis.heading_counts.entry(tag.to_string()).or_insert(0) += 1;
                }
                ElementKind::Anchor => {
                    if let Some(href) = element.attr("href").filter(|href| !href.is_empty()) {
                        record_link(&mut analysis, base_url, href);
                    }
                }
                ElementKind::Form => {
                    // Once set the flag stays set, so later forms needn't be scanned
                    if !analysis.has_login_form && contains_password_input(node) {
                        analysis.has_login_form = true;
                    }
                }
                ElementKind::Title => {
                    if title.is_none() {
                        title = title_text(node);
                    }
                }
                ElementKind::Input | ElementKind::Other => {}
            }
        }

        // Children go on in reverse so the first child is popped next
        stack.extend(node.children().rev());
    }

    analysis.title = title.unwrap_or_default();

    tracing::debug!(
        links = analysis.links.len(),
        internal = analysis.internal_count,
        external = analysis.external_count,
        login_form = analysis.has_login_form,
        "page analysed"
    );

    analysis
}

// Resolves an href, classifies it and appends it to the link list
//
// An href the url crate can't resolve (e.g. "http://[broken") is skipped
// entirely, so the internal + external counts always equal the list length.
fn record_link(analysis: &mut PageAnalysis, base_url: &Url, href: &str) {
    let resolved = match base_url.join(href) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(href, error = %e, "skipping unresolvable href");
            return;
        }
    };

    let classification = domain::classify(base_url, &resolved);
    tracing::trace!(
        url = %resolved,
        scope = ?classification.scope,
        rule = ?classification.rule,
        "classified link"
    );

    match classification.scope {
        LinkScope::Internal => analysis.internal_count += 1,
        LinkScope::External => analysis.external_count += 1,
    }

    analysis.links.push(LinkStatus::unprobed(resolved.as_str()));
}

// Scans everything below a <form> for <input type="password">
//
// The attribute value must be exactly "password" (case-sensitive).
fn contains_password_input(form: NodeRef<'_, Node>) -> bool {
    form.descendants().any(|node| match node.value() {
        Node::Element(element) => {
            ElementKind::of(element.name()) == ElementKind::Input
                && element.attr("type") == Some("password")
        }
        _ => false,
    })
}

// Text inside a <title>, or None when the element is empty
fn title_text(node: NodeRef<'_, Node>) -> Option<String> {
    let text: String = ElementRef::wrap(node)?.text().collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why walk the tree by hand instead of using CSS selectors?
//    - Selectors would need one pass per thing we look for
//    - One walk visits each node once and handles every element kind
//
// 2. What is NodeRef?
//    - A cheap, copyable reference to a node inside an ego_tree::Tree
//    - .children() iterates direct children, .descendants() the whole subtree
//
// 3. Why the ElementKind enum?
//    - The tag name is compared in exactly one place (ElementKind::of)
//    - The compiler checks the match covers every kind
// -----------------------------------------------------------------------------
