// src/checker/domain.rs
// =============================================================================
// This module decides whether a discovered link is internal or external.
//
// The rule:
// 1. Reduce both hosts (the scraped page and the link) to their registrable
//    domain, e.g. "www.example.co.uk" -> "example.co.uk"
// 2. Equal registrable domains (ignoring case) = internal link
// 3. If either host has no registrable domain (IP address, single label like
//    "localhost", no host at all), fall back to comparing the hosts exactly
//
// The public suffix list comes from the `psl` crate, which compiles the list
// into the binary so lookups never touch the network.
// =============================================================================

use url::{Host, Url};

// Which side of the site boundary a link falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkScope {
    Internal,
    External,
}

// Which comparison produced the decision
//
// Kept on the result so callers (and logs) can tell the two rules apart:
// they disagree on hosts the suffix list cannot resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    RegistrableDomain,
    HostEquality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub scope: LinkScope,
    pub rule: MatchRule,
}

// Reduces a URL's host to its registrable domain (eTLD+1), lowercased
//
// Returns None for:
//   - URLs without a host (mailto:, data:, ...)
//   - IPv4 / IPv6 literals
//   - hosts the suffix list can't reduce ("localhost", "co.uk")
//
// Examples:
//   "https://www.example.co.uk/page" -> Some("example.co.uk")
//   "http://blog.example.com" -> Some("example.com")
//   "http://127.0.0.1:8080" -> None
pub fn registrable_domain(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            // Single-label hosts have no owner below a public suffix
            if !domain.contains('.') {
                return None;
            }
            psl::domain_str(&domain).map(str::to_string)
        }
        Host::Ipv4(_) | Host::Ipv6(_) => None,
    }
}

// Classifies `candidate` relative to the page it was found on
pub fn classify(base: &Url, candidate: &Url) -> Classification {
    if let (Some(base_domain), Some(candidate_domain)) =
        (registrable_domain(base), registrable_domain(candidate))
    {
        return Classification {
            scope: scope_of(base_domain.eq_ignore_ascii_case(&candidate_domain)),
            rule: MatchRule::RegistrableDomain,
        };
    }

    // Suffix lookup failed for one side, compare the raw hosts instead
    let same_host = match (base.host_str(), candidate.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    };

    tracing::debug!(
        base = %base,
        candidate = %candidate,
        internal = same_host,
        "registrable domain unavailable, classified by host equality"
    );

    Classification {
        scope: scope_of(same_host),
        rule: MatchRule::HostEquality,
    }
}

fn scope_of(internal: bool) -> LinkScope {
    if internal {
        LinkScope::Internal
    } else {
        LinkScope::External
    }
}
