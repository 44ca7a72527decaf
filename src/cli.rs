// src/cli.rs
// =============================================================================
// This file defines the service configuration using the `clap` crate.
//
// Every setting can be given as a flag or through an environment variable,
// and falls back to a default when neither is present. Values clap can't
// parse (e.g. a page size or timeout of 0) stop the service at startup.
// =============================================================================

use clap::builder::RangedU64ValueParser;
use clap::Parser;
use std::time::Duration;

use crate::checker::ProbeOptions;

#[derive(Parser, Debug)]
#[command(
    name = "page-inspector",
    version,
    about = "Scrapes a web page, summarises its markup and checks its links page by page",
    long_about = "page-inspector serves an HTTP API: GET /scrape?url=... analyses a page and \
                  checks its first page of links, GET /scrape/<id>/<page> checks the next ones."
)]
pub struct Cli {
    /// Port the HTTP server listens on
    #[arg(long, env = "APP_PORT", default_value_t = 8080)]
    pub port: u16,

    /// How many links make up one page of results
    #[arg(
        long,
        env = "URL_STATUS_CHECK_PAGE_SIZE",
        default_value_t = 10,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub page_size: usize,

    /// Seconds allowed for fetching the page being scraped
    #[arg(
        long,
        env = "OUT_GOING_SCRAPE_REQ_TIMEOUT",
        default_value_t = 30,
        value_parser = RangedU64ValueParser::<u64>::new().range(1..)
    )]
    pub scrape_timeout: u64,

    /// Seconds allowed for each link accessibility check
    #[arg(
        long,
        env = "OUT_GOING_URL_ACCESSIBILITY_CHECK_TIMEOUT",
        default_value_t = 10,
        value_parser = RangedU64ValueParser::<u64>::new().range(1..)
    )]
    pub probe_timeout: u64,

    /// Cap on link checks in flight at once (default: a whole page at once)
    #[arg(
        long,
        env = "MAX_CONCURRENT_PROBES",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_concurrent_probes: Option<usize>,

    /// Verify TLS certificates (by default invalid certificates are accepted)
    #[arg(long, env = "STRICT_TLS")]
    pub strict_tls: bool,
}

// Runtime settings derived from the command line
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub page_size: usize,
    pub scrape_timeout: Duration,
    pub probe_timeout: Duration,
    pub max_concurrent_probes: Option<usize>,
    pub strict_tls: bool,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            port: self.port,
            page_size: self.page_size,
            scrape_timeout: Duration::from_secs(self.scrape_timeout),
            probe_timeout: Duration::from_secs(self.probe_timeout),
            max_concurrent_probes: self.max_concurrent_probes,
            strict_tls: self.strict_tls,
        }
    }
}

impl Settings {
    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            timeout: self.probe_timeout,
            max_concurrent: self.max_concurrent_probes,
        }
    }
}
