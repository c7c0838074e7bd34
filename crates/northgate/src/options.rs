//! Scraper configuration.

use std::time::Duration;

use crate::url_norm::SHOW_ALL_PAGE_SIZE;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for one scrape. Nothing here is shared between scrapes.
#[derive(Debug, Clone)]
pub struct ScraperOptions {
    /// Applied as both the connect timeout and the whole-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
    /// Value written to the results URL's page-size parameter.
    pub page_size: u32,
    /// Require HTTP 200 from the final results fetch.
    pub check_results_status: bool,
}

impl Default for ScraperOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            page_size: SHOW_ALL_PAGE_SIZE,
            check_results_status: true,
        }
    }
}

pub fn default_user_agent() -> String {
    format!("northgate/{}", env!("CARGO_PKG_VERSION"))
}
