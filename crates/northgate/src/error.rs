//! Error types for the scrape workflow.
//!
//! [`ScrapeError`] aborts a whole scrape. [`RecordParseError`] is scoped to a
//! single results row and never aborts anything.

use crate::types::DateCategory;

/// Errors that abort a scrape.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("Search page unavailable: HTTP {status}")]
    SearchPageUnavailable { status: u16 },

    #[error("Search page has no {field} token")]
    MissingToken { field: &'static str },

    #[error("Search was not redirected: HTTP {status}")]
    SearchNotRedirected { status: u16 },

    #[error("Search redirect has no Location header")]
    MissingRedirectLocation,

    #[error("Results page unavailable: HTTP {status}")]
    ResultsPageUnavailable { status: u16 },

    #[error("Invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid request header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScrapeError {
    /// Stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::SearchPageUnavailable { .. } => "search_page_unavailable",
            ScrapeError::MissingToken { .. } => "missing_token",
            ScrapeError::SearchNotRedirected { .. } => "search_not_redirected",
            ScrapeError::MissingRedirectLocation => "missing_redirect_location",
            ScrapeError::ResultsPageUnavailable { .. } => "results_page_unavailable",
            ScrapeError::InvalidUrl { .. } => "invalid_url",
            ScrapeError::InvalidHeader(_) => "invalid_header",
            ScrapeError::Http(_) => "http",
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// A results row that could not be turned into a record.
///
/// `row` is the zero-based index among data rows (the header row is not
/// counted).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordParseError {
    #[error("Row {row}: expected at least {expected} cells, found {found}")]
    MissingColumns {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}: reference cell has no link")]
    MissingLink { row: usize },

    #[error("Row {row}: invalid detail link {href:?}")]
    InvalidLink { row: usize, href: String },

    #[error("Row {row}: unparseable date received {value:?}")]
    InvalidDate { row: usize, value: String },
}

impl RecordParseError {
    pub fn row(&self) -> usize {
        match self {
            RecordParseError::MissingColumns { row, .. }
            | RecordParseError::MissingLink { row }
            | RecordParseError::InvalidLink { row, .. }
            | RecordParseError::InvalidDate { row, .. } => *row,
        }
    }
}

/// Caller input the portal cannot honour.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Only one date range can be filtered per search, got {0:?}")]
    ConflictingDateRanges(Vec<DateCategory>),
}
