//! Core data types for search filters and scraped planning applications.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, RecordParseError};

/// An inclusive calendar-date range. Either boundary may be omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// True when at least one boundary is supplied.
    pub fn is_set(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

/// The date category a search can filter on.
///
/// The portal honours a single category per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateCategory {
    Received,
    Validated,
    Decided,
}

impl DateCategory {
    /// Evaluation order; a later category overwrites an earlier one on the wire.
    pub const ALL: [DateCategory; 3] = [
        DateCategory::Received,
        DateCategory::Validated,
        DateCategory::Decided,
    ];

    /// Value of the portal's `cboSelectDateValue` selector.
    pub fn selector_value(self) -> &'static str {
        match self {
            DateCategory::Received => "DATE_RECEIVED",
            DateCategory::Validated => "DATE_VALID",
            DateCategory::Decided => "DATE_DECISION",
        }
    }
}

/// Caller-supplied search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Free text matched against the proposal description.
    pub keywords: Option<String>,
    #[serde(default)]
    pub received: DateRange,
    #[serde(default)]
    pub validated: DateRange,
    #[serde(default)]
    pub decided: DateRange,
    /// Portal status code, e.g. `"DECIDED"`.
    pub status: Option<String>,
}

impl FilterSpec {
    pub fn range(&self, category: DateCategory) -> &DateRange {
        match category {
            DateCategory::Received => &self.received,
            DateCategory::Validated => &self.validated,
            DateCategory::Decided => &self.decided,
        }
    }

    /// Date categories with at least one boundary set, in evaluation order.
    pub fn active_date_categories(&self) -> Vec<DateCategory> {
        DateCategory::ALL
            .into_iter()
            .filter(|c| self.range(*c).is_set())
            .collect()
    }

    /// Reject filters the portal cannot honour as written.
    pub fn validate(&self) -> Result<(), FilterError> {
        let active = self.active_date_categories();
        if active.len() > 1 {
            return Err(FilterError::ConflictingDateRanges(active));
        }
        Ok(())
    }
}

/// ASP.NET WebForms anti-forgery values scraped from the search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub view_state: String,
    pub event_validation: String,
}

/// One planning application scraped from the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub council_reference: String,
    pub info_url: String,
    pub address: String,
    pub description: String,
    pub status: String,
    pub date_received: Option<NaiveDate>,
    /// Absent when the deployment's results table has no decision column.
    pub decision: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

/// Result of one scrape: the records plus any rows that were skipped.
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    pub records: Vec<ApplicationRecord>,
    pub row_errors: Vec<RecordParseError>,
    /// The rewritten results URL that was fetched.
    pub results_url: String,
}
