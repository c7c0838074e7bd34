//! Search form construction.
//!
//! [`SearchForm`] keeps the portal's field-naming quirks out of the rest of
//! the crate. It is converted to wire-level [`FormVariables`] only when the
//! search is submitted.

use chrono::NaiveDate;
use tracing::warn;

use crate::types::{DateCategory, FilterSpec, SessionTokens};

pub const FIELD_SUBMIT: &str = "csbtnSearch";
pub const FIELD_PROPOSAL: &str = "txtProposal";
pub const FIELD_DATE_MODE: &str = "cboSelectDateValue";
pub const FIELD_RANGE_MODE: &str = "rbGroup";
pub const FIELD_DATE_START: &str = "dateStart";
pub const FIELD_DATE_END: &str = "dateEnd";
pub const FIELD_STATUS: &str = "cboStatusCode";
pub const FIELD_VIEW_STATE: &str = "__VIEWSTATE";
pub const FIELD_EVENT_VALIDATION: &str = "__EVENTVALIDATION";

const SUBMIT_VALUE: &str = "Search";
const RANGE_MODE_VALUE: &str = "rbRange";

/// Wire-format date, e.g. `2020-01-31`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ordered field name/value pairs for the search POST body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormVariables(Vec<(String, String)>);

impl FormVariables {
    /// Value of the named field, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a field, replacing any existing value in place.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    /// Attach the anti-forgery tokens scraped from the search page.
    pub fn with_tokens(mut self, tokens: &SessionTokens) -> Self {
        self.set(FIELD_VIEW_STATE, tokens.view_state.as_str());
        self.set(FIELD_EVENT_VALIDATION, tokens.event_validation.as_str());
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Typed view of the Northgate general-search form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchForm {
    pub proposal: Option<String>,
    /// Which date category to filter on. Implies range mode.
    pub date_mode: Option<DateCategory>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub status_code: Option<String>,
}

impl SearchForm {
    /// Translate caller criteria into form fields.
    ///
    /// Date categories are applied in received, validated, decided order.
    /// Each one overwrites the date mode and whichever boundaries it
    /// supplies, so with more than one category set the result mixes them.
    /// [`FilterSpec::validate`] rejects that input up front.
    pub fn from_filter(filter: &FilterSpec) -> Self {
        let active = filter.active_date_categories();
        if active.len() > 1 {
            warn!(
                categories = ?active,
                "portal honours one date range per search; later ranges overwrite earlier ones"
            );
        }

        let mut form = SearchForm {
            proposal: filter.keywords.clone(),
            status_code: filter.status.clone(),
            ..Default::default()
        };

        for category in active {
            let range = filter.range(category);
            form.date_mode = Some(category);
            if let Some(from) = range.from {
                form.date_start = Some(from);
            }
            if let Some(to) = range.to {
                form.date_end = Some(to);
            }
        }

        form
    }

    /// Wire-level fields, without session tokens.
    pub fn to_variables(&self) -> FormVariables {
        let mut vars = FormVariables::default();
        vars.set(FIELD_SUBMIT, SUBMIT_VALUE);

        if let Some(proposal) = &self.proposal {
            vars.set(FIELD_PROPOSAL, proposal.as_str());
        }

        if let Some(mode) = self.date_mode {
            vars.set(FIELD_DATE_MODE, mode.selector_value());
            vars.set(FIELD_RANGE_MODE, RANGE_MODE_VALUE);
            if let Some(start) = self.date_start {
                vars.set(FIELD_DATE_START, start.format(DATE_FORMAT).to_string());
            }
            if let Some(end) = self.date_end {
                vars.set(FIELD_DATE_END, end.format(DATE_FORMAT).to_string());
            }
        }

        if let Some(status) = &self.status_code {
            vars.set(FIELD_STATUS, status.as_str());
        }

        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DateRange;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_no_dates_omits_date_fields() {
        let filter = FilterSpec {
            keywords: Some("extension".to_string()),
            ..Default::default()
        };
        let vars = SearchForm::from_filter(&filter).to_variables();

        assert_eq!(vars.get(FIELD_SUBMIT), Some("Search"));
        assert_eq!(vars.get(FIELD_PROPOSAL), Some("extension"));
        for field in [FIELD_DATE_MODE, FIELD_RANGE_MODE, FIELD_DATE_START, FIELD_DATE_END] {
            assert!(!vars.contains(field), "{field} should be absent");
        }
    }

    #[test]
    fn test_empty_filter_only_has_submit_marker() {
        let vars = SearchForm::from_filter(&FilterSpec::default()).to_variables();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get(FIELD_SUBMIT), Some("Search"));
    }

    #[test]
    fn test_received_from_only() {
        let filter = FilterSpec {
            received: DateRange::new(Some(date("2020-01-01")), None),
            ..Default::default()
        };
        let vars = SearchForm::from_filter(&filter).to_variables();

        assert_eq!(vars.get(FIELD_DATE_MODE), Some("DATE_RECEIVED"));
        assert_eq!(vars.get(FIELD_RANGE_MODE), Some("rbRange"));
        assert_eq!(vars.get(FIELD_DATE_START), Some("2020-01-01"));
        assert!(!vars.contains(FIELD_DATE_END));
    }

    #[test]
    fn test_validated_and_decided_selectors() {
        let filter = FilterSpec {
            validated: DateRange::new(None, Some(date("2021-06-30"))),
            ..Default::default()
        };
        let vars = SearchForm::from_filter(&filter).to_variables();
        assert_eq!(vars.get(FIELD_DATE_MODE), Some("DATE_VALID"));
        assert_eq!(vars.get(FIELD_DATE_END), Some("2021-06-30"));
        assert!(!vars.contains(FIELD_DATE_START));

        let filter = FilterSpec {
            decided: DateRange::new(Some(date("2021-01-01")), Some(date("2021-02-01"))),
            ..Default::default()
        };
        let vars = SearchForm::from_filter(&filter).to_variables();
        assert_eq!(vars.get(FIELD_DATE_MODE), Some("DATE_DECISION"));
        assert_eq!(vars.get(FIELD_DATE_START), Some("2021-01-01"));
        assert_eq!(vars.get(FIELD_DATE_END), Some("2021-02-01"));
    }

    #[test]
    fn test_later_category_overwrites_selector() {
        let filter = FilterSpec {
            received: DateRange::new(Some(date("2020-01-01")), Some(date("2020-02-01"))),
            decided: DateRange::new(Some(date("2020-03-01")), None),
            ..Default::default()
        };
        let vars = SearchForm::from_filter(&filter).to_variables();

        assert_eq!(vars.get(FIELD_DATE_MODE), Some("DATE_DECISION"));
        assert_eq!(vars.get(FIELD_DATE_START), Some("2020-03-01"));
        // decided_to was not supplied, so received_to survives
        assert_eq!(vars.get(FIELD_DATE_END), Some("2020-02-01"));
        assert!(filter.validate().is_err());
    }

    #[test]
    fn test_dates_not_reordered() {
        let filter = FilterSpec {
            received: DateRange::new(Some(date("2022-12-31")), Some(date("2022-01-01"))),
            ..Default::default()
        };
        let vars = SearchForm::from_filter(&filter).to_variables();
        assert_eq!(vars.get(FIELD_DATE_START), Some("2022-12-31"));
        assert_eq!(vars.get(FIELD_DATE_END), Some("2022-01-01"));
    }

    #[test]
    fn test_status_code_field() {
        let filter = FilterSpec {
            status: Some("DECIDED".to_string()),
            ..Default::default()
        };
        let vars = SearchForm::from_filter(&filter).to_variables();
        assert_eq!(vars.get(FIELD_STATUS), Some("DECIDED"));
    }

    #[test]
    fn test_with_tokens_appends_both() {
        let tokens = SessionTokens {
            view_state: "vs1".to_string(),
            event_validation: "ev1".to_string(),
        };
        let vars = SearchForm::default().to_variables().with_tokens(&tokens);
        assert_eq!(vars.get(FIELD_VIEW_STATE), Some("vs1"));
        assert_eq!(vars.get(FIELD_EVENT_VALIDATION), Some("ev1"));
        assert_eq!(vars.pairs()[0].0, FIELD_SUBMIT);
    }
}
