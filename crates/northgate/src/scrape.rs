//! Record assembly and the top-level scrape entry points.

use chrono::Utc;
use tracing::{info, warn};
use url::Url;

use crate::driver::NorthgateClient;
use crate::error::ScrapeResult;
use crate::options::ScraperOptions;
use crate::parser::{parse_results, ParsedTable};
use crate::types::{ApplicationRecord, FilterSpec, ScrapeReport};
use crate::url_norm;

impl NorthgateClient {
    /// Search the portal at `search_url` and return every matching record.
    pub async fn scrape(&self, search_url: &str, filter: &FilterSpec) -> ScrapeResult<ScrapeReport> {
        let page = self.fetch_results_page(search_url, filter).await?;
        let generic = url_norm::generic_base(&url_norm::parse(search_url)?)?;
        Ok(scrape_html(&page.html, &generic, page.url.as_str()))
    }
}

/// Search one portal with a fresh client.
///
/// Fatal protocol failures are returned as errors. Rows that fail to parse
/// are skipped and listed in [`ScrapeReport::row_errors`].
pub async fn scrape(
    search_url: &str,
    filter: &FilterSpec,
    options: &ScraperOptions,
) -> ScrapeResult<ScrapeReport> {
    NorthgateClient::new(options.clone())?
        .scrape(search_url, filter)
        .await
}

/// Parse an already-fetched results page and assemble records.
pub fn scrape_html(html: &str, generic_base: &Url, results_url: &str) -> ScrapeReport {
    let table = parse_results(html, generic_base);
    info!(
        "found {} applications in search results",
        table.data_row_count()
    );
    assemble(table, results_url)
}

/// Timestamp parsed rows into records. Row errors are logged and carried
/// through unchanged.
pub fn assemble(table: ParsedTable, results_url: &str) -> ScrapeReport {
    for e in &table.errors {
        warn!(row = e.row(), "skipping results row: {e}");
    }

    let records = table
        .rows
        .into_iter()
        .map(|row| ApplicationRecord {
            council_reference: row.council_reference,
            info_url: row.info_url,
            address: row.address,
            description: row.description,
            status: row.status,
            date_received: row.date_received,
            decision: row.decision,
            scraped_at: Utc::now(),
        })
        .collect();

    ScrapeReport {
        records,
        row_errors: table.errors,
        results_url: results_url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordParseError;
    use crate::parser::ParsedRow;

    fn parsed(reference: &str) -> ParsedRow {
        ParsedRow {
            council_reference: reference.to_string(),
            info_url: format!("https://example.gov.uk/Generic/StdDetails.aspx?PARAM0={reference}"),
            address: "1 High Street".to_string(),
            description: "Extension".to_string(),
            status: "Registered".to_string(),
            date_received: None,
            decision: None,
        }
    }

    #[test]
    fn test_assemble_stamps_and_keeps_order() {
        let before = Utc::now();
        let table = ParsedTable {
            rows: vec![parsed("A"), parsed("B")],
            errors: vec![RecordParseError::MissingLink { row: 2 }],
        };
        let report = assemble(table, "https://example.gov.uk/r?PS=99999");
        let after = Utc::now();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].council_reference, "A");
        assert_eq!(report.records[1].council_reference, "B");
        for r in &report.records {
            assert!(r.scraped_at >= before && r.scraped_at <= after);
        }
        assert_eq!(report.row_errors.len(), 1);
        assert_eq!(report.results_url, "https://example.gov.uk/r?PS=99999");
    }

    #[test]
    fn test_scrape_html_empty_page() {
        let generic = Url::parse("https://example.gov.uk/Generic/").unwrap();
        let report = scrape_html("<html></html>", &generic, "u");
        assert!(report.records.is_empty());
        assert!(report.row_errors.is_empty());
    }
}
