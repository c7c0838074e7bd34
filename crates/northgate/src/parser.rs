//! Results table parsing.
//!
//! Walks `table.display_table` in document order. A row is a data row iff
//! it has at least one `<td>`; the header row only has `<th>` cells.
//!
//! Column layout, fixed across the portal family:
//!
//! | # | field |
//! |---|-------|
//! | 0 | council reference, with the detail link |
//! | 1 | address |
//! | 2 | description |
//! | 3 | status |
//! | 4 | date received (`--` when unknown) |
//! | 5 | decision (missing on some deployments) |
//!
//! Rows that cannot be parsed are skipped and reported; they never abort
//! the rest of the table.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::RecordParseError;
use crate::url_norm;

/// Selector for every row of the results table, header included.
pub const RESULTS_ROW_SELECTOR: &str = "table.display_table tr";

/// Shown in the date column when the portal has no date.
pub const DATE_PLACEHOLDER: &str = "--";

/// Columns every data row must have. The decision column is optional.
const REQUIRED_COLUMNS: usize = 5;

const COL_REFERENCE: usize = 0;
const COL_ADDRESS: usize = 1;
const COL_DESCRIPTION: usize = 2;
const COL_STATUS: usize = 3;
const COL_DATE_RECEIVED: usize = 4;
const COL_DECISION: usize = 5;

/// Date formats seen in the date-received column, tried in order.
const DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d", "%d %b %Y", "%d %B %Y"];

/// One data row, before it is timestamped into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub council_reference: String,
    pub info_url: String,
    pub address: String,
    pub description: String,
    pub status: String,
    pub date_received: Option<NaiveDate>,
    pub decision: Option<String>,
}

/// Everything parsed out of one results page.
#[derive(Debug, Clone, Default)]
pub struct ParsedTable {
    /// Successfully parsed rows in document order.
    pub rows: Vec<ParsedRow>,
    /// Rows that were skipped.
    pub errors: Vec<RecordParseError>,
}

impl ParsedTable {
    /// Number of data rows seen, parsed or not.
    pub fn data_row_count(&self) -> usize {
        self.rows.len() + self.errors.len()
    }
}

/// Parse the results page. Detail links are resolved against
/// `generic_base` (see [`url_norm::generic_base`]).
pub fn parse_results(html: &str, generic_base: &Url) -> ParsedTable {
    let document = Html::parse_document(html);
    let row_sel = Selector::parse(RESULTS_ROW_SELECTOR).expect("row selector is valid");
    let cell_sel = Selector::parse("td").expect("cell selector is valid");

    let mut table = ParsedTable::default();
    let mut index = 0usize;

    for row in document.select(&row_sel) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
        if cells.is_empty() {
            continue;
        }

        match parse_row(index, &cells, generic_base) {
            Ok(parsed) => table.rows.push(parsed),
            Err(e) => table.errors.push(e),
        }
        index += 1;
    }

    table
}

fn parse_row(
    row: usize,
    cells: &[ElementRef<'_>],
    generic_base: &Url,
) -> Result<ParsedRow, RecordParseError> {
    if cells.len() < REQUIRED_COLUMNS {
        return Err(RecordParseError::MissingColumns {
            row,
            expected: REQUIRED_COLUMNS,
            found: cells.len(),
        });
    }

    let reference_cell = &cells[COL_REFERENCE];
    let href = link_href(reference_cell).ok_or(RecordParseError::MissingLink { row })?;
    let info_url = url_norm::detail_url(generic_base, href)
        .map_err(|_| RecordParseError::InvalidLink {
            row,
            href: href.to_string(),
        })?
        .to_string();

    let raw_date = element_text(&cells[COL_DATE_RECEIVED]);
    let date_received = if raw_date == DATE_PLACEHOLDER {
        None
    } else {
        Some(parse_date(&raw_date).ok_or(RecordParseError::InvalidDate {
            row,
            value: raw_date.clone(),
        })?)
    };

    Ok(ParsedRow {
        council_reference: element_text(reference_cell),
        info_url,
        address: element_text(&cells[COL_ADDRESS]),
        description: element_text(&cells[COL_DESCRIPTION]),
        status: element_text(&cells[COL_STATUS]),
        date_received,
        decision: cells.get(COL_DECISION).map(element_text),
    })
}

/// Parse a date-received cell.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn link_href<'a>(cell: &ElementRef<'a>) -> Option<&'a str> {
    let sel = Selector::parse("a[href]").expect("link selector is valid");
    cell.select(&sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
}

/// Collect all text content from an element, trimmed and
/// whitespace-collapsed.
fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
