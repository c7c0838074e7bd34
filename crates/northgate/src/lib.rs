//! Northgate: planning-application scraper for Northgate Planning Explorer
//! portals.
//!
//! A search is three sequential requests: GET the search page for its
//! WebForms tokens and cookies, POST the search form, then GET the
//! redirect target with the page size forced high enough to return every
//! result at once. The results table is parsed into [`ApplicationRecord`]s.
//!
//! ```no_run
//! use northgate::{scrape, FilterSpec, ScraperOptions};
//!
//! tokio_test::block_on(async {
//!     let filter = FilterSpec {
//!         keywords: Some("extension".to_string()),
//!         ..Default::default()
//!     };
//!     let report = scrape(
//!         "https://planning.example.gov.uk/Northgate/PlanningExplorer/GeneralSearch.aspx",
//!         &filter,
//!         &ScraperOptions::default(),
//!     )
//!     .await
//!     .expect("scrape failed");
//!     for app in &report.records {
//!         println!("{} {}", app.council_reference, app.address);
//!     }
//! });
//! ```

pub mod cookies;
pub mod driver;
pub mod error;
pub mod form;
pub mod http_client;
pub mod options;
pub mod parser;
pub mod scrape;
pub mod tokens;
pub mod types;
pub mod url_norm;

pub use cookies::CookieJar;
pub use driver::{NorthgateClient, ResultsPage, SearchSession};
pub use error::{FilterError, RecordParseError, ScrapeError, ScrapeResult};
pub use form::{FormVariables, SearchForm};
pub use options::ScraperOptions;
pub use parser::parse_results;
pub use scrape::{scrape, scrape_html};
pub use tokens::extract_session_tokens;
pub use types::*;
