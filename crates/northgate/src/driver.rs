//! Search submission: the GET → POST → redirect-GET protocol.
//!
//! All state a search needs (headers, cookies, tokens) lives in a
//! [`SearchSession`] created fresh for each search. The three requests are
//! strictly sequential because each one depends on the previous response.
//! Nothing is retried.

use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER};
use tracing::{debug, info};
use url::Url;

use crate::cookies::CookieJar;
use crate::error::{ScrapeError, ScrapeResult};
use crate::form::{FormVariables, SearchForm};
use crate::http_client::HttpClient;
use crate::options::ScraperOptions;
use crate::tokens::extract_session_tokens;
use crate::types::{FilterSpec, SessionTokens};
use crate::url_norm;

/// Raw results page returned by a successful search.
#[derive(Debug, Clone)]
pub struct ResultsPage {
    /// The rewritten URL that was fetched.
    pub url: Url,
    /// HTTP status of the final fetch.
    pub status: u16,
    pub html: String,
}

/// Per-search state. Never shared between searches.
#[derive(Debug, Clone)]
pub struct SearchSession {
    search_url: Url,
    headers: HeaderMap,
    cookies: CookieJar,
}

impl SearchSession {
    /// Start a session for `search_url`. `Origin` and `Referer` are pinned
    /// to the portal origin and the search page for every request.
    pub fn new(search_url: &str) -> ScrapeResult<Self> {
        let search_url = url_norm::parse(search_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_str(&url_norm::origin(&search_url))?);
        headers.insert(REFERER, HeaderValue::from_str(search_url.as_str())?);

        Ok(Self {
            search_url,
            headers,
            cookies: CookieJar::new(),
        })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Step 1: load the search page, capture its cookies and tokens.
    pub async fn open(&mut self, http: &HttpClient) -> ScrapeResult<SessionTokens> {
        debug!(headers = ?self.headers, "request headers");
        debug!("GET: {}", self.search_url);
        let resp = http
            .get(self.search_url.as_str(), &self.headers, &self.cookies)
            .await?;
        debug!("response code: HTTP {}", resp.status);

        if resp.status != 200 {
            return Err(ScrapeError::SearchPageUnavailable {
                status: resp.status,
            });
        }

        let tokens = extract_session_tokens(&resp.body)?;
        self.cookies = CookieJar::from_headers(&self.search_url, &resp.headers);
        debug!(cookies = self.cookies.len(), "captured session cookies");
        Ok(tokens)
    }

    /// Step 2: POST the search form and return the redirect `Location`.
    /// An absent or blank `Location` is [`ScrapeError::MissingRedirectLocation`].
    ///
    /// Only the status code is inspected. A 200 carrying a validation-error
    /// page therefore surfaces as [`ScrapeError::SearchNotRedirected`].
    pub async fn submit(&self, http: &HttpClient, vars: &FormVariables) -> ScrapeResult<String> {
        debug!("POST: {}", self.search_url);
        let resp = http
            .post_form(
                self.search_url.as_str(),
                vars.pairs(),
                &self.headers,
                &self.cookies,
            )
            .await?;
        debug!("response code: HTTP {}", resp.status);

        if resp.status != 302 {
            return Err(ScrapeError::SearchNotRedirected {
                status: resp.status,
            });
        }

        let location = resp
            .location()
            .ok_or(ScrapeError::MissingRedirectLocation)?;
        debug!("Location: {location}");
        Ok(location)
    }

    /// Step 3: fetch the rewritten results URL.
    pub async fn fetch_results(
        &self,
        http: &HttpClient,
        results_url: Url,
        check_status: bool,
    ) -> ScrapeResult<ResultsPage> {
        debug!("GET: {results_url}");
        let resp = http
            .get(results_url.as_str(), &self.headers, &self.cookies)
            .await?;
        debug!("response code: HTTP {}", resp.status);

        if check_status && resp.status != 200 {
            return Err(ScrapeError::ResultsPageUnavailable {
                status: resp.status,
            });
        }

        Ok(ResultsPage {
            url: results_url,
            status: resp.status,
            html: resp.body,
        })
    }
}

/// Drives searches against one or more Northgate portals.
///
/// Holds only the HTTP client and options; every search gets its own
/// [`SearchSession`], so concurrent searches on one client share no state.
#[derive(Clone)]
pub struct NorthgateClient {
    http: HttpClient,
    options: ScraperOptions,
}

impl NorthgateClient {
    pub fn new(options: ScraperOptions) -> ScrapeResult<Self> {
        Ok(Self {
            http: HttpClient::new(&options)?,
            options,
        })
    }

    pub fn options(&self) -> &ScraperOptions {
        &self.options
    }

    /// Run the full submission protocol and return the raw results page.
    pub async fn fetch_results_page(
        &self,
        search_url: &str,
        filter: &FilterSpec,
    ) -> ScrapeResult<ResultsPage> {
        let mut session = SearchSession::new(search_url)?;

        let form = SearchForm::from_filter(filter).to_variables();
        info!("form variables: {:?}", form.pairs());

        let tokens = session.open(&self.http).await?;
        let vars = form.with_tokens(&tokens);

        let location = session.submit(&self.http, &vars).await?;
        let results_url =
            url_norm::results_url(session.search_url(), &location, self.options.page_size)?;

        session
            .fetch_results(&self.http, results_url, self.options.check_results_status)
            .await
    }
}
