//! Async HTTP client wrapping reqwest.
//!
//! Redirects are never followed automatically: the search POST answers with
//! a 302 whose `Location` the driver rewrites before fetching it. Cookies
//! are not stored by the client either; callers pass a [`CookieJar`]
//! explicitly on every request.

use reqwest::header::{HeaderMap, COOKIE, LOCATION};

use crate::cookies::CookieJar;
use crate::error::ScrapeResult;
use crate::options::ScraperOptions;
use crate::url_norm;

/// Response from a GET or POST.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Requested URL.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// All response headers, values kept as raw bytes.
    pub headers: HeaderMap,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// `Location` header as a URL reference. `None` when it is absent or
    /// blank. Bytes outside UTF-8 are percent-encoded, never dropped.
    pub fn location(&self) -> Option<String> {
        let value = self.headers.get(LOCATION)?;
        let reference = url_norm::reference_from_bytes(value.as_bytes());
        (!reference.trim().is_empty()).then_some(reference)
    }
}

/// HTTP client for the portal.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(options: &ScraperOptions) -> ScrapeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(options.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    /// Perform a single GET. No retries.
    pub async fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
        cookies: &CookieJar,
    ) -> ScrapeResult<HttpResponse> {
        let builder = self.client.get(url).headers(headers.clone());
        let resp = with_cookies(builder, cookies).send().await?;
        into_response(url, resp).await
    }

    /// POST url-encoded form data. No retries.
    pub async fn post_form(
        &self,
        url: &str,
        form_fields: &[(String, String)],
        headers: &HeaderMap,
        cookies: &CookieJar,
    ) -> ScrapeResult<HttpResponse> {
        let builder = self
            .client
            .post(url)
            .headers(headers.clone())
            .form(form_fields);
        let resp = with_cookies(builder, cookies).send().await?;
        into_response(url, resp).await
    }
}

fn with_cookies(builder: reqwest::RequestBuilder, cookies: &CookieJar) -> reqwest::RequestBuilder {
    match cookies.header_value() {
        Some(value) => builder.header(COOKIE, value.clone()),
        None => builder,
    }
}

async fn into_response(url: &str, r: reqwest::Response) -> ScrapeResult<HttpResponse> {
    let status = r.status().as_u16();
    let headers = r.headers().clone();
    let body = r.text().await?;

    Ok(HttpResponse {
        url: url.to_string(),
        status,
        headers,
        body,
    })
}
