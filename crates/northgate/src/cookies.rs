//! Per-search cookie jar.
//!
//! Cookies set by the search page are captured once and replayed on the
//! POST and the results GET. A jar belongs to a single search and is never
//! shared between searches, so the reqwest client itself keeps no cookie
//! store.

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
use url::Url;

/// `Cookie` header captured from the search page's `Set-Cookie` headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    header: Option<HeaderValue>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every `Set-Cookie` header of a response to `url` and keep the
    /// cookies that would be sent back to it.
    ///
    /// Attribute handling (expiry, path, quoting) is reqwest's. Headers that
    /// do not parse as a cookie are dropped.
    pub fn from_headers(url: &Url, headers: &HeaderMap) -> Self {
        let jar = Jar::default();
        jar.set_cookies(&mut headers.get_all(SET_COOKIE).iter(), url);
        Self {
            header: jar.cookies(url),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_none()
    }

    /// Value for a `Cookie` request header, or `None` when the jar is empty.
    pub fn header_value(&self) -> Option<&HeaderValue> {
        self.header.as_ref()
    }

    /// Number of `name=value` pairs replayed.
    pub fn len(&self) -> usize {
        self.header
            .as_ref()
            .map_or(0, |h| h.as_bytes().split(|&b| b == b';').count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_url() -> Url {
        Url::parse("https://planning.example.gov.uk/Northgate/PlanningExplorer/GeneralSearch.aspx")
            .unwrap()
    }

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                reqwest::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_bytes(value.as_bytes()).unwrap(),
            );
        }
        map
    }

    fn replayed(jar: &CookieJar) -> Vec<String> {
        let mut pairs: Vec<String> = jar
            .header_value()
            .map(|h| h.to_str().unwrap().split("; ").map(str::to_string).collect())
            .unwrap_or_default();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_from_headers_keeps_only_set_cookie() {
        let jar = CookieJar::from_headers(
            &search_url(),
            &headers(&[
                ("content-type", "text/html"),
                ("set-cookie", "ASP.NET_SessionId=abc123; path=/; HttpOnly"),
                ("set-cookie", "BIGipServer=pool1; Path=/"),
            ]),
        );

        assert_eq!(jar.len(), 2);
        assert_eq!(
            replayed(&jar),
            vec!["ASP.NET_SessionId=abc123", "BIGipServer=pool1"]
        );
    }

    #[test]
    fn test_quoted_value_kept_verbatim() {
        let jar = CookieJar::from_headers(
            &search_url(),
            &headers(&[("set-cookie", "sid=\"abc\"; path=/")]),
        );
        assert_eq!(jar.header_value().unwrap(), "sid=\"abc\"");
    }

    #[test]
    fn test_later_cookie_replaces_earlier() {
        let jar = CookieJar::from_headers(
            &search_url(),
            &headers(&[("set-cookie", "id=old; path=/"), ("set-cookie", "id=new; path=/")]),
        );
        assert_eq!(replayed(&jar), vec!["id=new"]);
    }

    #[test]
    fn test_malformed_and_expired_dropped() {
        let jar = CookieJar::from_headers(
            &search_url(),
            &headers(&[
                ("set-cookie", "no-equals-sign"),
                ("set-cookie", "=nameless"),
                ("set-cookie", "gone=1; Max-Age=0"),
            ]),
        );
        assert!(jar.is_empty());
        assert_eq!(jar.len(), 0);
        assert_eq!(jar.header_value(), None);
    }

    #[test]
    fn test_value_may_contain_equals() {
        let jar = CookieJar::from_headers(
            &search_url(),
            &headers(&[("set-cookie", "token=a=b==; path=/")]),
        );
        assert_eq!(replayed(&jar), vec!["token=a=b=="]);
    }

    #[test]
    fn test_utf8_value_replayed_byte_for_byte() {
        let jar = CookieJar::from_headers(
            &search_url(),
            &headers(&[("set-cookie", "area=Môn; path=/")]),
        );
        assert_eq!(jar.header_value().unwrap().as_bytes(), "area=Môn".as_bytes());
    }
}
