//! URL normalization for redirect targets and detail links.
//!
//! Every URL the scraper builds goes through the same steps:
//!
//! 1. raw ASCII control characters are removed from the reference,
//! 2. the reference is joined against its base with [`url::Url::join`],
//! 3. query rewrites operate on raw `&`-separated segments so existing
//!    escapes are never decoded or re-encoded,
//! 4. the URL is serialized (the `url` crate percent-encodes anything that
//!    needs it and leaves existing `%XX` escapes alone),
//! 5. any encoded control sequence (`%00`..`%1F`, `%7F`) still present is
//!    dropped and the result re-parsed.

use url::Url;

use crate::error::{ScrapeError, ScrapeResult};

/// Query parameter that holds the results page size.
pub const PAGE_SIZE_PARAM: &str = "PS";

/// Page size large enough to return every result on one page.
pub const SHOW_ALL_PAGE_SIZE: u32 = 99999;

/// Directory segment the portal serves application detail pages under.
const GENERIC_SEGMENT: &str = "Generic/";

/// Parse an absolute URL.
pub fn parse(raw: &str) -> ScrapeResult<Url> {
    let cleaned = strip_control_chars(raw.trim());
    Url::parse(&cleaned).map_err(|source| ScrapeError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

/// Resolve a possibly relative reference against `base`.
pub fn resolve(base: &Url, reference: &str) -> ScrapeResult<Url> {
    let cleaned = strip_control_chars(reference.trim());
    base.join(&cleaned).map_err(|source| ScrapeError::InvalidUrl {
        url: reference.to_string(),
        source,
    })
}

/// Value for the `Origin` header, e.g. `https://planning.example.gov.uk`.
pub fn origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Base URL for detail links: the search page's directory plus `Generic/`.
pub fn generic_base(search_url: &Url) -> ScrapeResult<Url> {
    resolve(search_url, GENERIC_SEGMENT)
}

/// Set `name=value` in the query, replacing an existing segment with the
/// same key or appending one. Other segments are kept byte for byte.
pub fn set_query_param(url: &mut Url, name: &str, value: &str) {
    let replacement = format!("{name}={value}");
    let mut found = false;

    let mut segments: Vec<String> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|seg| !seg.is_empty())
        .map(|seg| {
            let key = seg.split('=').next().unwrap_or(seg);
            if key == name {
                found = true;
                replacement.clone()
            } else {
                seg.to_string()
            }
        })
        .collect();

    if !found {
        segments.push(replacement);
    }

    url.set_query(Some(&segments.join("&")));
}

/// Build the results URL from a search redirect's `Location` header.
///
/// The page-size parameter is forced to `page_size` whatever the portal
/// asked for, so a single GET returns every result.
pub fn results_url(base: &Url, location: &str, page_size: u32) -> ScrapeResult<Url> {
    let mut url = resolve(base, location)?;
    set_query_param(&mut url, PAGE_SIZE_PARAM, &page_size.to_string());
    finish(url)
}

/// Absolute detail-page URL for a results-table link.
pub fn detail_url(generic_base: &Url, href: &str) -> ScrapeResult<Url> {
    finish(resolve(generic_base, href)?)
}

fn finish(url: Url) -> ScrapeResult<Url> {
    let serialized = url.to_string();
    let cleaned = strip_encoded_controls(&serialized);
    if cleaned == serialized {
        return Ok(url);
    }
    Url::parse(&cleaned).map_err(|source| ScrapeError::InvalidUrl {
        url: serialized,
        source,
    })
}

/// Text of a raw header value used as a URL reference. Valid UTF-8 is kept
/// as is (the `url` crate encodes it on join); otherwise every non-ASCII
/// byte is percent-encoded.
pub fn reference_from_bytes(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    let mut out = String::with_capacity(bytes.len() + 8);
    for &b in bytes {
        if b.is_ascii() {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Remove raw ASCII control characters.
pub fn strip_control_chars(s: &str) -> String {
    s.chars().filter(|c| !c.is_ascii_control()).collect()
}

/// Remove percent-encoded ASCII control characters (`%00`..`%1F`, `%7F`).
pub fn strip_encoded_controls(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let encoded = tail
            .get(1..3)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());

        match encoded {
            Some(byte) if byte < 0x20 || byte == 0x7f => rest = &tail[3..],
            _ => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
