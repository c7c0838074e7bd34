//! ASP.NET WebForms anti-forgery token extraction.

use scraper::{Html, Selector};

use crate::error::{ScrapeError, ScrapeResult};
use crate::form::{FIELD_EVENT_VALIDATION, FIELD_VIEW_STATE};
use crate::types::SessionTokens;

/// Read `__VIEWSTATE` and `__EVENTVALIDATION` from the search page.
///
/// The elements are located by id. A missing element is fatal because the
/// portal rejects a search POST without both values. A present element
/// without a `value` attribute yields an empty token.
pub fn extract_session_tokens(html: &str) -> ScrapeResult<SessionTokens> {
    let document = Html::parse_document(html);
    Ok(SessionTokens {
        view_state: hidden_value(&document, FIELD_VIEW_STATE)?,
        event_validation: hidden_value(&document, FIELD_EVENT_VALIDATION)?,
    })
}

fn hidden_value(document: &Html, id: &'static str) -> ScrapeResult<String> {
    let sel = Selector::parse(&format!("#{id}")).expect("token id selector is valid");
    document
        .select(&sel)
        .next()
        .map(|el| el.value().attr("value").unwrap_or_default().to_string())
        .ok_or(ScrapeError::MissingToken { field: id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_both_tokens() {
        let html = r#"
        <html><body>
            <form method="post" action="GeneralSearch.aspx">
                <input type="hidden" name="__VIEWSTATE" id="__VIEWSTATE" value="vs1" />
                <input type="hidden" name="__EVENTVALIDATION" id="__EVENTVALIDATION" value="ev1" />
                <input type="text" name="txtProposal" id="txtProposal" />
            </form>
        </body></html>
        "#;

        let tokens = extract_session_tokens(html).unwrap();
        assert_eq!(tokens.view_state, "vs1");
        assert_eq!(tokens.event_validation, "ev1");
    }

    #[test]
    fn test_missing_event_validation() {
        let html = r#"
        <html><body>
            <input type="hidden" id="__VIEWSTATE" value="vs1" />
        </body></html>
        "#;

        let err = extract_session_tokens(html).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingToken {
                field: "__EVENTVALIDATION"
            }
        ));
    }

    #[test]
    fn test_missing_view_state() {
        let html = r#"<input type="hidden" id="__EVENTVALIDATION" value="ev1" />"#;
        let err = extract_session_tokens(html).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingToken { field: "__VIEWSTATE" }));
    }

    #[test]
    fn test_matches_by_id_not_name() {
        let html = r#"
            <input type="hidden" name="__VIEWSTATE" value="by-name" />
            <input type="hidden" id="__EVENTVALIDATION" value="ev1" />
        "#;
        assert!(extract_session_tokens(html).is_err());
    }

    #[test]
    fn test_empty_value_attribute() {
        let html = r#"
            <input type="hidden" id="__VIEWSTATE" />
            <input type="hidden" id="__EVENTVALIDATION" value="" />
        "#;
        let tokens = extract_session_tokens(html).unwrap();
        assert_eq!(tokens.view_state, "");
        assert_eq!(tokens.event_validation, "");
    }
}
