//! # Content Retrieval
//!
//! The [`ContentSource`] contract supplies raw wikitext for an article title. The browser
//! shell implements it over the MediaWiki action API; this module owns the query URL and
//! the decoding of the JSON response so both can be tested without a network.
//!
//! ## Response Shapes
//! The revision content may live in two places:
//! - `revisions[0].slots.main["*"]` (or `.content` with `formatversion=2`), the newer shape
//! - `revisions[0]["*"]`, the legacy shape from wikis without multi-content revisions
//!
//! The newer shape wins when both are present.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::HoverError;
use crate::title::Title;

/// Supplies the main-slot wikitext of an article's current revision.
///
/// Implementations never fail: a missing article, network error or undecodable response
/// all resolve to `None`.
#[async_trait(?Send)]
pub trait ContentSource {
    async fn fetch_content(&self, title: &Title) -> Option<String>;
}

/// Build the action API query for one title's current main-slot content.
pub fn revision_query_url(api_path: &str, title: &Title) -> String {
    let separator = if api_path.contains('?') { '&' } else { '?' };
    format!(
        "{}{}action=query&format=json&prop=revisions&titles={}&rvslots=main&rvprop=content",
        api_path,
        separator,
        urlencoding::encode(title.as_str())
    )
}

#[derive(Deserialize)]
struct QueryResponse {
    query: Option<Query>,
}

#[derive(Deserialize)]
struct Query {
    pages: Pages,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Pages {
    ById(BTreeMap<String, Page>),
    List(Vec<Page>),
}

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Deserialize)]
struct Revision {
    slots: Option<Slots>,
    #[serde(rename = "*")]
    legacy: Option<String>,
}

#[derive(Deserialize)]
struct Slots {
    main: Option<Slot>,
}

#[derive(Deserialize)]
struct Slot {
    #[serde(rename = "*")]
    star: Option<String>,
    content: Option<String>,
}

impl Revision {
    fn into_content(self) -> Option<String> {
        let main = self
            .slots
            .and_then(|slots| slots.main)
            .and_then(|slot| slot.star.or(slot.content));
        main.or(self.legacy)
    }
}

/// Decode an action API response into the article text.
///
/// # Errors
/// Returns [`HoverError::FetchFailure`] for `title` when the body is not a query response
/// or no page carries revision content.
pub fn content_from_response(title: &Title, body: &str) -> Result<String, HoverError> {
    let failure = |message: String| HoverError::FetchFailure {
        title: title.to_string(),
        message,
    };

    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| failure(e.to_string()))?;
    let query = response
        .query
        .ok_or_else(|| failure("response has no query".to_string()))?;

    let pages = match query.pages {
        Pages::ById(pages) => pages.into_values().collect(),
        Pages::List(pages) => pages,
    };

    pages
        .into_iter()
        .filter_map(|page| page.revisions.into_iter().next())
        .find_map(Revision::into_content)
        .ok_or_else(|| failure("no revision content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tune() -> Title {
        Title::new("Tune")
    }

    #[test]
    fn test_query_url() {
        let url = revision_query_url("/w/api.php", &Title::new("Tom's Reel & Jig"));
        assert_eq!(
            url,
            "/w/api.php?action=query&format=json&prop=revisions&titles=Tom%27s%20Reel%20%26%20Jig&rvslots=main&rvprop=content"
        );
    }

    #[test]
    fn test_query_url_appends_to_existing_query() {
        let url = revision_query_url("/index.php?script=api", &Title::new("A"));
        assert!(url.starts_with("/index.php?script=api&action=query"));
    }

    #[test]
    fn test_slot_shape() {
        let body = r#"{"query":{"pages":{"42":{"pageid":42,"title":"Tune",
            "revisions":[{"slots":{"main":{"contentmodel":"wikitext","*":"X:1\nK:C\nC|"}}}]}}}}"#;
        assert_eq!(content_from_response(&tune(), body).unwrap(), "X:1\nK:C\nC|");
    }

    #[test]
    fn test_legacy_shape() {
        let body = r#"{"query":{"pages":{"7":{"revisions":[{"contentformat":"text/x-wiki","*":"legacy text"}]}}}}"#;
        assert_eq!(content_from_response(&tune(), body).unwrap(), "legacy text");
    }

    #[test]
    fn test_slot_shape_preferred_over_legacy() {
        let body = r#"{"query":{"pages":{"7":{"revisions":[
            {"*":"old","slots":{"main":{"*":"new"}}}]}}}}"#;
        assert_eq!(content_from_response(&tune(), body).unwrap(), "new");
    }

    #[test]
    fn test_formatversion_2_shape() {
        let body = r#"{"batchcomplete":true,"query":{"pages":[
            {"pageid":1,"revisions":[{"slots":{"main":{"content":"fv2"}}}]}]}}"#;
        assert_eq!(content_from_response(&tune(), body).unwrap(), "fv2");
    }

    #[test]
    fn test_missing_page() {
        let body = r#"{"query":{"pages":{"-1":{"ns":0,"title":"Nope","missing":""}}}}"#;
        assert_eq!(
            content_from_response(&Title::new("Nope"), body),
            Err(HoverError::FetchFailure {
                title: "Nope".to_string(),
                message: "no revision content".to_string(),
            })
        );
    }

    #[test]
    fn test_malformed_body() {
        assert!(content_from_response(&tune(), "<html>502</html>").is_err());
        assert!(content_from_response(&tune(), r#"{"error":{"code":"badtitle"}}"#).is_err());
    }

    #[test]
    fn test_failure_names_the_article() {
        let err = content_from_response(&Title::new("Drowsy Maggie"), "{}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to fetch 'Drowsy Maggie': response has no query"
        );
    }
}
