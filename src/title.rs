//! Article titles derived from link hrefs.

use std::fmt;

/// A wiki article title, percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Derive the title from an href such as `/wiki/The_Kesh_Jig#Notes`.
    ///
    /// Returns `None` when the href does not start with `prefix`, names no article, or
    /// does not decode to UTF-8.
    pub fn from_href(href: &str, prefix: &str) -> Option<Self> {
        let path = href.strip_prefix(prefix)?;
        let path = path.split('#').next().unwrap_or_default();
        if path.is_empty() {
            return None;
        }
        let decoded = urlencoding::decode(path).ok()?;
        Some(Self(decoded.into_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_plain_href() {
        let title = Title::from_href("/wiki/Morrison's_Jig", "/wiki/").unwrap();
        assert_eq!(title.as_str(), "Morrison's_Jig");
    }

    #[test]
    fn test_title_is_percent_decoded() {
        let title = Title::from_href("/wiki/Caf%C3%A9_Reel%3F", "/wiki/").unwrap();
        assert_eq!(title.as_str(), "Café_Reel?");
    }

    #[test]
    fn test_fragment_is_dropped() {
        let title = Title::from_href("/wiki/The_Kesh#Settings", "/wiki/").unwrap();
        assert_eq!(title.as_str(), "The_Kesh");
    }

    #[test]
    fn test_rejected_hrefs() {
        assert_eq!(Title::from_href("https://example.org/wiki/X", "/wiki/"), None);
        assert_eq!(Title::from_href("/wiki/", "/wiki/"), None);
        assert_eq!(Title::from_href("/wiki/#top", "/wiki/"), None);
        assert_eq!(Title::from_href("/wiki/%FF%FE", "/wiki/"), None);
    }
}
