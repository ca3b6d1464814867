//! # Link Scanning
//!
//! Picks the article links on a page that get hover previews and registers them with a
//! [`TooltipController`]. Runs once, when the page is ready, and only if the user has the
//! preview enabled.

use tracing::debug;

use crate::controller::{LinkId, TooltipController, TooltipView};
use crate::title::Title;

/// Whether mouse-hover previews are enabled for the current user.
pub trait FeatureFlag {
    fn hover_preview_enabled(&self) -> bool;
}

impl FeatureFlag for bool {
    fn hover_preview_enabled(&self) -> bool {
        *self
    }
}

/// A link selected for previews, with the article it points to.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedLink<L> {
    pub link: L,
    pub title: Title,
}

#[derive(Debug, Clone)]
pub struct LinkScanner {
    prefix: String,
}

impl LinkScanner {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn is_eligible(&self, href: &str) -> bool {
        Title::from_href(href, &self.prefix).is_some()
    }

    /// Select the eligible links.
    ///
    /// `links` is only called when the flag is on, so a disabled preview never walks the page.
    pub fn scan<L, I, Q, F>(
        &self,
        flag: &dyn FeatureFlag,
        links: Q,
        href_of: F,
    ) -> Vec<ScannedLink<L>>
    where
        I: IntoIterator<Item = L>,
        Q: FnOnce() -> I,
        F: Fn(&L) -> Option<String>,
    {
        if !flag.hover_preview_enabled() {
            debug!("hover preview disabled, skipping link scan");
            return Vec::new();
        }

        let scanned: Vec<_> = links()
            .into_iter()
            .filter_map(|link| {
                let href = href_of(&link)?;
                let title = Title::from_href(&href, &self.prefix)?;
                Some(ScannedLink { link, title })
            })
            .collect();
        debug!(count = scanned.len(), prefix = %self.prefix, "article links found");
        scanned
    }

    /// Scan and register every eligible link with the controller.
    ///
    /// The returned ids are what the host passes to the controller's hover handlers.
    pub fn attach<L, I, Q, F, V>(
        &self,
        flag: &dyn FeatureFlag,
        links: Q,
        href_of: F,
        controller: &mut TooltipController<V>,
    ) -> Vec<(LinkId, L)>
    where
        I: IntoIterator<Item = L>,
        Q: FnOnce() -> I,
        F: Fn(&L) -> Option<String>,
        V: TooltipView,
    {
        self.scan(flag, links, href_of)
            .into_iter()
            .map(|scanned| (controller.register_link(scanned.title), scanned.link))
            .collect()
    }
}
