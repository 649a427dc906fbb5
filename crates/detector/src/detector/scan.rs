//! Per-scan view of a page shared by every detection strategy.

use crate::detector::classifier::detect_platform;
use crate::detector::config::DetectorConfig;
use crate::detector::platforms::{self, PlatformProfile};
use crate::detector::title::{TitleResolver, strip_title_suffix};
use crate::detector::utils::unescape_script_url;
use crate::document::PageDocument;
use crate::media::Platform;

pub struct ScanContext<'a> {
    doc: &'a PageDocument,
    config: &'a DetectorConfig,
    platform: Platform,
    profile: Option<&'static PlatformProfile>,
    page_title: String,
}

impl<'a> ScanContext<'a> {
    pub fn new(doc: &'a PageDocument, config: &'a DetectorConfig) -> Self {
        let platform = detect_platform(doc.hostname());
        let profile = platforms::profile(platform);
        let raw_title = doc.title();
        let page_title = match profile {
            Some(profile) => strip_title_suffix(&raw_title, profile.title_suffixes).to_string(),
            None => raw_title.trim().to_string(),
        };
        Self {
            doc,
            config,
            platform,
            profile,
            page_title,
        }
    }

    #[inline]
    pub fn doc(&self) -> &'a PageDocument {
        self.doc
    }

    #[inline]
    pub fn config(&self) -> &'a DetectorConfig {
        self.config
    }

    #[inline]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Profile of the recognised platform, `None` on generic pages.
    #[inline]
    pub fn profile(&self) -> Option<&'static PlatformProfile> {
        self.profile
    }

    /// Document title with the platform suffix stripped.
    pub fn page_title(&self) -> &str {
        &self.page_title
    }

    pub fn titles(&self) -> TitleResolver<'_> {
        TitleResolver::new(
            self.doc,
            &self.page_title,
            self.config.title_max_len,
            self.config.title_ancestor_depth,
        )
    }

    /// Unescapes a URL lifted from script text and resolves it against the page.
    pub fn resolve_url(&self, raw: &str) -> Option<String> {
        let unescaped = unescape_script_url(raw);
        self.doc.resolve(&unescaped).map(String::from)
    }

    /// Title for an element-less streaming find.
    pub fn stream_title(&self, url: &str) -> String {
        self.titles().resolve_for_stream(url)
    }
}
