//! Title inference for detected resources.
//!
//! Titles come from an ordered table of strategies; the first one producing
//! non-empty text after sanitization wins.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use url::Url;

use crate::detector::platforms::PlatformProfile;
use crate::document::PageDocument;

const ILLEGAL_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const TITLE_ATTRIBUTES: &[&str] = &["title", "aria-label", "data-title"];

static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static TITLE_CLASS_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[class*="title" i]"#).unwrap());

/// Strips filename-illegal and control characters, collapses whitespace and
/// truncates to `max_len` characters.
pub fn sanitize_title(raw: &str, max_len: usize) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .chars()
        .take(max_len)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Removes the first matching platform suffix (e.g. ` - YouTube`).
pub fn strip_title_suffix<'a>(title: &'a str, suffixes: &[&str]) -> &'a str {
    let title = title.trim();
    suffixes
        .iter()
        .find_map(|suffix| title.strip_suffix(suffix))
        .map(str::trim_end)
        .unwrap_or(title)
}

/// `Video <unix-millis>`
pub fn fallback_title() -> String {
    format!("Video {}", chrono::Utc::now().timestamp_millis())
}

/// What a title is being resolved for.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleTarget<'a> {
    pub element: Option<ElementRef<'a>>,
    pub source: Option<ElementRef<'a>>,
    pub url: &'a str,
}

impl<'a> TitleTarget<'a> {
    pub fn element(element: ElementRef<'a>, url: &'a str) -> Self {
        Self {
            element: Some(element),
            source: None,
            url,
        }
    }

    pub fn with_source(mut self, source: Option<ElementRef<'a>>) -> Self {
        self.source = source;
        self
    }

    pub fn url(url: &'a str) -> Self {
        Self {
            url,
            ..Default::default()
        }
    }
}

type TitleStrategy = fn(&TitleResolver<'_>, &TitleTarget<'_>) -> Option<String>;

/// Generic cascade for media elements.
const ELEMENT_STRATEGIES: &[(&str, TitleStrategy)] = &[
    ("element-attributes", element_attributes),
    ("source-attributes", source_attributes),
    ("ancestors", ancestor_titles),
    ("url-filename", url_filename),
];

/// Cascade for platform pages, after the platform's document selectors.
const PLATFORM_STRATEGIES: &[(&str, TitleStrategy)] = &[
    ("element-attributes", element_attributes),
    ("source-attributes", source_attributes),
];

/// Cascade for resources that have no element (network and script finds).
const STREAM_STRATEGIES: &[(&str, TitleStrategy)] =
    &[("page-title", page_title), ("url-filename", url_filename)];

pub struct TitleResolver<'a> {
    doc: &'a PageDocument,
    page_title: &'a str,
    max_len: usize,
    ancestor_depth: usize,
}

impl<'a> TitleResolver<'a> {
    pub fn new(
        doc: &'a PageDocument,
        page_title: &'a str,
        max_len: usize,
        ancestor_depth: usize,
    ) -> Self {
        Self {
            doc,
            page_title,
            max_len,
            ancestor_depth,
        }
    }

    fn run(
        &self,
        strategies: &[(&str, TitleStrategy)],
        target: &TitleTarget<'_>,
    ) -> Option<String> {
        strategies.iter().find_map(|(name, strategy)| {
            let title = strategy(self, target)
                .map(|raw| sanitize_title(&raw, self.max_len))
                .filter(|t| !t.is_empty())?;
            tracing::trace!(strategy = *name, %title, "title resolved");
            Some(title)
        })
    }

    /// Title for a media element or an element/source pair.
    pub fn resolve(&self, target: &TitleTarget<'_>) -> String {
        self.run(ELEMENT_STRATEGIES, target)
            .unwrap_or_else(fallback_title)
    }

    /// Title on a recognized platform: document selectors first, then the
    /// element attributes, then the platform default.
    pub fn resolve_for_platform(
        &self,
        profile: &PlatformProfile,
        target: &TitleTarget<'_>,
    ) -> String {
        self.from_document_selectors(profile)
            .or_else(|| self.run(PLATFORM_STRATEGIES, target))
            .unwrap_or_else(|| profile.default_title.to_string())
    }

    /// Title for a resource found in the network log or in script text.
    pub fn resolve_for_stream(&self, url: &str) -> String {
        self.run(STREAM_STRATEGIES, &TitleTarget::url(url))
            .unwrap_or_else(fallback_title)
    }

    fn from_document_selectors(&self, profile: &PlatformProfile) -> Option<String> {
        profile.title_selectors().iter().find_map(|selector| {
            self.doc.select(selector).find_map(|el| {
                let raw = if el.value().name() == "meta" {
                    el.value().attr("content").unwrap_or_default().to_string()
                } else {
                    element_text(el)
                };
                let title = sanitize_title(
                    strip_title_suffix(&raw, profile.title_suffixes),
                    self.max_len,
                );
                (!title.is_empty()).then_some(title)
            })
        })
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

fn first_title_attribute(el: ElementRef<'_>) -> Option<String> {
    TITLE_ATTRIBUTES
        .iter()
        .filter_map(|attr| el.value().attr(attr))
        .find(|value| !value.trim().is_empty())
        .map(ToOwned::to_owned)
}

fn element_attributes(_: &TitleResolver<'_>, target: &TitleTarget<'_>) -> Option<String> {
    target.element.and_then(first_title_attribute)
}

fn source_attributes(_: &TitleResolver<'_>, target: &TitleTarget<'_>) -> Option<String> {
    target.source.and_then(first_title_attribute)
}

fn ancestor_titles(resolver: &TitleResolver<'_>, target: &TitleTarget<'_>) -> Option<String> {
    let element = target.element?;
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(resolver.ancestor_depth)
        .find_map(|ancestor| {
            if let Some(title) = first_title_attribute(ancestor) {
                return Some(title);
            }
            ancestor
                .select(&HEADING_SELECTOR)
                .chain(ancestor.select(&TITLE_CLASS_SELECTOR))
                .map(element_text)
                .find(|text| !text.trim().is_empty())
        })
}

fn url_filename(_: &TitleResolver<'_>, target: &TitleTarget<'_>) -> Option<String> {
    let url = Url::parse(target.url).ok()?;
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let stem = segment
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(segment);
    let decoded = urlencoding::decode(stem)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| stem.to_string());
    Some(decoded)
}

fn page_title(resolver: &TitleResolver<'_>, _: &TitleTarget<'_>) -> Option<String> {
    Some(resolver.page_title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::platforms;
    use crate::media::Platform;
    use proptest::prelude::*;

    fn video<'a>(doc: &'a PageDocument) -> ElementRef<'a> {
        let selector = Selector::parse("video").unwrap();
        doc.select(&selector).next().unwrap()
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("  a/b\\c: <d>  |e?*\"  ", 100), "abc d e");
        assert_eq!(sanitize_title("line\none\ttab", 100), "line one tab");
        assert_eq!(sanitize_title(&"x".repeat(150), 100).chars().count(), 100);
        assert_eq!(sanitize_title("日本語のタイトル", 3), "日本語");
        assert_eq!(sanitize_title("ab cd", 3), "ab");
    }

    #[test]
    fn test_strip_title_suffix() {
        assert_eq!(
            strip_title_suffix("Funny cats - YouTube", &[" - YouTube"]),
            "Funny cats"
        );
        assert_eq!(strip_title_suffix("Plain", &[" - YouTube"]), "Plain");
    }

    #[test]
    fn test_element_attribute_wins() {
        let doc = PageDocument::parse(
            "https://example.com/",
            r#"<div title="outer"><video title="Inner title" src="a.mp4"></video></div>"#,
        )
        .unwrap();
        let resolver = TitleResolver::new(&doc, "", 100, 3);
        let target = TitleTarget::element(video(&doc), "https://example.com/a.mp4");
        assert_eq!(resolver.resolve(&target), "Inner title");
    }

    #[test]
    fn test_ancestor_heading() {
        let doc = PageDocument::parse(
            "https://example.com/",
            r#"<section><h2>Episode 4</h2><div><div><video src="a.mp4"></video></div></div></section>"#,
        )
        .unwrap();
        let resolver = TitleResolver::new(&doc, "", 100, 3);
        let target = TitleTarget::element(video(&doc), "https://example.com/a.mp4");
        assert_eq!(resolver.resolve(&target), "Episode 4");
    }

    #[test]
    fn test_ancestor_depth_is_bounded() {
        let doc = PageDocument::parse(
            "https://example.com/",
            r#"<section><h2>Too far</h2><div><div><div><video src="a.mp4"></video></div></div></div></section>"#,
        )
        .unwrap();
        let resolver = TitleResolver::new(&doc, "", 100, 3);
        let target = TitleTarget::element(video(&doc), "https://example.com/media/my%20clip.mp4");
        assert_eq!(resolver.resolve(&target), "my clip");
    }

    #[test]
    fn test_title_class() {
        let doc = PageDocument::parse(
            "https://example.com/",
            r#"<div><span class="videoTitle">Class title</span><video src="a.mp4"></video></div>"#,
        )
        .unwrap();
        let resolver = TitleResolver::new(&doc, "", 100, 3);
        let target = TitleTarget::element(video(&doc), "https://example.com/a.mp4");
        assert_eq!(resolver.resolve(&target), "Class title");
    }

    #[test]
    fn test_fallback_title() {
        let doc = PageDocument::parse("https://example.com/", "<video></video>").unwrap();
        let resolver = TitleResolver::new(&doc, "", 100, 3);
        let title = resolver.resolve(&TitleTarget::element(video(&doc), "not a url"));
        assert!(title.starts_with("Video "), "{title}");
    }

    #[test]
    fn test_platform_selectors_then_default() {
        let doc = PageDocument::parse(
            "https://www.tiktok.com/@user/video/1",
            r#"<head><meta property="og:title" content="Dance | TikTok"></head><video></video>"#,
        )
        .unwrap();
        let profile = platforms::profile(Platform::TikTok).unwrap();
        let resolver = TitleResolver::new(&doc, "", 100, 3);
        let target = TitleTarget::element(video(&doc), "blob:https://www.tiktok.com/1");
        assert_eq!(resolver.resolve_for_platform(profile, &target), "Dance");

        let doc = PageDocument::parse("https://www.tiktok.com/", "<video></video>").unwrap();
        let resolver = TitleResolver::new(&doc, "", 100, 3);
        let target = TitleTarget::element(video(&doc), "blob:https://www.tiktok.com/1");
        assert_eq!(resolver.resolve_for_platform(profile, &target), "TikTok Video");
    }

    #[test]
    fn test_stream_title_prefers_page_title() {
        let doc = PageDocument::parse("https://example.com/", "<p></p>").unwrap();
        let resolver = TitleResolver::new(&doc, "Live show", 100, 3);
        assert_eq!(
            resolver.resolve_for_stream("https://cdn.example.com/hls/master.m3u8"),
            "Live show"
        );
        let resolver = TitleResolver::new(&doc, "", 100, 3);
        assert_eq!(
            resolver.resolve_for_stream("https://cdn.example.com/hls/master.m3u8"),
            "master"
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_sanitized_titles_are_bounded_and_clean(
            raw in "\\PC{0,200}",
            max_len in 1usize..120,
        ) {
            let title = sanitize_title(&raw, max_len);
            prop_assert!(title.chars().count() <= max_len);
            prop_assert!(!title.chars().any(|c| ILLEGAL_FILENAME_CHARS.contains(&c)));
            prop_assert!(!title.chars().any(char::is_control));
        }
    }
}
