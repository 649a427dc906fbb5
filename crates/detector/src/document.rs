//! Read-only query capability over a loaded page.

use std::sync::LazyLock;

use scraper::{Html, Selector, html::Select};
use url::Url;

use crate::detector::error::DetectorError;

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script:not([src])").unwrap());
static BASE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("base[href]").unwrap());

/// A parsed document together with the URL it was loaded from.
pub struct PageDocument {
    url: Url,
    base: Url,
    html: Html,
}

impl PageDocument {
    /// Parses `html` as the document served at `page_url`.
    pub fn parse(page_url: &str, html: &str) -> Result<Self, DetectorError> {
        let url = Url::parse(page_url.trim())
            .map_err(|e| DetectorError::InvalidUrl(format!("{page_url}: {e}")))?;
        Ok(Self::from_html(url, Html::parse_document(html)))
    }

    pub fn from_html(url: Url, html: Html) -> Self {
        let base = html
            .select(&BASE_SELECTOR)
            .filter_map(|el| el.value().attr("href"))
            .find_map(|href| url.join(href.trim()).ok())
            .unwrap_or_else(|| url.clone());
        Self { url, base, html }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    #[inline]
    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> Select<'a, 'b> {
        self.html.select(selector)
    }

    /// Text of the first `<title>` element, whitespace-normalized.
    pub fn title(&self) -> String {
        self.html
            .select(&TITLE_SELECTOR)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" "))
            .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }

    /// Text content of every script element without a `src` attribute.
    pub fn inline_scripts(&self) -> impl Iterator<Item = String> + '_ {
        self.html
            .select(&SCRIPT_SELECTOR)
            .map(|el| el.text().collect::<String>())
            .filter(|text| !text.trim().is_empty())
    }

    /// Resolves a locator the way the DOM does for `src` properties.
    pub fn resolve(&self, locator: &str) -> Option<Url> {
        let locator = locator.trim();
        if locator.is_empty() {
            return None;
        }
        self.base.join(locator).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
        <title>
            Cat   compilation
        </title>
        <script src="/app.js"></script>
        <script>var a = "https://cdn.example.com/a.m3u8";</script>
        <script type="application/json">{"k": 1}</script>
    </head><body></body></html>"#;

    #[test]
    fn test_title_is_normalized() {
        let doc = PageDocument::parse("https://example.com/watch", PAGE).unwrap();
        assert_eq!(doc.title(), "Cat compilation");
        assert_eq!(doc.hostname(), "example.com");
    }

    #[test]
    fn test_inline_scripts_skip_external() {
        let doc = PageDocument::parse("https://example.com/watch", PAGE).unwrap();
        let scripts: Vec<_> = doc.inline_scripts().collect();
        assert_eq!(scripts.len(), 2);
        assert!(scripts[0].contains("a.m3u8"));
    }

    #[test]
    fn test_resolve_relative_and_base() {
        let doc = PageDocument::parse("https://example.com/videos/watch", "<p></p>").unwrap();
        assert_eq!(
            doc.resolve("clip.mp4").unwrap().as_str(),
            "https://example.com/videos/clip.mp4"
        );
        assert_eq!(
            doc.resolve("blob:https://example.com/1234").unwrap().scheme(),
            "blob"
        );
        assert!(doc.resolve("   ").is_none());

        let doc = PageDocument::parse(
            "https://example.com/videos/watch",
            r#"<head><base href="https://media.example.net/v/"></head>"#,
        )
        .unwrap();
        assert_eq!(
            doc.resolve("clip.mp4").unwrap().as_str(),
            "https://media.example.net/v/clip.mp4"
        );
    }

    #[test]
    fn test_invalid_page_url() {
        assert!(matches!(
            PageDocument::parse("not a url", "<p></p>"),
            Err(DetectorError::InvalidUrl(_))
        ));
    }
}
