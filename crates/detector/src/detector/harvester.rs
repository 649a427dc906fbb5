//! Media element harvesting: generic `<video>`/`<source>` elements, platform
//! player selectors and `blob:` media.

use std::sync::LazyLock;

use rustc_hash::FxHashSet;
use scraper::{ElementRef, Selector};
use tracing::{debug, trace};

use crate::detector::classifier::is_valid_video_url;
use crate::detector::platforms::PlatformProfile;
use crate::detector::scan::ScanContext;
use crate::detector::title::TitleTarget;
use crate::media::{OriginKind, Platform, VideoCandidate};

static VIDEO_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("video").unwrap());
static VIDEO_SRC_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("video[src]").unwrap());
static NESTED_SOURCE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("video source[src]").unwrap());
static SOURCE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("source[src]").unwrap());

pub const BLOB_REASON: &str =
    "Blob URLs only exist inside the page that created them and cannot be downloaded directly";
pub const BLOB_ALTERNATIVE: &str =
    "Open the video on its own page, use the site's download or share option, or record the screen";

/// A player element and the locator it plays from.
struct Located<'a> {
    video: ElementRef<'a>,
    source: Option<ElementRef<'a>>,
    locator: &'a str,
}

/// Finds the `<video>` for a matched element (the element itself or its
/// first descendant video) and its locator: `src`, else the first nested
/// `<source src>`.
fn locate(el: ElementRef<'_>) -> Option<Located<'_>> {
    let video = if el.value().name() == "video" {
        el
    } else {
        el.select(&VIDEO_SELECTOR).next()?
    };
    if let Some(src) = video.value().attr("src").filter(|s| !s.trim().is_empty()) {
        return Some(Located {
            video,
            source: None,
            locator: src,
        });
    }
    let source = video.select(&SOURCE_SELECTOR).next()?;
    Some(Located {
        video,
        source: Some(source),
        locator: source.value().attr("src")?,
    })
}

fn enclosing_video(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "video")
}

fn is_blob_locator(locator: &str) -> bool {
    locator
        .trim_start()
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("blob:"))
}

/// Generic pass: every `<video src>` and every nested `<source src>`.
pub fn harvest_elements(ctx: &ScanContext<'_>) -> Vec<VideoCandidate> {
    let doc = ctx.doc();
    let titles = ctx.titles();
    let mut found = Vec::new();

    for video in doc.select(&VIDEO_SRC_SELECTOR) {
        let Some(raw) = video.value().attr("src") else {
            continue;
        };
        let Some(url) = doc.resolve(raw).map(String::from) else {
            continue;
        };
        if !is_valid_video_url(&url) {
            trace!(%url, "video src rejected");
            continue;
        }
        let title = titles.resolve(&TitleTarget::element(video, &url));
        found.push(
            VideoCandidate::builder(url, OriginKind::DirectElement, ctx.platform())
                .src(raw.trim())
                .title(title)
                .build(),
        );
    }

    for source in doc.select(&NESTED_SOURCE_SELECTOR) {
        let Some(raw) = source.value().attr("src") else {
            continue;
        };
        let Some(url) = doc.resolve(raw).map(String::from) else {
            continue;
        };
        if !is_valid_video_url(&url) {
            trace!(%url, "source src rejected");
            continue;
        }
        let video = enclosing_video(source).unwrap_or(source);
        let target = TitleTarget::element(video, &url).with_source(Some(source));
        found.push(
            VideoCandidate::builder(url.clone(), OriginKind::NestedSource, ctx.platform())
                .src(raw.trim())
                .title(titles.resolve(&target))
                .build(),
        );
    }

    debug!(found = found.len(), "element harvest finished");
    found
}

/// Platform pass over the profile's player selectors, most specific first.
pub fn harvest_platform(ctx: &ScanContext<'_>, profile: &PlatformProfile) -> Vec<VideoCandidate> {
    let doc = ctx.doc();
    let titles = ctx.titles();
    let mut seen = FxHashSet::default();
    let mut found = Vec::new();

    for selector in profile.video_selectors() {
        for el in doc.select(selector) {
            let Some(located) = locate(el) else {
                continue;
            };
            let Some(url) = doc.resolve(located.locator).map(String::from) else {
                continue;
            };
            if !is_valid_video_url(&url) || !seen.insert(url.clone()) {
                continue;
            }
            let target = TitleTarget::element(located.video, &url).with_source(located.source);
            let title = titles.resolve_for_platform(profile, &target);
            found.push(
                VideoCandidate::builder(url.clone(), OriginKind::PlatformSpecific, profile.platform)
                    .src(located.locator.trim())
                    .title(title)
                    .build(),
            );
        }
    }

    debug!(platform = profile.name, found = found.len(), "platform harvest finished");
    found
}

/// Every `<video>` playing from a `blob:` locator, reported as
/// non-downloadable.
pub fn harvest_blobs(ctx: &ScanContext<'_>) -> Vec<VideoCandidate> {
    let titles = ctx.titles();
    let platform = ctx.platform();
    let mut found = Vec::new();

    for el in ctx.doc().select(&VIDEO_SELECTOR) {
        let Some(located) = locate(el) else {
            continue;
        };
        if !is_blob_locator(located.locator) {
            continue;
        }
        let url = located.locator.trim();
        let target = TitleTarget::element(located.video, url).with_source(located.source);
        let title = match ctx.profile() {
            Some(profile) => titles.resolve_for_platform(profile, &target),
            None => titles.resolve(&target),
        };
        found.push(
            VideoCandidate::builder(url, OriginKind::Blob, platform)
                .src(url)
                .title(title)
                .not_downloadable(BLOB_REASON, BLOB_ALTERNATIVE)
                .build(),
        );
    }

    if !found.is_empty() {
        debug!(found = found.len(), %platform, "blob media detected");
    }
    found
}

/// Harvest over user-configured selectors, treated like direct elements.
pub fn harvest_custom(ctx: &ScanContext<'_>, selectors: &[Selector]) -> Vec<VideoCandidate> {
    let doc = ctx.doc();
    let titles = ctx.titles();
    let mut found = Vec::new();

    for selector in selectors {
        for el in doc.select(selector) {
            let Some(located) = locate(el) else {
                continue;
            };
            let Some(url) = doc.resolve(located.locator).map(String::from) else {
                continue;
            };
            if !is_valid_video_url(&url) {
                continue;
            }
            let target = TitleTarget::element(located.video, &url).with_source(located.source);
            let origin = if located.source.is_some() {
                OriginKind::NestedSource
            } else {
                OriginKind::DirectElement
            };
            found.push(
                VideoCandidate::builder(url.clone(), origin, Platform::Generic)
                    .src(located.locator.trim())
                    .title(titles.resolve(&target))
                    .build(),
            );
        }
    }
    found
}
