//! Minimal HAR 1.2 structures for replaying a page's recorded requests.

use std::convert::Infallible;
use std::future::{Ready, ready};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tower::{Layer, ServiceExt, service_fn};
use tracing::debug;
use video_detector::detector::RequestKind;

use crate::page::ObservedPrimitives;

#[derive(Debug, Deserialize)]
pub struct HarLog {
    pub log: HarRoot,
}

#[derive(Debug, Deserialize)]
pub struct HarRoot {
    #[serde(default)]
    pub entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
pub struct HarEntry {
    pub request: HarRequest,
    #[serde(default)]
    pub response: HarResponse,
    /// Chromium's initiator category: `document`, `xhr`, `fetch`, `media`...
    #[serde(default, rename = "_resourceType")]
    pub resource_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HarRequest {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HarResponse {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub content: HarContent,
}

#[derive(Debug, Default, Deserialize)]
pub struct HarContent {
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl HarEntry {
    /// The primitive page code used for this request.
    pub fn request_kind(&self) -> RequestKind {
        match self.resource_type.as_deref() {
            Some(kind) if kind.eq_ignore_ascii_case("xhr") || kind.eq_ignore_ascii_case("fetch") => {
                RequestKind::Fetch
            }
            _ => RequestKind::ResourceLoad,
        }
    }

    fn is_html(&self) -> bool {
        self.response
            .content
            .mime_type
            .as_deref()
            .is_some_and(|mime| mime.starts_with("text/html"))
    }
}

impl HarLog {
    pub async fn load(path: &Path) -> Result<Self> {
        let data = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read HAR file {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse HAR file {}", path.display()))
    }

    /// Recorded HTML body of `page_url`, if the archive captured it.
    pub fn document(&self, page_url: &str) -> Option<&str> {
        self.log
            .entries
            .iter()
            .filter(|entry| entry.request.url == page_url && entry.is_html())
            .find_map(|entry| entry.response.content.text.as_deref())
    }

    /// Feeds every recorded request through the observer-wrapped primitive of
    /// its kind. Responses come from the archive; nothing touches the network.
    pub async fn replay(&self, primitives: &ObservedPrimitives) -> usize {
        let mut replayed = 0;
        for entry in &self.log.entries {
            let status = entry.response.status;
            let recorded =
                service_fn(move |_: String| -> Ready<Result<u16, Infallible>> { ready(Ok(status)) });
            let primitive = primitives.layer(entry.request_kind()).layer(recorded);
            if primitive.oneshot(entry.request.url.clone()).await.is_ok() {
                replayed += 1;
            }
        }
        debug!(
            replayed,
            observed = primitives.observer().observed().len(),
            "HAR replay finished"
        );
        replayed
    }
}
