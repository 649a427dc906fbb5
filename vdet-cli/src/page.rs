//! Host shim: builds a [`PageContext`] the way a browser tab would, with the
//! request primitives wrapped by the page's observer.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;
use tower::{Layer, Service, ServiceExt, service_fn};
use tracing::{debug, info};
use url::Url;
use video_detector::PageContext;
use video_detector::detector::config::DetectorConfig;
use video_detector::detector::{NetworkObserver, ObserveLayer, RequestKind};

use crate::har::HarLog;

/// Both request primitives of one page, tapped by its observer.
pub struct ObservedPrimitives {
    observer: Arc<NetworkObserver>,
    fetch: ObserveLayer,
    resource_load: ObserveLayer,
}

impl ObservedPrimitives {
    pub fn install(observer: Arc<NetworkObserver>) -> Result<Self> {
        let fetch = observer
            .install(RequestKind::Fetch)
            .context("fetch primitive is already observed")?;
        let resource_load = observer
            .install(RequestKind::ResourceLoad)
            .context("resource-load primitive is already observed")?;
        Ok(Self {
            observer,
            fetch,
            resource_load,
        })
    }

    pub fn layer(&self, kind: RequestKind) -> &ObserveLayer {
        match kind {
            RequestKind::Fetch => &self.fetch,
            RequestKind::ResourceLoad => &self.resource_load,
        }
    }

    pub fn observer(&self) -> &Arc<NetworkObserver> {
        &self.observer
    }

    /// The HTTP fetch primitive, observed.
    pub fn http_fetch(
        &self,
        client: Client,
    ) -> impl Service<Url, Response = reqwest::Response, Error = reqwest::Error> {
        self.fetch.layer(service_fn(move |url: Url| {
            let client = client.clone();
            async move { client.get(url).send().await }
        }))
    }
}

/// Where the page document comes from.
pub struct PageSource<'a> {
    pub url: &'a str,
    pub html: Option<&'a Path>,
    pub har: Option<&'a Path>,
}

/// Loads the page, replays or performs its requests through the observed
/// primitives, then creates the detector context (which runs the on-load
/// scan).
pub async fn load_page(
    source: PageSource<'_>,
    client: &Client,
    config: DetectorConfig,
) -> Result<PageContext> {
    let primitives = ObservedPrimitives::install(NetworkObserver::new())?;

    let har = match source.har {
        Some(path) => Some(HarLog::load(path).await?),
        None => None,
    };
    if let Some(har) = &har {
        let replayed = har.replay(&primitives).await;
        info!(replayed, "replayed recorded requests");
    }

    let html = match (source.html, har.as_ref().and_then(|h| h.document(source.url))) {
        (Some(path), _) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, Some(recorded)) => {
            debug!("using the document recorded in the HAR file");
            recorded.to_string()
        }
        (None, None) => fetch_document(&primitives, client, source.url).await?,
    };

    PageContext::load_with_observer(source.url, &html, config, primitives.observer().clone())
        .with_context(|| format!("Failed to load page {}", source.url))
}

async fn fetch_document(primitives: &ObservedPrimitives, client: &Client, url: &str) -> Result<String> {
    let url = Url::parse(url).with_context(|| format!("Invalid page URL: {url}"))?;
    let response = primitives
        .http_fetch(client.clone())
        .oneshot(url.clone())
        .await
        .with_context(|| format!("Failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("Server rejected {url}"))?;
    let html = response
        .text()
        .await
        .with_context(|| format!("Failed to read the body of {url}"))?;
    debug!(bytes = html.len(), "page fetched");
    Ok(html)
}
