//! Passive observation of the requests page code issues.
//!
//! The host wraps each of its two request primitives (programmatic fetches
//! and resource loads) with the [`ObserveLayer`] obtained from
//! [`NetworkObserver::install`]. The wrapped service forwards every call
//! unchanged; the observer only records URLs that look like streaming
//! resources into the page's [`ObservedUrls`].

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tower::{Layer, Service};
use tracing::{debug, warn};
use url::Url;

use crate::detector::classifier::is_streaming_url;

/// The request primitive a call was issued through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestKind {
    /// Programmatic HTTP calls (`fetch`, XHR).
    Fetch,
    /// Resource loads issued by elements (media, scripts, images).
    ResourceLoad,
}

impl RequestKind {
    const COUNT: usize = 2;

    fn index(self) -> usize {
        match self {
            RequestKind::Fetch => 0,
            RequestKind::ResourceLoad => 1,
        }
    }
}

/// Receives every request URL before the request is forwarded.
///
/// Implementations must be cheap and must not block: they run inline on the
/// caller's task.
pub trait RequestObserver: Send + Sync {
    fn on_request(&self, kind: RequestKind, url: &str);
}

/// Anything a wrapped primitive accepts as a request.
pub trait RequestUrl {
    fn request_url(&self) -> &str;
}

impl RequestUrl for String {
    fn request_url(&self) -> &str {
        self
    }
}

impl RequestUrl for &str {
    fn request_url(&self) -> &str {
        self
    }
}

impl RequestUrl for Url {
    fn request_url(&self) -> &str {
        self.as_str()
    }
}

#[derive(Default)]
struct ObservedInner {
    order: Vec<String>,
    seen: FxHashSet<String>,
}

/// Append-only, insertion-ordered set of observed streaming URLs.
///
/// Lives as long as the page context that owns it; never pruned.
#[derive(Default)]
pub struct ObservedUrls {
    inner: RwLock<ObservedInner>,
}

impl ObservedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url`; returns false if it was already present.
    pub fn insert(&self, url: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.seen.contains(url) {
            return false;
        }
        inner.seen.insert(url.to_string());
        inner.order.push(url.to_string());
        true
    }

    /// Copy of the current contents, in insertion order.
    pub fn snapshot(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.inner.read().seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ObservedUrls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.inner.read().order.iter()).finish()
    }
}

/// The page's request observer. Created once per page context.
#[derive(Debug)]
pub struct NetworkObserver {
    observed: Arc<ObservedUrls>,
    installed: [AtomicBool; RequestKind::COUNT],
}

impl NetworkObserver {
    pub fn new() -> Arc<Self> {
        Self::with_urls(Arc::new(ObservedUrls::new()))
    }

    pub fn with_urls(observed: Arc<ObservedUrls>) -> Arc<Self> {
        Arc::new(Self {
            observed,
            installed: [AtomicBool::new(false), AtomicBool::new(false)],
        })
    }

    /// Returns the layer wrapping the `kind` primitive.
    ///
    /// Only the first call per kind yields a layer; later calls return
    /// `None` so a primitive is never wrapped twice.
    pub fn install(self: &Arc<Self>, kind: RequestKind) -> Option<ObserveLayer> {
        if self.installed[kind.index()].swap(true, Ordering::AcqRel) {
            warn!(%kind, "request observer already installed, ignoring");
            return None;
        }
        debug!(%kind, "request observer installed");
        Some(ObserveLayer::new(self.clone(), kind))
    }

    pub fn is_installed(&self, kind: RequestKind) -> bool {
        self.installed[kind.index()].load(Ordering::Acquire)
    }

    pub fn observed(&self) -> &Arc<ObservedUrls> {
        &self.observed
    }
}

impl RequestObserver for NetworkObserver {
    fn on_request(&self, kind: RequestKind, url: &str) {
        if is_streaming_url(url) && self.observed.insert(url) {
            debug!(%kind, url, "streaming request observed");
        }
    }
}

/// [`Layer`] adding observation to a request primitive.
#[derive(Clone)]
pub struct ObserveLayer {
    observer: Arc<dyn RequestObserver>,
    kind: RequestKind,
}

impl ObserveLayer {
    pub fn new(observer: Arc<dyn RequestObserver>, kind: RequestKind) -> Self {
        Self { observer, kind }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

impl<S> Layer<S> for ObserveLayer {
    type Service = ObserveService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ObserveService {
            inner,
            observer: self.observer.clone(),
            kind: self.kind,
        }
    }
}

/// A request primitive with an observer tap in front of it.
#[derive(Clone)]
pub struct ObserveService<S> {
    inner: S,
    observer: Arc<dyn RequestObserver>,
    kind: RequestKind,
}

impl<S, R> Service<R> for ObserveService<S>
where
    S: Service<R>,
    R: RequestUrl,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: R) -> Self::Future {
        let observer = &self.observer;
        let kind = self.kind;
        let url = req.request_url();
        if catch_unwind(AssertUnwindSafe(|| observer.on_request(kind, url))).is_err() {
            warn!(%kind, "request observer panicked, request forwarded unobserved");
        }
        self.inner.call(req)
    }
}
