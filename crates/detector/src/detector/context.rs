//! The detector as embedded in one loaded page.

use std::cell::Cell;
use std::sync::Arc;

use tracing::{info, warn};

use crate::detector::config::DetectorConfig;
use crate::detector::error::DetectorError;
use crate::detector::observer::NetworkObserver;
use crate::detector::orchestrator::{DetectionOrchestrator, ScanOutcome, ScanState};
use crate::document::PageDocument;

/// Owns everything whose lifetime is the page's: the document, the request
/// observer with its observed URL set, and the orchestrator.
///
/// Creating a context runs the automatic on-load scan once.
pub struct PageContext {
    document: PageDocument,
    observer: Arc<NetworkObserver>,
    orchestrator: DetectionOrchestrator,
    state: Cell<ScanState>,
}

impl PageContext {
    pub fn load(page_url: &str, html: &str, config: DetectorConfig) -> Result<Self, DetectorError> {
        Self::load_with_observer(page_url, html, config, NetworkObserver::new())
    }

    /// Loads the page with an observer that may already hold URLs recorded
    /// while the page was being fetched.
    pub fn load_with_observer(
        page_url: &str,
        html: &str,
        config: DetectorConfig,
        observer: Arc<NetworkObserver>,
    ) -> Result<Self, DetectorError> {
        let document = PageDocument::parse(page_url, html)?;
        Ok(Self::from_document(document, config, observer))
    }

    pub fn from_document(
        document: PageDocument,
        config: DetectorConfig,
        observer: Arc<NetworkObserver>,
    ) -> Self {
        let ctx = Self {
            document,
            observer,
            orchestrator: DetectionOrchestrator::new(config),
            state: Cell::new(ScanState::Idle),
        };

        let outcome = ctx.find_videos();
        match outcome.error() {
            None => info!(
                page = %ctx.document.url(),
                videos = outcome.videos().len(),
                "initial scan complete"
            ),
            Some(error) => warn!(page = %ctx.document.url(), error, "initial scan failed"),
        }
        ctx
    }

    /// Runs a fresh scan over the document and the observed URLs.
    pub fn find_videos(&self) -> ScanOutcome {
        self.state.set(ScanState::Scanning);
        let outcome = self
            .orchestrator
            .scan(&self.document, self.observer.observed());
        self.state.set(outcome.state());
        outcome
    }

    /// State of the most recent scan.
    pub fn state(&self) -> ScanState {
        self.state.get()
    }

    pub fn observer(&self) -> &Arc<NetworkObserver> {
        &self.observer
    }

    pub fn document(&self) -> &PageDocument {
        &self.document
    }

    pub fn config(&self) -> &DetectorConfig {
        self.orchestrator.config()
    }
}
