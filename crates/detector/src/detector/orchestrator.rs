//! Per-scan coordination: runs every strategy, merges, deduplicates and
//! filters.

use std::panic::{AssertUnwindSafe, catch_unwind};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info, warn};

use crate::detector::config::DetectorConfig;
use crate::detector::error::DetectorError;
use crate::detector::harvester::{harvest_blobs, harvest_custom, harvest_elements, harvest_platform};
use crate::detector::manifest::{from_observed, scan_inline_scripts, scan_platform_scripts};
use crate::detector::observer::ObservedUrls;
use crate::detector::scan::ScanContext;
use crate::detector::utils::parse_selectors;
use crate::document::PageDocument;
use crate::media::VideoCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
    Succeeded,
    Failed,
}

/// Terminal result of one scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Succeeded(Vec<VideoCandidate>),
    /// The pipeline failed; no partial list is ever reported.
    Failed { error: String },
}

impl ScanOutcome {
    pub fn state(&self) -> ScanState {
        match self {
            ScanOutcome::Succeeded(_) => ScanState::Succeeded,
            ScanOutcome::Failed { .. } => ScanState::Failed,
        }
    }

    pub fn videos(&self) -> &[VideoCandidate] {
        match self {
            ScanOutcome::Succeeded(videos) => videos,
            ScanOutcome::Failed { .. } => &[],
        }
    }

    pub fn into_videos(self) -> Vec<VideoCandidate> {
        match self {
            ScanOutcome::Succeeded(videos) => videos,
            ScanOutcome::Failed { .. } => Vec::new(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ScanOutcome::Succeeded(_) => None,
            ScanOutcome::Failed { error } => Some(error),
        }
    }
}

/// Keeps the first candidate per dedup key, preserving order.
pub fn dedup_candidates(candidates: Vec<VideoCandidate>) -> Vec<VideoCandidate> {
    let mut seen = FxHashSet::default();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.dedup_key().to_string()))
        .collect()
}

/// Drops candidates that violate the candidate invariants.
pub fn filter_candidates(
    candidates: Vec<VideoCandidate>,
    config: &DetectorConfig,
) -> Vec<VideoCandidate> {
    candidates
        .into_iter()
        .filter(|c| {
            let keep = c.satisfies_invariants(config.min_url_len, config.min_streaming_url_len);
            if !keep {
                debug!(url = %c.url, kind = %c.kind, "candidate filtered");
            }
            keep
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct DetectionOrchestrator {
    config: DetectorConfig,
}

impl DetectionOrchestrator {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Runs a full scan. Never panics and never returns a partial list.
    pub fn scan(&self, doc: &PageDocument, observed: &ObservedUrls) -> ScanOutcome {
        let observed = observed.snapshot();
        let result = catch_unwind(AssertUnwindSafe(|| self.run_pipeline(doc, &observed)));

        match result {
            Ok(Ok(videos)) => {
                info!(
                    page = %doc.url(),
                    videos = videos.len(),
                    "scan finished"
                );
                ScanOutcome::Succeeded(videos)
            }
            Ok(Err(e)) => {
                warn!(page = %doc.url(), error = %e, "scan failed");
                ScanOutcome::Failed {
                    error: e.to_string(),
                }
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                let error = DetectorError::ScanAborted(message);
                warn!(page = %doc.url(), error = %error, "scan aborted");
                ScanOutcome::Failed {
                    error: error.to_string(),
                }
            }
        }
    }

    fn run_pipeline(
        &self,
        doc: &PageDocument,
        observed: &[String],
    ) -> Result<Vec<VideoCandidate>, DetectorError> {
        let ctx = ScanContext::new(doc, &self.config);
        debug!(platform = %ctx.platform(), "scan started");

        let mut candidates = harvest_elements(&ctx);

        if !self.config.extra_video_selectors.is_empty() {
            let selectors = parse_selectors(&self.config.extra_video_selectors)?;
            candidates.extend(harvest_custom(&ctx, &selectors));
        }

        if let Some(profile) = ctx.profile() {
            candidates.extend(harvest_platform(&ctx, profile));
        }
        if self.config.detect_blobs {
            candidates.extend(harvest_blobs(&ctx));
        }

        candidates.extend(from_observed(&ctx, observed));
        if self.config.scan_inline_scripts {
            candidates.extend(scan_inline_scripts(&ctx));
        }
        if let Some(profile) = ctx.profile() {
            candidates.extend(scan_platform_scripts(&ctx, profile));
        }

        let merged = candidates.len();
        let videos = filter_candidates(dedup_candidates(candidates), &self.config);
        debug!(merged, kept = videos.len(), "candidates merged");
        Ok(videos)
    }
}
