use std::path::Path;

use anyhow::{Result, bail};
use tracing::info;
use video_detector::detector::ScanOutcome;
use video_detector::detector::classifier::detect_platform;

use super::CommandExecutor;
use crate::cli::OutputFormat;
use crate::page::{PageSource, load_page};

impl CommandExecutor {
    pub async fn scan(
        &self,
        url: &str,
        html: Option<&Path>,
        har: Option<&Path>,
        format: Option<OutputFormat>,
    ) -> Result<()> {
        let page = load_page(
            PageSource { url, html, har },
            &self.client,
            self.config.detector.clone(),
        )
        .await?;

        let videos = match page.find_videos() {
            ScanOutcome::Succeeded(videos) => videos,
            ScanOutcome::Failed { error } => bail!("Scan failed: {error}"),
        };
        info!(
            platform = %detect_platform(page.document().hostname()),
            videos = videos.len(),
            "scan complete"
        );

        println!(
            "{}",
            self.output
                .format_candidates(&videos, &self.output_format(format))?
        );
        Ok(())
    }
}
