use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use video_detector::PageContext;

use super::CommandExecutor;
use crate::page::{PageSource, load_page};

impl CommandExecutor {
    /// Loads the page, then answers one JSON response line per request line
    /// on stdin until it closes.
    pub async fn serve(&self, url: &str, html: Option<&Path>, har: Option<&Path>) -> Result<()> {
        let page = load_page(
            PageSource { url, html, har },
            &self.client,
            self.config.detector.clone(),
        )
        .await?;
        info!(page = url, "listening for requests on stdin");

        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let answered = answer_messages(&page, stdin, &mut stdout).await?;
        info!(answered, "stdin closed");
        Ok(())
    }
}

/// One response line per non-blank request line.
async fn answer_messages<R, W>(page: &PageContext, reader: R, writer: &mut W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut answered = 0;
    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = page.handle_raw_message(line);
        debug!(request = line, bytes = response.len(), "answered");
        writer.write_all(response.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        answered += 1;
    }
    Ok(answered)
}
