use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use m3u8_rs::Playlist;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use url::Url;
use video_detector::detector::classifier::{detect_platform_from_url, get_video_format};
use video_detector::detector::harvester::BLOB_REASON;
use video_detector::{OriginKind, VideoCandidate, VideoFormat};

use super::CommandExecutor;

impl CommandExecutor {
    /// Saves `url`: direct media is streamed to disk, HLS/DASH manifests are
    /// saved as-is. Segment download and reassembly are not performed.
    pub async fn download(
        &self,
        url: &str,
        title: Option<&str>,
        output_dir: Option<&Path>,
    ) -> Result<PathBuf> {
        let candidate = download_candidate(url, title);
        if candidate.format == VideoFormat::Blob {
            bail!("Cannot download {url}: {BLOB_REASON}");
        }
        let parsed = Url::parse(url).with_context(|| format!("Invalid URL: {url}"))?;

        let dir = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.download_dir());
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = unique_path(&dir, &candidate.suggested_filename());

        match candidate.format {
            VideoFormat::Hls | VideoFormat::Dash => {
                self.save_manifest(parsed, candidate.format, &path).await?
            }
            _ => self.save_media(parsed, &path).await?,
        }
        info!(path = %path.display(), format = %candidate.format, "saved");
        println!("{}", path.display());
        Ok(path)
    }

    async fn save_manifest(&self, url: Url, format: VideoFormat, path: &Path) -> Result<()> {
        let body = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch manifest {url}"))?
            .error_for_status()?
            .bytes()
            .await
            .context("Failed to read manifest body")?;

        if format == VideoFormat::Hls {
            describe_playlist(&body);
        }
        let partial = partial_path(path);
        let written = tokio::fs::write(&partial, &body)
            .await
            .with_context(|| format!("Failed to write {}", partial.display()));
        commit_partial(written, &partial, path).await
    }

    async fn save_media(&self, url: Url, path: &Path) -> Result<()> {
        let partial = partial_path(path);
        let streamed = self.stream_media(url, &partial).await;
        commit_partial(streamed, &partial, path).await
    }

    async fn stream_media(&self, url: Url, partial: &Path) -> Result<()> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?
            .error_for_status()?;

        let pb = match response.content_length() {
            Some(total) => {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.yellow} [{bar:30.yellow/white}] {bytes}/{total_bytes} {bytes_per_sec} {msg}")?
                        .progress_chars("=> "),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(ProgressStyle::with_template("{spinner:.blue} {bytes} {msg}")?);
                pb
            }
        };
        pb.set_message(
            partial
                .file_stem()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        let mut file = tokio::fs::File::create(partial)
            .await
            .with_context(|| format!("Failed to create {}", partial.display()))?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    pb.abandon_with_message("Interrupted");
                    return Err(e).context("Download interrupted");
                }
            };
            file.write_all(&chunk).await?;
            pb.inc(chunk.len() as u64);
        }
        file.flush().await?;
        pb.finish_with_message("Done");
        Ok(())
    }
}

/// Candidate describing a user-supplied URL, used for naming the file.
fn download_candidate(url: &str, title: Option<&str>) -> VideoCandidate {
    let format = get_video_format(url);
    let origin = if format.is_streaming() {
        OriginKind::StreamingDetected
    } else {
        OriginKind::DirectElement
    };
    let title = title
        .map(str::to_string)
        .or_else(|| url_stem(url))
        .unwrap_or_default();
    VideoCandidate::builder(url, origin, detect_platform_from_url(url))
        .title(title)
        .build()
}

fn url_stem(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let stem = segment.rsplit_once('.').map_or(segment, |(stem, _)| stem);
    Some(
        urlencoding::decode(stem)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| stem.to_string()),
    )
}

/// `dir/name`, or `dir/stem (n).ext` if that already exists.
fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = filename.rsplit_once('.').unwrap_or((filename, ""));
    (1..)
        .map(|n| {
            if ext.is_empty() {
                dir.join(format!("{stem} ({n})"))
            } else {
                dir.join(format!("{stem} ({n}).{ext}"))
            }
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// `name.part` next to `path`; downloads land there until complete.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Moves a finished `partial` into place, or removes it when `result` failed.
async fn commit_partial(result: Result<()>, partial: &Path, path: &Path) -> Result<()> {
    if let Err(e) = result {
        if let Err(remove) = tokio::fs::remove_file(partial).await {
            if remove.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %partial.display(), error = %remove, "failed to remove partial download");
            }
        }
        return Err(e);
    }
    tokio::fs::rename(partial, path)
        .await
        .with_context(|| format!("Failed to move download into {}", path.display()))
}

fn describe_playlist(body: &[u8]) {
    match m3u8_rs::parse_playlist_res(body) {
        Ok(Playlist::MasterPlaylist(pl)) => {
            info!(variants = pl.variants.len(), "HLS master playlist")
        }
        Ok(Playlist::MediaPlaylist(pl)) => info!(
            segments = pl.segments.len(),
            endlist = pl.end_list,
            "HLS media playlist"
        ),
        Err(e) => warn!(error = ?e, "manifest is not a valid HLS playlist, saving anyway"),
    }
}
