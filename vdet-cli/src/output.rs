use anyhow::Result;
use colored::*;
use serde_json::json;
use video_detector::VideoCandidate;
use video_detector::detector::classifier::PLATFORM_HOSTS;
use video_detector::detector::platforms;

use crate::cli::OutputFormat;

pub struct OutputManager {
    colored: bool,
}

enum Color {
    Green,
    Yellow,
    Blue,
    Cyan,
    Red,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_candidates(
        &self,
        videos: &[VideoCandidate],
        format: &OutputFormat,
    ) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_candidates_pretty(videos)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({ "videos": videos }))?),
            OutputFormat::JsonCompact => Ok(serde_json::to_string(&json!({ "videos": videos }))?),
        }
    }

    fn format_candidates_pretty(&self, videos: &[VideoCandidate]) -> String {
        let mut output = String::new();
        if videos.is_empty() {
            output.push_str(&self.colorize("No videos found", &Color::Yellow, true));
            output.push('\n');
            return output;
        }

        output.push_str(&self.colorize(
            &format!("Found {} video(s):", videos.len()),
            &Color::Green,
            true,
        ));
        output.push('\n');

        for (idx, video) in videos.iter().enumerate() {
            output.push_str(&format!(
                "\n[{}] {}\n",
                idx + 1,
                self.colorize(&video.title, &Color::Green, true)
            ));
            output.push_str(&format!(
                "  {}: {}\n",
                self.colorize("URL", &Color::Yellow, false),
                self.colorize(&video.url, &Color::Blue, false)
            ));
            output.push_str(&format!(
                "  {}: {}\n",
                self.colorize("Format", &Color::Yellow, false),
                self.colorize(video.format.as_str(), &Color::Cyan, false)
            ));
            output.push_str(&format!(
                "  {}: {}\n",
                self.colorize("Type", &Color::Yellow, false),
                self.colorize(&video.kind, &Color::Cyan, false)
            ));
            output.push_str(&format!(
                "  {}: {}\n",
                self.colorize("Platform", &Color::Yellow, false),
                self.colorize(video.platform.as_str(), &Color::Cyan, false)
            ));
            if video.downloadable {
                output.push_str(&format!(
                    "  {}: {}\n",
                    self.colorize("Downloadable", &Color::Yellow, false),
                    self.colorize("yes", &Color::Cyan, false)
                ));
            } else {
                output.push_str(&format!(
                    "  {}: {}\n",
                    self.colorize("Downloadable", &Color::Yellow, false),
                    self.colorize("no", &Color::Red, false)
                ));
                if let Some(reason) = &video.reason {
                    output.push_str(&format!(
                        "  {}: {}\n",
                        self.colorize("Reason", &Color::Yellow, false),
                        reason
                    ));
                }
                if let Some(alternative) = &video.alternative {
                    output.push_str(&format!(
                        "  {}: {}\n",
                        self.colorize("Alternative", &Color::Yellow, false),
                        alternative
                    ));
                }
            }
        }
        output
    }

    pub fn format_platforms(&self, format: &OutputFormat) -> Result<String> {
        let entries: Vec<_> = platforms::profiles()
            .iter()
            .map(|profile| {
                let hosts: Vec<&str> = PLATFORM_HOSTS
                    .iter()
                    .filter(|(_, platform)| *platform == profile.platform)
                    .map(|(host, _)| *host)
                    .collect();
                (profile, hosts)
            })
            .collect();

        match format {
            OutputFormat::Pretty => {
                let mut output = String::new();
                output.push_str(&self.colorize("Supported platforms:", &Color::Green, true));
                output.push('\n');
                for (profile, hosts) in &entries {
                    output.push_str(&format!(
                        "  {} ({})\n",
                        self.colorize(profile.name, &Color::Cyan, true),
                        hosts.join(", ")
                    ));
                    output.push_str(&format!(
                        "    {}: {}\n",
                        self.colorize("Selectors", &Color::Yellow, false),
                        profile.video_selectors.join(" | ")
                    ));
                }
                Ok(output)
            }
            OutputFormat::Json | OutputFormat::JsonCompact => {
                let value: Vec<_> = entries
                    .iter()
                    .map(|(profile, hosts)| {
                        json!({
                            "platform": profile.platform,
                            "name": profile.name,
                            "hosts": hosts,
                            "video_selectors": profile.video_selectors,
                            "title_selectors": profile.title_selectors,
                        })
                    })
                    .collect();
                if *format == OutputFormat::Json {
                    Ok(serde_json::to_string_pretty(&value)?)
                } else {
                    Ok(serde_json::to_string(&value)?)
                }
            }
        }
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        if !self.colored {
            return text.to_string();
        }
        let colored_text = match color {
            Color::Green => text.green(),
            Color::Yellow => text.yellow(),
            Color::Blue => text.blue(),
            Color::Cyan => text.cyan(),
            Color::Red => text.red(),
        };
        if bold {
            colored_text.bold().to_string()
        } else {
            colored_text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use video_detector::{OriginKind, Platform};

    fn videos() -> Vec<VideoCandidate> {
        vec![
            VideoCandidate::builder(
                "https://cdn.example.com/clip.mp4",
                OriginKind::DirectElement,
                Platform::Generic,
            )
            .title("Clip")
            .build(),
            VideoCandidate::builder(
                "blob:https://www.tiktok.com/abc-def",
                OriginKind::Blob,
                Platform::TikTok,
            )
            .title("Dance")
            .not_downloadable("in-page only", "use the share button")
            .build(),
        ]
    }

    #[test]
    fn test_pretty_lists_every_video() {
        let out = OutputManager::new(false)
            .format_candidates(&videos(), &OutputFormat::Pretty)
            .unwrap();
        assert!(out.starts_with("Found 2 video(s):"));
        assert!(out.contains("[1] Clip"));
        assert!(out.contains("Reason: in-page only"));
    }

    #[test]
    fn test_json_matches_message_shape() {
        let out = OutputManager::new(false)
            .format_candidates(&videos(), &OutputFormat::JsonCompact)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["videos"][1]["type"], "tiktok_blob");
        assert_eq!(value["videos"][1]["downloadable"], false);
    }

    #[test]
    fn test_platform_listing() {
        let out = OutputManager::new(false)
            .format_platforms(&OutputFormat::JsonCompact)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let names: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"YouTube"));
        assert!(names.contains(&"Twitch"));
    }
}
