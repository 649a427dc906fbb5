use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "vdet", author, version, long_about = None)]
#[command(about = "Detect, list and save the videos embedded in a web page")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "VDET_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP timeout in seconds, overrides the configuration
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// User agent for page and media requests, overrides the configuration
    #[arg(long, global = true, env = "VDET_USER_AGENT")]
    pub user_agent: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a page and print the detected videos
    Scan {
        /// URL of the page
        url: String,

        /// Read the page HTML from a file instead of fetching it
        #[arg(long)]
        html: Option<PathBuf>,

        /// Replay the requests recorded in a HAR file
        #[arg(long)]
        har: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Load a page and answer JSON-lines detector requests on stdin
    Serve {
        url: String,

        #[arg(long)]
        html: Option<PathBuf>,

        #[arg(long)]
        har: Option<PathBuf>,
    },

    /// Save a detected video or manifest to disk
    Download {
        /// Media or manifest URL
        url: String,

        /// Title used for the file name
        #[arg(short, long)]
        title: Option<String>,

        /// Directory to save into
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,
    },

    /// List the recognised platforms
    Platforms {
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Show or reset the configuration
    Config {
        #[arg(long)]
        show: bool,

        #[arg(long, conflicts_with = "show")]
        reset: bool,
    },
}

impl Commands {
    /// Output format requested on the command line, if the command prints one.
    pub fn output_format(&self) -> Option<OutputFormat> {
        match self {
            Commands::Scan { output, .. } | Commands::Platforms { output } => *output,
            Commands::Serve { .. } => Some(OutputFormat::JsonCompact),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
    JsonCompact,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonCompact)
    }
}
