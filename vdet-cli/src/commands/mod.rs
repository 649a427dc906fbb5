mod download;
mod scan;
mod serve;

use std::io::IsTerminal;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::output::OutputManager;

pub struct CommandExecutor {
    config: AppConfig,
    client: Client,
    output: OutputManager,
}

impl CommandExecutor {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.http.user_agent.clone())
            .timeout(config.http.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        let output = OutputManager::new(std::io::stdout().is_terminal());
        Ok(Self {
            config,
            client,
            output,
        })
    }

    fn output_format(&self, requested: Option<OutputFormat>) -> OutputFormat {
        requested.unwrap_or(self.config.output.format)
    }

    pub fn list_platforms(&self, format: Option<OutputFormat>) -> Result<()> {
        println!("{}", self.output.format_platforms(&self.output_format(format))?);
        Ok(())
    }
}
