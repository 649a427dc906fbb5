mod cli;
mod commands;
mod config;
mod har;
mod output;
mod page;

use crate::{
    cli::{Args, Commands},
    commands::CommandExecutor,
    config::AppConfig,
};
use anyhow::Result;
use clap::Parser;
use colored::*;
use std::process;
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let json_errors = args
        .command
        .output_format()
        .is_some_and(|format| format.is_json());

    if let Err(e) = run(args).await {
        if json_errors {
            let error_json = serde_json::json!({
                "status": "error",
                "message": format!("{e:#}"),
            });
            println!("{error_json}");
        } else {
            error!("Application error: {:#}", e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet)?;

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(timeout) = args.timeout {
        config.http.timeout_secs = timeout;
    }
    if let Some(user_agent) = args.user_agent {
        config.http.user_agent = user_agent;
    }
    debug!(?config, "configuration loaded");

    match args.command {
        Commands::Scan {
            url,
            html,
            har,
            output,
        } => {
            CommandExecutor::new(config)?
                .scan(&url, html.as_deref(), har.as_deref(), output)
                .await?;
        }
        Commands::Serve { url, html, har } => {
            CommandExecutor::new(config)?
                .serve(&url, html.as_deref(), har.as_deref())
                .await?;
        }
        Commands::Download {
            url,
            title,
            output_dir,
        } => {
            CommandExecutor::new(config)?
                .download(&url, title.as_deref(), output_dir.as_deref())
                .await?;
        }
        Commands::Platforms { output } => {
            CommandExecutor::new(config)?.list_platforms(output)?;
        }
        Commands::Config { show, reset } => {
            if reset {
                let path = AppConfig::reset(args.config.as_deref())?;
                println!("✓ Configuration reset to defaults ({})", path.display());
            } else if show {
                println!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries command output only.
fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .try_init()?;
    Ok(())
}
