use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use super::OutputConfig;
use crate::config::Config;

#[derive(Args)]
pub struct InitArgs {
    /// Default repository path for the tool commands
    #[arg(long)]
    path: Option<String>,

    /// Overwrite existing configuration
    #[arg(long)]
    force: bool,
}

#[derive(Serialize)]
struct InitOutput {
    status: String,
    config: String,
    base_url: String,
}

pub fn run(args: InitArgs, home: &Path, server: Option<&str>, output: OutputConfig) -> Result<()> {
    let config_path = Config::config_path(home);

    if config_path.exists() && !args.force {
        if output.json {
            let json_output = InitOutput {
                status: "already_initialized".to_string(),
                config: config_path.display().to_string(),
                base_url: Config::load(&config_path)?.gateway.base_url,
            };
            super::print_json(&json_output)?;
            return Ok(());
        }
        bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let mut config = Config::default();
    if let Some(server) = server {
        config.gateway.base_url = server.trim_end_matches('/').to_string();
    }
    if let Some(path) = args.path {
        config.tools.path = path;
    }
    config.save(&config_path)?;
    tracing::debug!(path = %config_path.display(), "config written");

    if output.json {
        let json_output = InitOutput {
            status: "initialized".to_string(),
            config: config_path.display().to_string(),
            base_url: config.gateway.base_url,
        };
        super::print_json(&json_output)?;
    } else if !output.quiet {
        println!("{} Config written to {}", "✓".green(), config_path.display());
        println!("  Gateway: {}", config.gateway.base_url);
        println!("\nNext steps:");
        println!("  {} to check the gateway", "repoguide health".cyan());
        println!("  {} to ask a question", "repoguide ask <question>".cyan());
    }

    Ok(())
}
