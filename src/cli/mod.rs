mod ask;
mod completions;
mod digest;
mod health;
mod index;
mod init;
mod onboard;
mod preflight;
mod shell;
mod snippet;
mod theme;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::Config;
use crate::controller::{Notice, Notifier, RepoToolsController};
use crate::http::HttpGateway;
use crate::theme::{FileStore, ThemePreference};

#[derive(Parser)]
#[command(name = "repoguide")]
#[command(about = "Ask questions about a repository and get it ready for onboarding")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Show detailed progress
    #[arg(long, global = true)]
    verbose: bool,

    /// Gateway base URL (overrides the config file)
    #[arg(long, global = true, env = "REPOGUIDE_API_BASE")]
    server: Option<String>,

    /// Directory holding config.toml and preferences.toml
    #[arg(long, global = true, env = "REPOGUIDE_HOME")]
    home: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init(init::InitArgs),

    /// Check that the gateway is up
    Health,

    /// Ask a question about the repository
    Ask(ask::AskArgs),

    /// Print the source excerpt for a line range
    Snippet(snippet::SnippetArgs),

    /// Run environment preflight checks
    Preflight(preflight::PreflightArgs),

    /// Index a folder for question answering
    Index(index::IndexArgs),

    /// Summarize recent changes
    Digest(digest::DigestArgs),

    /// Build an onboarding plan (preflight, optional index, links, next steps)
    Onboard(onboard::OnboardArgs),

    /// Show or change the display theme
    Theme(theme::ThemeArgs),

    /// Interactive session with concurrent actions
    Shell,

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn run(self) -> Result<()> {
        let output = OutputConfig {
            json: self.json,
            quiet: self.quiet,
            verbose: self.verbose,
        };

        if let Commands::Completions(args) = self.command {
            completions::run(args);
            return Ok(());
        }

        let home = match self.home {
            Some(home) => home,
            None => Config::default_home()?,
        };

        if let Commands::Init(args) = self.command {
            return init::run(args, &home, self.server.as_deref(), output);
        }

        let ctx = AppContext::load(home, self.server.as_deref())?;

        match self.command {
            Commands::Health => health::run(&ctx, output).await,
            Commands::Ask(args) => ask::run(args, &ctx, output).await,
            Commands::Snippet(args) => snippet::run(args, &ctx, output).await,
            Commands::Preflight(args) => preflight::run(args, &ctx, output).await,
            Commands::Index(args) => index::run(args, &ctx, output).await,
            Commands::Digest(args) => digest::run(args, &ctx, output).await,
            Commands::Onboard(args) => onboard::run(args, &ctx, output).await,
            Commands::Theme(args) => theme::run(args, ctx, output),
            Commands::Shell => shell::run(ctx, output).await,
            Commands::Init(_) | Commands::Completions(_) => unreachable!("handled above"),
        }
    }
}

/// Output configuration passed to all commands
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
    pub verbose: bool,
}

impl OutputConfig {
    /// Whether human-oriented output (results, notices, spinners) is shown
    fn human(self) -> bool {
        !self.json && !self.quiet
    }
}

/// Everything a command needs, resolved once per process
pub struct AppContext {
    pub config: Config,
    pub gateway: Arc<HttpGateway>,
    pub theme: ThemePreference,
}

impl AppContext {
    fn load(home: PathBuf, server: Option<&str>) -> Result<Self> {
        let config = Config::load_or_default(&Config::config_path(&home))?;
        let base_url = server.unwrap_or(&config.gateway.base_url);
        let gateway = Arc::new(HttpGateway::new(base_url));
        tracing::debug!(gateway = gateway.base_url(), home = %home.display(), "context loaded");

        let store = FileStore::new(Config::preferences_path(&home));
        tracing::debug!(preferences = %store.path().display(), "loading theme");
        let theme = ThemePreference::load(Box::new(store))?;

        Ok(Self {
            config,
            gateway,
            theme,
        })
    }

    /// A tools controller seeded from config, plus its notice receiver
    fn tools(&self) -> (RepoToolsController, UnboundedReceiver<Notice>) {
        let (notifier, rx) = Notifier::channel();
        let tools = RepoToolsController::new(
            self.gateway.clone(),
            self.config.tools.inputs(),
            self.config.gateway.slot_policy,
            notifier,
        );
        (tools, rx)
    }
}

/// Print any notices that have arrived, without waiting for more.
fn print_notices(rx: &mut UnboundedReceiver<Notice>, output: OutputConfig) {
    while let Ok(notice) = rx.try_recv() {
        tracing::debug!(kind = ?notice.kind, "notice");
        if output.human() {
            println!("{} {}", "✓".green(), notice.message);
        }
    }
}

/// Loading indicator for actions that have one (preflight, onboard).
fn spinner(output: OutputConfig, message: &str) -> Option<ProgressBar> {
    if !output.human() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Print a serializable snapshot as pretty JSON.
fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
