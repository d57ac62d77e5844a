// gistview: browse public GitHub gists from the terminal.
// Parses CLI flags, loads config, sets up logging, and runs the TUI.

mod app;
mod cache;
mod config;
mod error;
mod github;
mod state;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cache::ResourceCache;
use crate::config::Config;
use crate::error::Result;
use crate::github::GitHubClient;

#[derive(Parser, Debug)]
#[command(name = "gistview")]
#[command(about = "A terminal UI for browsing public GitHub gists")]
#[command(version)]
struct Args {
    /// Path to config file (default: $XDG_CONFIG_HOME/gistview/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gists and commits requested per page (1-100)
    #[arg(short, long)]
    per_page: Option<u32>,

    /// GitHub API base URL
    #[arg(long)]
    api_url: Option<String>,
}

/// Log to a file in the cache dir; the terminal belongs to the UI.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let dir = config::log_dir()?;
    std::fs::create_dir_all(&dir).ok()?;

    let file_appender = tracing_appender::rolling::never(dir, "gistview.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(per_page) = args.per_page {
        config = config.with_per_page(per_page);
    }
    if let Some(api_url) = args.api_url {
        config = config.with_api_url(api_url);
    }

    let _guard = init_tracing(&config);
    info!(api_url = %config.api_url, per_page = config.per_page, "starting gistview");

    let client = Arc::new(GitHubClient::new(&config.api_url)?);
    let avatars = ResourceCache::new(Arc::clone(&client));
    let mut app = App::new(config, client, avatars);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    result?;
    Ok(())
}
