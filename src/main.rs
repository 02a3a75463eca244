mod api_client;
mod app_state;
mod articles;
mod config;
mod error;
mod export;
mod logging;
mod models;
mod tui;
mod utils;

use std::io::stdout;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;

use api_client::{run_worker, ApiClient};
use app_state::{source_icon, App, ControllerSettings};
use articles::load_articles;
use config::{AppConfig, Profile};
use error::ClientError;
use tui::run_app;

#[derive(Parser)]
#[command(
    name = "news-dash",
    version,
    about = "Terminal dashboard for the AI news summarizer"
)]
struct Cli {
    /// Config file path (defaults to ./news_dashboard.toml)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Feature profile, overrides the [profile] section
    #[arg(long, value_enum)]
    profile: Option<Profile>,

    /// Backend base URL, e.g. http://localhost:8000
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// JSON file with the article table rows
    #[arg(short, long, value_name = "FILE")]
    articles: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Trigger one backend update and print the result
    Update {
        /// news, arxiv, youtube or all
        source: String,
    },
    /// Print the current article counts
    Stats,
}

fn main() -> Result<()> {
    // 1. Parse CLI args. Logging comes up before the config so config
    // warnings reach the log file; a failure here only costs us the log
    let cli = Cli::parse();
    if let Err(e) = logging::init() {
        eprintln!("warning: logging disabled: {}", e);
    }

    // 2. Load config
    let mut config = AppConfig::load_from(cli.config.as_deref())?;
    if let Some(profile) = cli.profile {
        config.apply_profile(profile);
    }
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }
    if let Some(path) = cli.articles {
        config.articles.path = Some(path);
    }

    let rt = tokio::runtime::Runtime::new()?;
    let client = ApiClient::new(&config.server.base_url, config.server.timeout())?;
    tracing::info!(server = %client.base_url(), "starting");

    // 3. One-shot commands
    if let Some(command) = cli.command {
        if !config.profile.command_aliases {
            bail!("commands are disabled by the active profile");
        }
        return rt.block_on(run_command(&client, command));
    }

    // 4. Article table
    let rows = match &config.articles.path {
        Some(path) => load_articles(path)?,
        None => Vec::new(),
    };

    // 5. Background worker for backend calls
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::channel(16);
    rt.spawn(run_worker(client, cmd_rx, event_tx));

    // 6. Controller
    let mut app = App::new(
        ControllerSettings::from_config(&config),
        rows,
        cmd_tx,
        event_rx,
    );
    app.init(Instant::now());

    // 7. Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // 8. Run event loop
    let result = run_app(&mut terminal, &mut app);

    // 9. Restore terminal (always runs)
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_command(client: &ApiClient, command: Command) -> Result<()> {
    match command {
        Command::Update { source } => match client.trigger_update(&source).await {
            Ok(message) => {
                println!("✅ {}", message);
                Ok(())
            }
            Err(ClientError::RequestFailed { status, detail }) => {
                bail!("❌ Error ({}): {}", status, detail)
            }
            Err(e) => bail!("❌ Connection error: {}", e),
        },
        Command::Stats => {
            let stats = client.fetch_stats().await?;
            println!("Total Articles: {}", stats.total_articles);
            for (source, count) in &stats.by_source {
                println!("{} {}: {}", source_icon(source), source, count);
            }
            Ok(())
        }
    }
}
