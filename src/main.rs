use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{io, path::Path, path::PathBuf, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;

use app::api::ApiClient;
use app::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "taskdeck",
    about = "Terminal client for a hosted task tracker",
    version
)]
struct Args {
    /// Path to the TOML configuration file (default: ./taskdeck.toml if present)
    #[arg(long, env = "TASKDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error)
    #[arg(long, env = "TASKDECK_LOG", default_value = "info")]
    log: String,
}

// Start the app: config, logging, terminal, event loop, restore.
pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    // The terminal belongs to the UI, so log output goes to a file.
    let directory = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = config
        .log_file
        .file_name()
        .context("log_file must name a file")?;
    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log).context("invalid log filter")?)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let remote = ApiClient::new(&config)?;
    info!(api_url = %config.api_url, "starting taskdeck");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create an app with 250 ms tick
    let tick_rate = Duration::from_millis(250);
    let app = app::ui::App::new(&remote);
    let res = app::ui::run_app(&mut terminal, app, tick_rate);

    // Restore previous terminal state after exit
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}
