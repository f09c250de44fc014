// twbf - friend currency companion for timed game events
//
// Sends event currency to friends once their cooldown is over and keeps
// running statistics of what they sent back, built from the game's
// paginated activity log.
//
// Architecture:
// - Game API: HTTP client (or the demo world) behind the `GameApi` trait
// - Ledger: incremental log ingestion into persisted aggregates
// - Session: roster, cooldowns and the ingestor for the running event
// - TUI: friends panel driving sends and refreshes from spawned tasks

mod cli;
mod config;
mod demo;
mod events;
mod game;
mod headless;
mod ledger;
mod logging;
mod session;
mod startup;
mod tui;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use demo::DemoGame;
use events::GameEvent;
use game::client::ClientSettings;
use game::{GameApi, HttpGameClient};
use ledger::{FileStore, KeyValueStore, LogIngestor, LogStore, MemoryStore};
use logging::{LogBuffer, TuiLogLayer};
use session::Session;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Timeout for a single game call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(command) = &cli.command {
        if cli::handle_config_command(command)? {
            return Ok(());
        }
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env()?;

    // The panel only opens when no subcommand was given
    let use_tui = config.enable_tui && cli.command.is_none();

    let log_buffer = LogBuffer::new();
    let _file_guard = init_tracing(&config, use_tui, &log_buffer);

    let demo_game = config.demo_mode.then(|| Arc::new(DemoGame::new()));
    let api: Arc<dyn GameApi> = match &demo_game {
        Some(game) => Arc::clone(game) as Arc<dyn GameApi>,
        None => Arc::new(build_client(&config)?) as Arc<dyn GameApi>,
    };

    let kv: Box<dyn KeyValueStore> = if config.demo_mode {
        Box::new(MemoryStore::new())
    } else {
        Box::new(FileStore::new(&config.data_dir).with_context(|| {
            format!("Cannot open data directory {}", config.data_dir.display())
        })?)
    };
    let ingestor = LogIngestor::new(
        LogStore::new(kv, config.ledger.namespace.clone()),
        config.ledger.ingest_config(),
    );

    let Some(session) = Session::start(
        api,
        ingestor,
        config.player_id,
        config.friends.cooldown_secs(),
    )
    .await
    .context("Could not determine the running event")?
    else {
        println!("No event is currently running.");
        return Ok(());
    };
    let session = Arc::new(session);

    match cli.command {
        Some(Commands::Config { .. }) => {}
        Some(Commands::Friends) => headless::friends(&session).await?,
        Some(Commands::Send { player_id }) => {
            let player_id = cli::validate_player_id(player_id)?;
            headless::send(&session, player_id).await?;
        }
        Some(Commands::Sync { force }) => {
            headless::sync(&session, force).await?;
        }
        Some(Commands::Stats) => headless::stats(&session).await?,
        None if use_tui => {
            startup::print_startup(&config, session.event_key());
            run_panel(session, demo_game, log_buffer).await;
        }
        None => {
            tracing::info!("TUI disabled, running a headless catch-up");
            startup::print_startup(&config, session.event_key());
            headless::catch_up(&session).await?;
        }
    }

    Ok(())
}

/// HTTP client for the configured world; credentials come from the environment
fn build_client(config: &Config) -> Result<HttpGameClient> {
    if config.session_cookie.is_none() || config.token.is_none() {
        bail!("TWBF_SESSION and TWBF_TOKEN must be set (or run with TWBF_DEMO=1)");
    }
    let client = HttpGameClient::new(ClientSettings {
        server_url: config.server_url.clone(),
        session_cookie: config.session_cookie.clone(),
        token: config.token.clone(),
        event_key: config.event_key.clone(),
        timeout: REQUEST_TIMEOUT,
    })?;
    Ok(client)
}

/// Open the panel: friends first, then the panel starts its own background
/// log catch-up. In demo mode a driver keeps currency arriving.
async fn run_panel(
    session: Arc<Session>,
    demo_game: Option<Arc<DemoGame>>,
    log_buffer: LogBuffer,
) {
    if let Err(e) = session.sync_friends().await {
        tracing::error!("Could not load the friend list: {}", e);
    }

    let (event_tx, event_rx) = mpsc::channel::<GameEvent>(100);
    let demo = demo_game.map(|game| {
        tracing::info!("Running in DEMO MODE");
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(demo::run_demo(game, event_tx.clone(), shutdown_rx));
        (shutdown_tx, handle)
    });
    drop(event_tx);

    tracing::info!("Starting TUI");
    if let Err(e) = tui::run_tui(session, event_rx, log_buffer).await {
        tracing::error!("TUI error: {:?}", e);
    }

    if let Some((shutdown_tx, handle)) = demo {
        let _ = shutdown_tx.send(());
        let _ = handle.await;
    }
    tracing::info!("Shutdown complete");
}

/// Initialize tracing with conditional output
///
/// In TUI mode logs go to the in-memory buffer (stderr would garble the
/// display); otherwise to stderr. File logging optionally adds a JSON
/// rolling file. Precedence: RUST_LOG > config file > "info".
///
/// The returned guard must stay alive for the file writer to flush.
fn init_tracing(config: &Config, use_tui: bool, log_buffer: &LogBuffer) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter_directive().into());

    let tui_layer = use_tui.then(|| TuiLogLayer::new(log_buffer.clone()));
    let stderr_layer =
        (!use_tui).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let appender = config.logging.file_appender().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}", e);
        None
    });
    let (file_layer, guard) = match appender {
        Some(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tui_layer)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}
