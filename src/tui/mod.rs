// TUI module - Terminal User Interface
//
// This module manages the friends panel using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, game notifications)
// - Spawning sends and log refreshes without blocking the display
//
// Work that talks to the server runs in its own task; results come back
// over a channel as `TaskOutcome`s and are folded into the App.

pub mod app;
pub mod components;
pub mod theme;
pub mod ui;

use crate::events::GameEvent;
use crate::ledger::RunMode;
use crate::logging::LogBuffer;
use crate::session::{format_remaining, Session};
use anyhow::{Context, Result};
use app::{App, TaskOutcome};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the panel until the user quits
pub async fn run_tui(
    session: Arc<Session>,
    mut event_rx: mpsc::Receiver<GameEvent>,
    log_buffer: LogBuffer,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (task_tx, mut task_rx) = mpsc::channel::<TaskOutcome>(32);
    let mut app = App::new(session, log_buffer);

    // The panel opens with a background catch-up of the logs
    spawn_log_refresh(&mut app, &task_tx, RunMode::Background, false);

    let result = run_event_loop(
        &mut terminal,
        &mut app,
        &mut event_rx,
        &mut task_rx,
        &task_tx,
    )
    .await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on keyboard input, the redraw tick, pushed game notifications and
/// finished background tasks, whichever comes first.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_rx: &mut mpsc::Receiver<GameEvent>,
    task_rx: &mut mpsc::Receiver<TaskOutcome>,
    task_tx: &mpsc::Sender<TaskOutcome>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        handle_key_event(app, key_event, task_tx);
                    }
                }
            } => {}

            _ = tick_interval.tick() => {
                app.tick();
            }

            Some(game_event) = event_rx.recv() => {
                app.session.apply(game_event);
                app.refresh_rows();
            }

            Some(outcome) = task_rx.recv() => {
                app.apply_outcome(outcome);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key_event(app: &mut App, key_event: KeyEvent, task_tx: &mpsc::Sender<TaskOutcome>) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    match key_event.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Char('s') | KeyCode::Enter => spawn_send(app, task_tx),
        KeyCode::Char('r') => {
            spawn_friends_sync(app, task_tx);
            spawn_log_refresh(app, task_tx, RunMode::Interactive, false);
        }
        KeyCode::Char('f') => spawn_log_refresh(app, task_tx, RunMode::Interactive, true),
        _ => {}
    }
}

/// Send to the selected friend if their cooldown is over
fn spawn_send(app: &mut App, task_tx: &mpsc::Sender<TaskOutcome>) {
    let Some(row) = app.selected_friend() else {
        return;
    };
    let player_id = row.friend.player_id;
    if row.remaining > 0 {
        let message = format!(
            "{} can receive again in {}",
            row.friend.name,
            format_remaining(row.remaining)
        );
        app.notify(message);
        return;
    }
    if app.sending.contains(&player_id) {
        return;
    }
    app.sending.push(player_id);

    let session = Arc::clone(&app.session);
    let tx = task_tx.clone();
    tokio::spawn(async move {
        let result = session
            .send_currency(player_id)
            .await
            .map_err(|e| e.to_string());
        let _ = tx.send(TaskOutcome::Sent { player_id, result }).await;
    });
}

fn spawn_friends_sync(app: &App, task_tx: &mpsc::Sender<TaskOutcome>) {
    let session = Arc::clone(&app.session);
    let tx = task_tx.clone();
    tokio::spawn(async move {
        let result = session.sync_friends().await.map_err(|e| e.to_string());
        let _ = tx.send(TaskOutcome::FriendsSynced(result)).await;
    });
}

/// Start an ingestion run; `force` makes it hit the network even when no
/// new currency was signalled
fn spawn_log_refresh(
    app: &mut App,
    task_tx: &mpsc::Sender<TaskOutcome>,
    mode: RunMode,
    force: bool,
) {
    if force {
        app.session.mark_new_activity();
    }
    app.syncing = true;

    let session = Arc::clone(&app.session);
    let tx = task_tx.clone();
    tokio::spawn(async move {
        let result = session.process_logs(mode).await;
        let _ = tx.send(TaskOutcome::LogsProcessed(result)).await;
    });
}
