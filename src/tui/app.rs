// TUI application state
//
// The App holds what the panel renders: a snapshot of the roster sorted by
// readiness, the last completed log aggregates, selection and transient
// notifications. The session itself is shared with the background tasks
// the panel spawns; their results come back as `TaskOutcome`s.

use super::components::Toast;
use super::theme::Theme;
use crate::game::{Friend, PlayerId};
use crate::ledger::{IngestError, LogAggregates, RunReport};
use crate::logging::LogBuffer;
use crate::session::{now, Session};
use std::sync::Arc;

/// Result of work the panel started in the background
#[derive(Debug)]
pub enum TaskOutcome {
    FriendsSynced(Result<usize, String>),
    LogsProcessed(Result<(LogAggregates, RunReport), IngestError>),
    Sent {
        player_id: PlayerId,
        result: Result<String, String>,
    },
}

/// One row of the friends table
#[derive(Debug, Clone)]
pub struct FriendRow {
    pub friend: Friend,
    /// Seconds until the friend can receive again
    pub remaining: i64,
}

pub struct App {
    pub session: Arc<Session>,

    /// Rows sorted by remaining cooldown, refreshed every tick
    pub rows: Vec<FriendRow>,

    /// Index into `rows`
    pub selected: usize,

    /// Last completed log aggregates
    pub logs: LogAggregates,

    /// A log ingestion task is running
    pub syncing: bool,

    /// Friends a send is in flight for
    pub sending: Vec<PlayerId>,

    pub toast: Option<Toast>,

    pub log_buffer: LogBuffer,

    pub theme: Theme,

    pub should_quit: bool,
}

impl App {
    pub fn new(session: Arc<Session>, log_buffer: LogBuffer) -> Self {
        // Show persisted totals until the first run of this process completes
        let logs = match session.logs_snapshot() {
            Some(logs) if logs.is_for(session.event_key()) => logs,
            _ => session.stored_logs().unwrap_or_else(|e| {
                tracing::warn!("Could not read stored logs: {}", e);
                LogAggregates::default()
            }),
        };
        let mut app = Self {
            session,
            rows: Vec::new(),
            selected: 0,
            logs,
            syncing: false,
            sending: Vec::new(),
            toast: None,
            log_buffer,
            theme: Theme::default(),
            should_quit: false,
        };
        app.refresh_rows();
        app
    }

    /// Re-read the roster and recompute cooldowns, keeping the selection on
    /// the same friend when it is still there
    pub fn refresh_rows(&mut self) {
        let selected_id = self.selected_friend().map(|r| r.friend.player_id);
        let roster = self.session.roster_snapshot();

        self.rows = roster
            .by_readiness(now(), self.session.cooldown_secs())
            .into_iter()
            .map(|(friend, remaining)| FriendRow { friend, remaining })
            .collect();

        self.selected = selected_id
            .and_then(|id| self.rows.iter().position(|r| r.friend.player_id == id))
            .unwrap_or(self.selected)
            .min(self.rows.len().saturating_sub(1));
    }

    pub fn selected_friend(&self) -> Option<&FriendRow> {
        self.rows.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    /// Called on every tick
    pub fn tick(&mut self) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
        self.refresh_rows();
    }

    /// Fold a finished background task into the display
    pub fn apply_outcome(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::FriendsSynced(Ok(count)) => {
                tracing::debug!("Panel refreshed {} friends", count);
            }
            TaskOutcome::FriendsSynced(Err(msg)) => {
                self.notify(format!("Friend list failed: {}", msg));
            }
            TaskOutcome::LogsProcessed(result) => {
                match result {
                    Ok((logs, report)) => {
                        if report.entries_ingested > 0 {
                            self.notify(format!("{} new log entries", report.entries_ingested));
                        }
                        self.logs = logs;
                        self.syncing = false;
                    }
                    // Another run owns the ingestion; its own outcome clears `syncing`
                    Err(IngestError::AlreadyRunning) => {
                        self.notify("Logs are already being processed");
                    }
                    Err(e) => {
                        self.notify(format!("Log sync failed: {}", e));
                        self.syncing = false;
                    }
                }
            }
            TaskOutcome::Sent { player_id, result } => {
                self.sending.retain(|id| *id != player_id);
                match result {
                    Ok(msg) => self.notify(if msg.is_empty() {
                        "Currency sent".to_string()
                    } else {
                        msg
                    }),
                    Err(msg) => self.notify(msg),
                }
            }
        }
        self.refresh_rows();
    }
}
