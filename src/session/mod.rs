//! Session context
//!
//! One [`Session`] exists per run of the tool. It owns the per-run state:
//! the friend roster, the active event key and the single [`LogIngestor`]
//! that guards the cached log aggregates.
//! It is shared as `Arc<Session>` between the TUI and the tasks it spawns.

pub mod cooldown;
pub mod roster;

use crate::events::GameEvent;
use crate::game::{GameApi, GameError, PlayerId, Timestamp};
use crate::ledger::{IngestError, LogAggregates, LogIngestor, RunMode, RunReport, StoreError};
use chrono::Utc;
use roster::FriendRoster;
use std::sync::{Arc, Mutex, MutexGuard};

pub use cooldown::{format_remaining, DEFAULT_COOLDOWN_SECS};

/// Per-run state shared by the CLI and the TUI
pub struct Session {
    api: Arc<dyn GameApi>,
    event_key: String,
    own_id: Option<PlayerId>,
    cooldown_secs: i64,
    roster: Mutex<FriendRoster>,
    ingestor: LogIngestor,
}

impl Session {
    /// Ask the game which event is running and build a session for it.
    /// Returns `Ok(None)` when no event is running.
    pub async fn start(
        api: Arc<dyn GameApi>,
        ingestor: LogIngestor,
        own_id: Option<PlayerId>,
        cooldown_secs: i64,
    ) -> Result<Option<Self>, GameError> {
        let keys = api.active_event_keys().await?;
        let Some(event_key) = keys.into_iter().next() else {
            return Ok(None);
        };
        tracing::info!("Active event: {}", event_key);
        Ok(Some(Self::new(api, event_key, ingestor, own_id, cooldown_secs)))
    }

    pub fn new(
        api: Arc<dyn GameApi>,
        event_key: String,
        ingestor: LogIngestor,
        own_id: Option<PlayerId>,
        cooldown_secs: i64,
    ) -> Self {
        Self {
            api,
            event_key,
            own_id,
            cooldown_secs,
            roster: Mutex::new(FriendRoster::default()),
            ingestor,
        }
    }

    pub fn event_key(&self) -> &str {
        &self.event_key
    }

    fn roster(&self) -> MutexGuard<'_, FriendRoster> {
        // Roster updates are single assignments; a poisoned lock still holds valid data
        self.roster.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the roster for rendering
    pub fn roster_snapshot(&self) -> FriendRoster {
        self.roster().clone()
    }

    /// Refresh the roster and last-sent times from the server
    pub async fn sync_friends(&self) -> Result<usize, GameError> {
        let search = self.api.search_friends().await?;
        let mut roster = self.roster();
        roster.merge_search(search, &self.event_key, self.own_id);
        tracing::info!("Friend list synced: {} friends", roster.friend_count());
        Ok(roster.friend_count())
    }

    /// Send event currency to a friend; returns the server's message
    pub async fn send_currency(&self, friend_id: PlayerId) -> Result<String, GameError> {
        let (activation_time, msg) = self.api.activate_event(friend_id, &self.event_key).await?;
        self.roster().record_sent(friend_id, activation_time);
        tracing::info!("Sent currency to {} at {}", friend_id, activation_time);
        Ok(msg)
    }

    /// Bring the log aggregates up to date
    pub async fn process_logs(
        &self,
        mode: RunMode,
    ) -> Result<(LogAggregates, RunReport), IngestError> {
        self.ingestor
            .process(self.api.as_ref(), &self.event_key, mode)
            .await
    }

    /// Last completed aggregates, `None` while a run is in progress
    pub fn logs_snapshot(&self) -> Option<LogAggregates> {
        self.ingestor.snapshot()
    }

    /// Persisted aggregates for the active event; empty when the store
    /// holds another event's logs
    pub fn stored_logs(&self) -> Result<LogAggregates, StoreError> {
        let stored = self.ingestor.stored()?;
        if stored.is_for(&self.event_key) {
            Ok(stored)
        } else {
            Ok(LogAggregates::default())
        }
    }

    /// Currency arrived since the last completed log run
    pub fn has_new_activity(&self) -> bool {
        self.ingestor.has_new_activity()
    }

    /// Force the next [`Session::process_logs`] to hit the network
    pub fn mark_new_activity(&self) {
        self.ingestor.mark_new_activity();
    }

    /// Apply a pushed game notification
    pub fn apply(&self, event: GameEvent) {
        match event {
            GameEvent::FriendAdded(friend) => {
                tracing::debug!("Friend added: {}", friend.name);
                self.roster().add(friend);
            }
            GameEvent::FriendRemoved { player_id } => {
                tracing::debug!("Friend removed: {}", player_id);
                self.roster().remove(player_id);
            }
            GameEvent::CurrencyReceived { amount } => {
                tracing::debug!("Received {} event currency", amount);
                self.ingestor.mark_new_activity();
            }
        }
    }

    pub fn time_until_ready_at(&self, friend_id: PlayerId, now: Timestamp) -> i64 {
        self.roster()
            .time_until_ready(friend_id, now, self.cooldown_secs)
    }

    /// Seconds until `friend_id` can receive again
    pub fn time_until_ready(&self, friend_id: PlayerId) -> i64 {
        self.time_until_ready_at(friend_id, now())
    }

    pub fn ready_count_at(&self, now: Timestamp) -> usize {
        self.roster().ready_count(now, self.cooldown_secs)
    }

    pub fn ready_count(&self) -> usize {
        self.ready_count_at(now())
    }

    pub fn friend_count(&self) -> usize {
        self.roster().friend_count()
    }

    pub fn cooldown_secs(&self) -> i64 {
        self.cooldown_secs
    }
}

/// Current unix time in seconds
pub fn now() -> Timestamp {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testing::{drop_from, friend, page, ScriptedGame};
    use crate::game::EventActivation;
    use crate::ledger::{FileStore, IngestConfig, LogStore, MemoryStore};
    use std::time::Duration;

    fn ingestor() -> LogIngestor {
        LogIngestor::new(
            LogStore::new(Box::new(MemoryStore::new()), "test"),
            IngestConfig {
                page_size: 100,
                background_delay: Duration::ZERO,
            },
        )
    }

    fn game() -> ScriptedGame {
        let mut game = ScriptedGame::new();
        game.friends = vec![friend(1, "me"), friend(2, "Ann"), friend(3, "Bob")];
        game.activations = vec![EventActivation {
            event_name: "Hearts".to_string(),
            friend_id: 3,
            activation_time: now() - 600,
        }];
        game.with_pages(vec![page(&[drop_from(100, 5, 2)], false)])
    }

    async fn session(game: ScriptedGame) -> Session {
        Session::start(Arc::new(game), ingestor(), Some(1), DEFAULT_COOLDOWN_SECS)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_no_event_means_no_session() {
        let mut game = game();
        game.event_keys.clear();
        let session = Session::start(Arc::new(game), ingestor(), None, DEFAULT_COOLDOWN_SECS)
            .await
            .unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_sync_and_counts() {
        let session = session(game()).await;
        assert_eq!(session.event_key(), "Hearts");

        assert_eq!(session.sync_friends().await.unwrap(), 2);
        assert_eq!(session.friend_count(), 2);
        assert_eq!(session.ready_count(), 1);
        assert_eq!(session.time_until_ready(2), 0);
        assert!(session.time_until_ready(3) > DEFAULT_COOLDOWN_SECS - 700);
    }

    #[tokio::test]
    async fn test_send_starts_cooldown() {
        let session = session(game()).await;
        session.sync_friends().await.unwrap();

        let msg = session.send_currency(2).await.unwrap();

        assert_eq!(msg, "Currency sent.");
        let last = session.roster_snapshot().last_sent(2).unwrap();
        assert_eq!(
            session.time_until_ready_at(2, last),
            DEFAULT_COOLDOWN_SECS
        );
    }

    #[tokio::test]
    async fn test_events_update_roster_and_activity() {
        let session = session(game()).await;
        session.sync_friends().await.unwrap();
        session.process_logs(RunMode::Interactive).await.unwrap();
        assert!(!session.ingestor.has_new_activity());

        session.apply(GameEvent::FriendAdded(friend(9, "Dee")));
        session.apply(GameEvent::FriendRemoved { player_id: 2 });
        session.apply(GameEvent::CurrencyReceived { amount: 5 });

        let roster = session.roster_snapshot();
        assert!(roster.get(9).is_some());
        assert!(roster.get(2).is_none());
        assert!(session.ingestor.has_new_activity());
    }

    #[tokio::test]
    async fn test_process_logs_uses_session_event() {
        let session = session(game()).await;
        let (aggregates, _) = session.process_logs(RunMode::Background).await.unwrap();
        assert_eq!(aggregates.metadata.ses_key.as_deref(), Some("Hearts"));
        assert_eq!(aggregates.player(2).total, 5);
        assert_eq!(session.logs_snapshot(), Some(aggregates.clone()));
        assert_eq!(session.stored_logs().unwrap(), aggregates);
    }

    #[tokio::test]
    async fn test_stored_logs_ignore_other_event() {
        let dir = tempfile::tempdir().unwrap();
        let file_ingestor = || {
            LogIngestor::new(
                LogStore::new(Box::new(FileStore::new(dir.path()).unwrap()), "test"),
                IngestConfig {
                    page_size: 100,
                    background_delay: Duration::ZERO,
                },
            )
        };

        let hearts = Session::new(
            Arc::new(game()),
            "Hearts".to_string(),
            file_ingestor(),
            None,
            DEFAULT_COOLDOWN_SECS,
        );
        hearts.process_logs(RunMode::Interactive).await.unwrap();

        let easter = Session::new(
            Arc::new(game()),
            "Easter".to_string(),
            file_ingestor(),
            None,
            DEFAULT_COOLDOWN_SECS,
        );
        assert_eq!(easter.stored_logs().unwrap(), LogAggregates::default());
        assert_eq!(hearts.stored_logs().unwrap().player(2).total, 5);
    }
}
