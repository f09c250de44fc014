//! Log ingestion driver
//!
//! Pulls the event activity log page by page until it runs out or reaches
//! entries that a previous run already counted, then persists the new
//! snapshot.
//!
//! # Run lifecycle
//!
//! ```text
//! process()
//!     │
//!     ├──→ try_lock run state ──(held)──→ Err(AlreadyRunning)
//!     ├──→ no new activity ──→ cached snapshot, no network
//!     └──→ load store → reset on event change
//!             │
//!             └──→ page 1, 2, ... (sequential, optional delay between)
//!                     │
//!                     ├──(error)──→ discard working copy, keep store, re-flag
//!                     └──(done)───→ watermark → save → cache → unlock
//! ```

use super::aggregates::LogAggregates;
use super::error::{IngestError, StoreError};
use super::fetcher::fetch_page;
use super::store::LogStore;
use crate::game::GameApi;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// How the caller is waiting for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Nobody is watching: space page fetches out
    Background,
    /// The user opened the panel: fetch back to back
    Interactive,
}

/// Ingestion tuning
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Entries requested per page
    pub page_size: u32,
    /// Pause between pages in [`RunMode::Background`]
    pub background_delay: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            background_delay: Duration::from_millis(1000),
        }
    }
}

/// Summary of one completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Pages requested from the server (0 when the run was skipped)
    pub pages_fetched: u32,
    /// New entries folded into the aggregates
    pub entries_ingested: usize,
}

/// Owns the cached aggregates and serializes access to them
pub struct LogIngestor {
    store: LogStore,
    config: IngestConfig,
    /// Held for the whole run; the in-memory copy of the last saved snapshot
    cached: Mutex<LogAggregates>,
    /// Currency arrived since the last completed run. True at startup.
    new_activity: AtomicBool,
}

impl LogIngestor {
    pub fn new(store: LogStore, config: IngestConfig) -> Self {
        Self {
            store,
            config,
            cached: Mutex::new(LogAggregates::default()),
            new_activity: AtomicBool::new(true),
        }
    }

    /// Record that the game reported incoming currency
    pub fn mark_new_activity(&self) {
        self.new_activity.store(true, Ordering::SeqCst);
    }

    pub fn has_new_activity(&self) -> bool {
        self.new_activity.load(Ordering::SeqCst)
    }

    /// Aggregates as last persisted, without touching the network
    pub fn stored(&self) -> Result<LogAggregates, StoreError> {
        self.store.load()
    }

    /// Latest completed snapshot, or `None` while a run is in progress
    pub fn snapshot(&self) -> Option<LogAggregates> {
        self.cached.try_lock().ok().map(|cached| cached.clone())
    }

    /// Bring the aggregates up to date for `event_key`
    ///
    /// Fails fast with [`IngestError::AlreadyRunning`] when another run holds
    /// the lock. On any other error nothing is persisted and the watermark
    /// stays where it was.
    pub async fn process(
        &self,
        api: &dyn GameApi,
        event_key: &str,
        mode: RunMode,
    ) -> Result<(LogAggregates, RunReport), IngestError> {
        let mut cached = self
            .cached
            .try_lock()
            .map_err(|_| IngestError::AlreadyRunning)?;

        // Clear up front so currency arriving mid-run flags the next one
        if !self.new_activity.swap(false, Ordering::SeqCst) {
            tracing::debug!("No new activity since last run, using cached logs");
            return Ok((cached.clone(), RunReport::default()));
        }

        match self.run(api, event_key, mode).await {
            Ok((aggregates, report)) => {
                *cached = aggregates;
                tracing::info!(
                    "Log ingestion done: {} entries over {} page(s), watermark {}",
                    report.entries_ingested,
                    report.pages_fetched,
                    cached.metadata.newest_seen
                );
                Ok((cached.clone(), report))
            }
            Err(e) => {
                self.mark_new_activity();
                tracing::warn!("Log ingestion failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        api: &dyn GameApi,
        event_key: &str,
        mode: RunMode,
    ) -> Result<(LogAggregates, RunReport), IngestError> {
        let mut aggregates = self.store.load()?;
        if !aggregates.is_for(event_key) {
            tracing::info!(
                "Event changed ({:?} -> {}), discarding cached logs",
                aggregates.metadata.ses_key,
                event_key
            );
            aggregates.reset_for(event_key);
        }

        let watermark = aggregates.metadata.newest_seen;
        let mut newest = watermark;
        let mut report = RunReport::default();
        let mut page = 1;

        loop {
            let outcome = fetch_page(
                api,
                event_key,
                page,
                self.config.page_size,
                watermark,
                newest,
                &mut aggregates,
            )
            .await?;
            newest = outcome.newest;
            report.pages_fetched += 1;
            report.entries_ingested += outcome.processed;
            page += 1;

            if !outcome.has_next {
                break;
            }
            if mode == RunMode::Background && !self.config.background_delay.is_zero() {
                tokio::time::sleep(self.config.background_delay).await;
            }
        }

        aggregates.metadata.newest_seen = newest;
        self.store.save(&aggregates)?;
        Ok((aggregates, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testing::{drop_from, page, ScriptedGame};
    use crate::game::FRIEND_DROP;
    use crate::ledger::store::{FlakyStore, KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn ingestor() -> LogIngestor {
        ingestor_with(MemoryStore::new())
    }

    fn ingestor_with(kv: impl KeyValueStore + 'static) -> LogIngestor {
        LogIngestor::new(
            LogStore::new(Box::new(kv), "test"),
            IngestConfig {
                page_size: 100,
                background_delay: Duration::ZERO,
            },
        )
    }

    fn delayed_ingestor(delay: Duration) -> LogIngestor {
        LogIngestor::new(
            LogStore::new(Box::new(MemoryStore::new()), "test"),
            IngestConfig {
                page_size: 100,
                background_delay: delay,
            },
        )
    }

    fn three_pages() -> Vec<crate::game::LogPage> {
        vec![
            page(&[drop_from(600, 5, 1)], true),
            page(&[drop_from(500, 5, 2)], true),
            page(&[drop_from(400, 5, 3)], false),
        ]
    }

    fn two_pages() -> Vec<crate::game::LogPage> {
        vec![
            page(&[drop_from(500, 5, 1), drop_from(450, 5, 2)], true),
            page(&[drop_from(400, 5, 1), (350, "questDrop", 20, None)], false),
        ]
    }

    #[tokio::test]
    async fn test_fetches_pages_in_order_until_exhausted() {
        let game = ScriptedGame::new().with_pages(two_pages());
        let ingestor = ingestor();

        let (aggregates, report) = ingestor
            .process(&game, "Hearts", RunMode::Interactive)
            .await
            .unwrap();

        assert_eq!(
            game.requests(),
            vec![
                ("Hearts".to_string(), 1, 100),
                ("Hearts".to_string(), 2, 100)
            ]
        );
        assert_eq!(report.pages_fetched, 2);
        assert_eq!(report.entries_ingested, 4);
        assert_eq!(aggregates.metadata.newest_seen, 500);
        assert_eq!(aggregates.metadata.ses_key.as_deref(), Some("Hearts"));
        assert_eq!(aggregates.drop_type_logs[FRIEND_DROP], 15);
        assert_eq!(aggregates.drop_type_logs["questDrop"], 20);
        assert_eq!(aggregates.player(1).frequency, vec![500, 400]);
        assert!(!ingestor.has_new_activity());
    }

    #[tokio::test]
    async fn test_no_activity_means_no_network_and_same_bytes() {
        let game = ScriptedGame::new().with_pages(two_pages());
        let ingestor = ingestor();

        let (first, _) = ingestor
            .process(&game, "Hearts", RunMode::Interactive)
            .await
            .unwrap();
        let stored = ingestor.store.raw_values().unwrap();
        let calls = game.request_count();

        let (second, report) = ingestor
            .process(&game, "Hearts", RunMode::Interactive)
            .await
            .unwrap();

        assert_eq!(game.request_count(), calls);
        assert_eq!(report, RunReport::default());
        assert_eq!(first, second);
        assert_eq!(ingestor.store.raw_values().unwrap(), stored);
    }

    #[tokio::test]
    async fn test_resumes_from_watermark() {
        let game = ScriptedGame::new().with_pages(two_pages());
        let ingestor = ingestor();
        ingestor
            .process(&game, "Hearts", RunMode::Interactive)
            .await
            .unwrap();

        // Two new entries on top, then what we already have
        game.set_pages(vec![
            page(
                &[
                    drop_from(700, 5, 2),
                    drop_from(600, 5, 3),
                    drop_from(500, 5, 1),
                    drop_from(450, 5, 2),
                ],
                true,
            ),
            page(&[drop_from(400, 5, 1)], false),
        ]);
        ingestor.mark_new_activity();

        let before = game.request_count();
        let (aggregates, report) = ingestor
            .process(&game, "Hearts", RunMode::Interactive)
            .await
            .unwrap();

        assert_eq!(game.request_count() - before, 1);
        assert_eq!(report.entries_ingested, 2);
        assert_eq!(aggregates.metadata.newest_seen, 700);
        assert_eq!(aggregates.drop_type_logs[FRIEND_DROP], 25);
        assert_eq!(aggregates.player(2).frequency, vec![450, 700]);
        assert_eq!(aggregates.player(3).total, 5);
    }

    #[tokio::test]
    async fn test_event_change_discards_previous_aggregates() {
        let kv = MemoryStore::new();
        kv.set(
            "test.logsMetadata",
            r#"{"sesKey":"E1","newestSeen":9999999999}"#,
        )
        .unwrap();
        kv.set("test.dropTypeLogs", r#"{"friendDrop":500}"#).unwrap();
        kv.set("test.playerLogs", r#"{"7":{"total":500,"frequency":[1]}}"#)
            .unwrap();
        let ingestor = ingestor_with(kv);
        let game = ScriptedGame::new().with_pages(two_pages());

        let (aggregates, _) = ingestor
            .process(&game, "E2", RunMode::Interactive)
            .await
            .unwrap();

        assert_eq!(aggregates.metadata.ses_key.as_deref(), Some("E2"));
        assert_eq!(aggregates.drop_type_logs[FRIEND_DROP], 15);
        assert!(!aggregates.player_logs.contains_key(&7));
        assert_eq!(ingestor.store.load().unwrap(), aggregates);
    }

    #[tokio::test]
    async fn test_failed_page_persists_nothing_and_releases_lock() {
        let game = ScriptedGame::new().with_pages(two_pages());
        game.fail_on_page(Some(2));
        let ingestor = ingestor();

        let result = ingestor
            .process(&game, "Hearts", RunMode::Interactive)
            .await;

        assert!(matches!(result, Err(IngestError::Remote { page: 2, .. })));
        assert_eq!(ingestor.store.raw_values().unwrap(), [None, None, None]);
        assert!(ingestor.has_new_activity());
        assert_eq!(ingestor.snapshot(), Some(LogAggregates::default()));

        // Next run starts over from page 1 and counts everything once
        game.fail_on_page(None);
        let (aggregates, _) = ingestor
            .process(&game, "Hearts", RunMode::Interactive)
            .await
            .unwrap();
        assert_eq!(aggregates.drop_type_logs[FRIEND_DROP], 15);
        assert_eq!(game.requests().last().map(|r| r.1), Some(2));
    }

    #[tokio::test]
    async fn test_concurrent_run_is_rejected() {
        let game = Arc::new(ScriptedGame::new().with_pages(two_pages()));
        game.gate_next_fetch();
        let ingestor = Arc::new(ingestor());

        let first = {
            let game = game.clone();
            let ingestor = ingestor.clone();
            tokio::spawn(async move {
                ingestor
                    .process(game.as_ref(), "Hearts", RunMode::Background)
                    .await
            })
        };
        game.entered.notified().await;

        let second = ingestor
            .process(game.as_ref(), "Hearts", RunMode::Interactive)
            .await;
        assert!(matches!(second, Err(IngestError::AlreadyRunning)));
        assert_eq!(game.request_count(), 1);
        assert_eq!(ingestor.snapshot(), None);

        game.release.notify_one();
        let (aggregates, report) = first.await.unwrap().unwrap();
        assert_eq!(report.pages_fetched, 2);
        assert_eq!(game.request_count(), 2);
        assert_eq!(aggregates.metadata.newest_seen, 500);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_watermark_and_counts_on_retry() {
        let kv = Arc::new(FlakyStore::new());
        let ingestor = ingestor_with(kv.clone());
        let game = ScriptedGame::new().with_pages(vec![page(
            &[drop_from(500, 5, 1), drop_from(400, 5, 1)],
            false,
        )]);

        kv.fail_next_set("test.playerLogs");
        let result = ingestor
            .process(&game, "Hearts", RunMode::Interactive)
            .await;

        assert!(matches!(
            &result,
            Err(IngestError::Store(StoreError::Io { key, .. })) if key == "test.playerLogs"
        ));
        assert_eq!(ingestor.store.raw_values().unwrap(), [None, None, None]);
        assert!(ingestor.has_new_activity());

        let (aggregates, _) = ingestor
            .process(&game, "Hearts", RunMode::Interactive)
            .await
            .unwrap();
        assert_eq!(aggregates.player(1).total, 10);
        assert_eq!(aggregates.drop_type_logs[FRIEND_DROP], 10);
        assert_eq!(ingestor.store.load().unwrap(), aggregates);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_waits_between_pages_only() {
        let delay = Duration::from_secs(1);
        let game = ScriptedGame::new().with_pages(three_pages());
        let ingestor = delayed_ingestor(delay);

        let started = tokio::time::Instant::now();
        let (_, report) = ingestor
            .process(&game, "Hearts", RunMode::Background)
            .await
            .unwrap();

        // Two gaps for three pages, none after the last one
        assert_eq!(report.pages_fetched, 3);
        let waited = started.elapsed();
        assert!(waited >= delay * 2, "waited {:?}", waited);
        assert!(waited < delay * 3, "waited {:?}", waited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interactive_never_waits() {
        let game = ScriptedGame::new().with_pages(three_pages());
        let ingestor = delayed_ingestor(Duration::from_secs(1));

        let started = tokio::time::Instant::now();
        let (_, report) = ingestor
            .process(&game, "Hearts", RunMode::Interactive)
            .await
            .unwrap();

        assert_eq!(report.pages_fetched, 3);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
