//! Cached log aggregates
//!
//! Three structures are kept per event: metadata naming the event and the
//! ingestion watermark, per-friend totals, and per-category totals. They
//! serialize with stable camelCase field names so a stored file can be read
//! by other tools.

use crate::game::{LogEntry, PlayerId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which event's logs are cached and how far ingestion has progressed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsMetadata {
    #[serde(default)]
    pub ses_key: Option<String>,
    /// Entries at or before this timestamp are already ingested
    #[serde(default)]
    pub newest_seen: Timestamp,
}

/// Currency received from one friend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLogEntry {
    pub total: i64,
    /// Receive timestamps in the order ingestion met them (newest page first)
    pub frequency: Vec<Timestamp>,
}

/// Category label to accumulated currency
pub type DropTypeLogs = BTreeMap<String, i64>;

/// Friend id to what they sent
pub type PlayerLogs = BTreeMap<PlayerId, PlayerLogEntry>;

/// The full cached state for one event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogAggregates {
    pub metadata: LogsMetadata,
    pub player_logs: PlayerLogs,
    pub drop_type_logs: DropTypeLogs,
}

impl LogAggregates {
    /// Drop all history and start over for `event_key`
    pub fn reset_for(&mut self, event_key: &str) {
        *self = Self {
            metadata: LogsMetadata {
                ses_key: Some(event_key.to_string()),
                newest_seen: 0,
            },
            ..Default::default()
        };
    }

    pub fn is_for(&self, event_key: &str) -> bool {
        self.metadata.ses_key.as_deref() == Some(event_key)
    }

    /// Add a category amount
    pub fn add_drop(&mut self, kind: &str, value: i64) {
        *self.drop_type_logs.entry(kind.to_string()).or_insert(0) += value;
    }

    /// Credit a friend with currency received at `date`
    pub fn add_friend_drop(&mut self, sender: PlayerId, value: i64, date: Timestamp) {
        let entry = self.player_logs.entry(sender).or_default();
        entry.total += value;
        entry.frequency.push(date);
    }

    /// Fold one new log entry into the aggregates
    pub fn apply(&mut self, entry: &LogEntry) {
        self.add_drop(&entry.kind, entry.value);
        if entry.is_friend_drop() {
            match entry.sender() {
                Ok(sender) => self.add_friend_drop(sender, entry.value, entry.date),
                Err(e) => tracing::warn!(
                    "friendDrop at {} has unreadable details {:?}: {}",
                    entry.date,
                    entry.details,
                    e
                ),
            }
        }
    }

    /// What a friend has sent; zero and no dates when they never sent any
    pub fn player(&self, id: PlayerId) -> PlayerLogEntry {
        self.player_logs.get(&id).cloned().unwrap_or_default()
    }

    /// Sum over all categories
    pub fn total_received(&self) -> i64 {
        self.drop_type_logs.values().sum()
    }
}
