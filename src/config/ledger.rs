//! Log ingestion and friend cooldown settings

use crate::ledger::IngestConfig;
use serde::Deserialize;
use std::time::Duration;

/// `[ledger]` section: how the activity log is fetched and stored
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Entries per log page (the game caps this at 100)
    pub page_size: u32,
    /// Pause between pages when ingesting in the background
    pub background_delay_ms: u64,
    /// Key prefix for the persisted aggregates
    pub namespace: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            background_delay_ms: 1000,
            namespace: "betterfriends".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLedger {
    pub page_size: Option<u32>,
    pub background_delay_ms: Option<u64>,
    pub namespace: Option<String>,
}

impl LedgerConfig {
    pub fn from_file(file: Option<FileLedger>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            page_size: file.page_size.unwrap_or(defaults.page_size).clamp(1, 100),
            background_delay_ms: file
                .background_delay_ms
                .unwrap_or(defaults.background_delay_ms),
            namespace: file.namespace.unwrap_or(defaults.namespace),
        }
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            page_size: self.page_size,
            background_delay: Duration::from_millis(self.background_delay_ms),
        }
    }
}

/// `[friends]` section
#[derive(Debug, Clone)]
pub struct FriendsConfig {
    /// Hours between two sends to the same friend
    pub cooldown_hours: u32,
}

impl Default for FriendsConfig {
    fn default() -> Self {
        Self { cooldown_hours: 23 }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileFriends {
    pub cooldown_hours: Option<u32>,
}

impl FriendsConfig {
    pub fn from_file(file: Option<FileFriends>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            cooldown_hours: file
                .cooldown_hours
                .unwrap_or(Self::default().cooldown_hours),
        }
    }

    pub fn cooldown_secs(&self) -> i64 {
        i64::from(self.cooldown_hours) * 3600
    }
}
