//! Ledger error types

use crate::game::GameError;
use thiserror::Error;

/// Errors from the key-value persistence layer
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt value under {key}: {source}")]
    Serde {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from a log ingestion run
#[derive(Error, Debug)]
pub enum IngestError {
    /// Another run holds the lock; nothing was fetched
    #[error("Log ingestion is already running")]
    AlreadyRunning,

    #[error("Fetching log page {page} failed: {source}")]
    Remote {
        page: u32,
        #[source]
        source: GameError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
