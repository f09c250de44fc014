//! Event activity log: fetching, aggregation and persistence

pub mod aggregates;
pub mod error;
pub mod fetcher;
pub mod ingest;
pub mod store;

pub use aggregates::{LogAggregates, PlayerLogEntry};
pub use error::{IngestError, StoreError};
pub use ingest::{IngestConfig, LogIngestor, RunMode, RunReport};
pub use store::{FileStore, KeyValueStore, LogStore, MemoryStore};
