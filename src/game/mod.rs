//! Game API seam
//!
//! Everything the tool needs from the game goes through [`GameApi`]: the
//! friend search, the per-friend event activation and the paginated
//! activity log. The HTTP implementation lives in [`client`]; demo mode and
//! the tests provide in-memory ones.

pub mod client;
pub mod error;
pub mod models;

#[cfg(test)]
pub mod testing;

use async_trait::async_trait;

pub use client::HttpGameClient;
pub use error::GameError;
pub use models::{
    Envelope, EventActivation, Friend, FriendsSearch, LogEntry, LogPage, PlayerId, Timestamp,
    FRIEND_DROP,
};

/// Remote calls the tool makes against the game
#[async_trait]
pub trait GameApi: Send + Sync {
    /// Keys of the currently running events. Empty when nothing is running.
    async fn active_event_keys(&self) -> Result<Vec<String>, GameError>;

    /// Friend roster plus the last activation time of each friend per event
    async fn search_friends(&self) -> Result<FriendsSearch, GameError>;

    /// Send event currency to a friend. Returns the new activation time and
    /// the server message.
    async fn activate_event(
        &self,
        friend_id: PlayerId,
        event_key: &str,
    ) -> Result<(Timestamp, String), GameError>;

    /// One page of the event activity log, newest entries first
    async fn fetch_log_page(
        &self,
        event_key: &str,
        page: u32,
        limit: u32,
    ) -> Result<LogPage, GameError>;
}
