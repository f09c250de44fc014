//! Game API error types

use thiserror::Error;

/// Errors returned by a remote call to the game
#[derive(Error, Debug)]
pub enum GameError {
    /// The server answered with `error: true`; the message is meant for the player
    #[error("{0}")]
    Server(String),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl GameError {
    /// Build a server error from an optional message
    pub fn server(msg: Option<String>) -> Self {
        GameError::Server(msg.unwrap_or_else(|| "The server rejected the request".to_string()))
    }
}
