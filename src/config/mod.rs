//! Configuration
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/twbf/config.toml)
//! 3. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod ledger;
mod observability;
mod serialization;


pub use ledger::{FileFriends, FileLedger, FriendsConfig, LedgerConfig};
pub use observability::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_SERVER_URL: &str = "https://en1.the-west.net";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// World URL the game runs on
    pub server_url: String,

    /// Session cookie copied from the logged-in browser (env only)
    pub session_cookie: Option<String>,

    /// Per-session `h` token (env only)
    pub token: Option<String>,

    /// Our own player id, excluded from the friend list
    pub player_id: Option<u64>,

    /// Running event key, e.g. "Hearts"
    pub event_key: Option<String>,

    /// Directory holding the persisted log aggregates
    pub data_dir: PathBuf,

    /// Whether to enable the TUI (can be disabled for headless mode)
    pub enable_tui: bool,

    /// Demo mode: run against an in-memory game
    pub demo_mode: bool,

    pub ledger: LedgerConfig,

    pub friends: FriendsConfig,

    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            session_cookie: None,
            token: None,
            player_id: None,
            event_key: None,
            data_dir: PathBuf::from("./data"),
            enable_tui: true,
            demo_mode: false,
            ledger: LedgerConfig::default(),
            friends: FriendsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub server_url: Option<String>,
    pub player_id: Option<u64>,
    pub event_key: Option<String>,
    pub data_dir: Option<String>,

    /// Optional [ledger] section
    pub ledger: Option<FileLedger>,

    /// Optional [friends] section
    pub friends: Option<FileFriends>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

fn truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

impl Config {
    /// Get the config file path: ~/.config/twbf/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("twbf").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        // Config is optional, a failed write only loses the template
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// A file that exists but does not parse is an error: silently falling
    /// back to defaults would send currency with the wrong settings.
    fn load_file_config() -> Result<FileConfig> {
        let Some(path) = Self::config_path() else {
            return Ok(FileConfig::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => {
                Err(e).with_context(|| format!("Cannot read config file {}", path.display()))
            }
        }
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> Result<Self> {
        let file = Self::load_file_config()?;
        Ok(Self::resolve(file, |key| std::env::var(key).ok()))
    }

    /// Merge a parsed file with an environment lookup
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let server_url = env("TWBF_SERVER")
            .or(file.server_url)
            .unwrap_or(defaults.server_url);

        // Credentials never live in the config file
        let session_cookie = env("TWBF_SESSION");
        let token = env("TWBF_TOKEN");

        let player_id = env("TWBF_PLAYER_ID")
            .and_then(|v| v.parse().ok())
            .or(file.player_id);

        let event_key = env("TWBF_EVENT").or(file.event_key);

        let data_dir = env("TWBF_DATA_DIR")
            .or(file.data_dir)
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        // Runtime flags: env only
        let enable_tui = env("TWBF_NO_TUI").map(|v| !truthy(&v)).unwrap_or(true);
        let demo_mode = env("TWBF_DEMO").map(|v| truthy(&v)).unwrap_or(false);

        Self {
            server_url,
            session_cookie,
            token,
            player_id,
            event_key,
            data_dir,
            enable_tui,
            demo_mode,
            ledger: LedgerConfig::from_file(file.ledger),
            friends: FriendsConfig::from_file(file.friends),
            logging: LoggingConfig::from_file(file.logging),
        }
    }
}
