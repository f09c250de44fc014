//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the config as a commented TOML file
    ///
    /// Credentials are never written; they are read from the environment.
    pub fn to_toml(&self) -> String {
        let player_id = match self.player_id {
            Some(id) => format!("player_id = {}", id),
            None => "# player_id = 123456".to_string(),
        };
        let event_key = match &self.event_key {
            Some(key) => format!("event_key = \"{}\"", key),
            None => "# event_key = \"Hearts\"".to_string(),
        };

        format!(
            r#"# twbf configuration
#
# Credentials come from the environment only:
#   TWBF_SESSION  session cookie of a logged-in browser, e.g. "sid=..."
#   TWBF_TOKEN    the per-session h token

# World the account plays on
server_url = "{server_url}"

# Your own player id (left out of the friend list)
{player_id}

# Running event key; set it while an event is live
{event_key}

# Where cached log statistics are kept
data_dir = "{data_dir}"

# Event activity log ingestion
[ledger]
page_size = {page_size}
background_delay_ms = {delay}
namespace = "{namespace}"

[friends]
cooldown_hours = {cooldown}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# File logging (in addition to TUI buffer or stderr)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            server_url = self.server_url,
            player_id = player_id,
            event_key = event_key,
            data_dir = self.data_dir.display(),
            page_size = self.ledger.page_size,
            delay = self.ledger.background_delay_ms,
            namespace = self.ledger.namespace,
            cooldown = self.friends.cooldown_hours,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display(),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
