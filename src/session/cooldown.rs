// Cooldown arithmetic
//
// A friend can receive event currency once per cooldown window (23 hours)
// counted from the last activation the server recorded.

use crate::game::Timestamp;

/// Default window between two sends to the same friend
pub const DEFAULT_COOLDOWN_SECS: i64 = 23 * 3600;

/// Seconds until a friend last sent to at `last_sent` can receive again
pub fn remaining(last_sent: Option<Timestamp>, now: Timestamp, cooldown_secs: i64) -> i64 {
    match last_sent {
        Some(last) => (last - (now - cooldown_secs)).max(0),
        None => 0,
    }
}

/// Render remaining seconds the way the friends table shows them: `7h5m`
pub fn format_remaining(secs: i64) -> String {
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    format!("{}h{}m", hours, minutes)
}
