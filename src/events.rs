// Notifications the game pushes while the tool is running
//
// In the game's web client these arrive on the page's event bus as small
// JSON objects. Here they come from whatever feeds the panel's channel (the
// demo driver) and are applied to the session in arrival order.

use crate::game::{Friend, PlayerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A new friend appeared in the roster
    FriendAdded(Friend),

    /// A friend was removed
    FriendRemoved { player_id: PlayerId },

    /// The event currency counter went up; the log has something new
    CurrencyReceived { amount: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_payloads() {
        let event: GameEvent =
            serde_json::from_str(r#"{"type":"currency_received","amount":5}"#).unwrap();
        assert_eq!(event, GameEvent::CurrencyReceived { amount: 5 });

        let event: GameEvent =
            serde_json::from_str(r#"{"type":"friend_removed","player_id":12}"#).unwrap();
        assert_eq!(event, GameEvent::FriendRemoved { player_id: 12 });

        let json = r#"{"type":"friend_added","player_id":3,"name":"Bob","level":20}"#;
        match serde_json::from_str::<GameEvent>(json).unwrap() {
            GameEvent::FriendAdded(friend) => assert_eq!(friend.name, "Bob"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
