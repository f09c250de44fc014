//! Friend roster and last-sent bookkeeping

use super::cooldown;
use crate::game::{Friend, FriendsSearch, PlayerId, Timestamp};
use std::collections::{BTreeMap, HashMap};

/// Friends of the logged-in player and when each last received currency
#[derive(Debug, Clone, Default)]
pub struct FriendRoster {
    friends: BTreeMap<PlayerId, Friend>,
    last_sent: HashMap<PlayerId, Timestamp>,
}

impl FriendRoster {
    /// Merge a friend search result for `event_key`, skipping our own entry
    pub fn merge_search(
        &mut self,
        search: FriendsSearch,
        event_key: &str,
        own_id: Option<PlayerId>,
    ) {
        for friend in search.players {
            if Some(friend.player_id) == own_id {
                continue;
            }
            self.friends.insert(friend.player_id, friend);
        }
        for activation in search.event_activations {
            if activation.event_name == event_key {
                self.last_sent
                    .insert(activation.friend_id, activation.activation_time);
            }
        }
    }

    pub fn add(&mut self, friend: Friend) {
        self.friends.insert(friend.player_id, friend);
    }

    pub fn remove(&mut self, id: PlayerId) -> Option<Friend> {
        self.friends.remove(&id)
    }

    pub fn record_sent(&mut self, id: PlayerId, at: Timestamp) {
        self.last_sent.insert(id, at);
    }

    pub fn get(&self, id: PlayerId) -> Option<&Friend> {
        self.friends.get(&id)
    }

    pub fn last_sent(&self, id: PlayerId) -> Option<Timestamp> {
        self.last_sent.get(&id).copied()
    }

    /// Seconds until `id` can receive again; 0 when ready
    pub fn time_until_ready(&self, id: PlayerId, now: Timestamp, cooldown_secs: i64) -> i64 {
        cooldown::remaining(self.last_sent(id), now, cooldown_secs)
    }

    /// Number of friends that can receive right now
    pub fn ready_count(&self, now: Timestamp, cooldown_secs: i64) -> usize {
        self.friends
            .keys()
            .filter(|id| self.time_until_ready(**id, now, cooldown_secs) == 0)
            .count()
    }

    pub fn friend_count(&self) -> usize {
        self.friends.len()
    }

    /// Friends ordered by remaining cooldown, ready ones first
    pub fn by_readiness(&self, now: Timestamp, cooldown_secs: i64) -> Vec<(Friend, i64)> {
        let mut rows: Vec<_> = self
            .friends
            .values()
            .map(|f| {
                (
                    f.clone(),
                    self.time_until_ready(f.player_id, now, cooldown_secs),
                )
            })
            .collect();
        // Stable sort keeps id order among equals
        rows.sort_by_key(|(_, remaining)| *remaining);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testing::friend;
    use crate::game::{Envelope, EventActivation};

    const NOW: Timestamp = 1_700_000_000;
    const DAY: i64 = 23 * 3600;

    fn activation(event: &str, friend_id: PlayerId, at: Timestamp) -> EventActivation {
        EventActivation {
            event_name: event.to_string(),
            friend_id,
            activation_time: at,
        }
    }

    fn roster() -> FriendRoster {
        let mut roster = FriendRoster::default();
        roster.merge_search(
            FriendsSearch {
                envelope: Envelope::default(),
                players: vec![friend(1, "me"), friend(2, "Ann"), friend(3, "Bob"), friend(4, "Cy")],
                event_activations: vec![
                    activation("Hearts", 2, NOW - 3600),
                    activation("Easter", 3, NOW - 60),
                    activation("Hearts", 4, NOW - 7200),
                ],
            },
            "Hearts",
            Some(1),
        );
        roster
    }

    #[test]
    fn test_merge_skips_self_and_other_events() {
        let roster = roster();
        assert_eq!(roster.friend_count(), 3);
        assert!(roster.get(1).is_none());
        assert_eq!(roster.last_sent(3), None);
        assert_eq!(roster.last_sent(2), Some(NOW - 3600));
    }

    #[test]
    fn test_ready_count_and_ordering() {
        let roster = roster();
        assert_eq!(roster.ready_count(NOW, DAY), 1);

        let order: Vec<_> = roster
            .by_readiness(NOW, DAY)
            .into_iter()
            .map(|(f, remaining)| (f.player_id, remaining))
            .collect();
        assert_eq!(order, vec![(3, 0), (4, DAY - 7200), (2, DAY - 3600)]);
    }

    #[test]
    fn test_add_remove_and_record() {
        let mut roster = roster();
        roster.add(friend(9, "New"));
        assert_eq!(roster.friend_count(), 4);
        assert_eq!(roster.ready_count(NOW, DAY), 2);

        roster.record_sent(9, NOW);
        assert_eq!(roster.time_until_ready(9, NOW, DAY), DAY);

        assert_eq!(roster.remove(9).map(|f| f.name), Some("New".to_string()));
        assert_eq!(roster.friend_count(), 3);
    }
}
