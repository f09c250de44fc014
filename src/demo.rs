// Demo mode: an in-memory game to showcase the panel without a server
//
// The demo world has a handful of friends, a pre-seeded activity log from
// the last couple of days and a driver task that keeps "receiving" currency
// from friends while the TUI is open, the same way the game's event bus
// would signal it. A visiting friend joins the roster for a while and leaves
// again.
//
// Run with: TWBF_DEMO=1 cargo run --release

use crate::events::GameEvent;
use crate::game::{
    Envelope, EventActivation, Friend, FriendsSearch, GameApi, GameError, LogEntry, LogPage,
    PlayerId, Timestamp, FRIEND_DROP,
};
use crate::session::now;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;

/// Event the demo world is running
pub const DEMO_EVENT: &str = "Hearts";

const DEMO_FRIENDS: &[(PlayerId, &str, u32)] = &[
    (101, "Calamity Jane", 92),
    (102, "Doc Holliday", 77),
    (103, "Annie Oakley", 150),
    (104, "Wild Bill", 64),
    (105, "Sitting Bull", 120),
    (106, "Belle Starr", 38),
];

/// Friend who joins after a few ticks and leaves later
const VISITOR: (PlayerId, &str, u32) = (107, "Pearl Hart", 45);
const VISITOR_JOINS: u64 = 3;
const VISITOR_LEAVES: u64 = 12;

/// Drop categories other than friend gifts, with their typical value
const OTHER_DROPS: &[(&str, i64)] = &[("questDrop", 10), ("duelDrop", 2), ("jobDrop", 1)];

#[derive(Default)]
struct DemoWorld {
    /// Newest first, like the server returns it
    log: Vec<LogEntry>,
    activations: Vec<EventActivation>,
    visitor_present: bool,
    ticks: u64,
}

/// [`GameApi`] backed by an in-memory world
pub struct DemoGame {
    world: Mutex<DemoWorld>,
}

impl DemoGame {
    pub fn new() -> Self {
        let now = now();
        let mut world = DemoWorld::default();

        // Two days of history, one entry every ~40 minutes
        for i in (1..72).rev() {
            let date = now - i * 2400;
            world.log.insert(0, seeded_entry(i as u64, date));
        }
        // A couple of friends already received currency today
        world.activations.push(activation(102, now - 3 * 3600));
        world.activations.push(activation(105, now - 20 * 3600));
        world.activations.push(EventActivation {
            event_name: "Easter".to_string(),
            friend_id: 103,
            activation_time: now - 600,
        });

        Self {
            world: Mutex::new(world),
        }
    }

    fn world(&self) -> std::sync::MutexGuard<'_, DemoWorld> {
        self.world.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Advance the world by one tick: a new entry lands on top of the log
    /// and the visitor may come or go
    fn tick(&self) -> Vec<GameEvent> {
        let mut world = self.world();
        world.ticks += 1;
        let entry = seeded_entry(world.ticks * 7, now());
        if entry.is_friend_drop() {
            tracing::info!("Demo: a friend sent {} currency", entry.value);
        }
        let mut events = vec![GameEvent::CurrencyReceived {
            amount: entry.value,
        }];
        world.log.insert(0, entry);

        if world.ticks == VISITOR_JOINS {
            world.visitor_present = true;
            events.push(GameEvent::FriendAdded(demo_friend(VISITOR)));
        } else if world.ticks == VISITOR_LEAVES {
            world.visitor_present = false;
            events.push(GameEvent::FriendRemoved {
                player_id: VISITOR.0,
            });
        }
        events
    }
}

impl Default for DemoGame {
    fn default() -> Self {
        Self::new()
    }
}

fn demo_friend((player_id, name, level): (PlayerId, &str, u32)) -> Friend {
    Friend {
        player_id,
        name: name.to_string(),
        level,
        char_class: Some("adventurer".to_string()),
        subclass: None,
        profession_id: None,
        avatar: None,
    }
}

fn activation(friend_id: PlayerId, at: Timestamp) -> EventActivation {
    EventActivation {
        event_name: DEMO_EVENT.to_string(),
        friend_id,
        activation_time: at,
    }
}

/// Deterministic pseudo-random entry: mostly friend drops, some others
fn seeded_entry(seed: u64, date: Timestamp) -> LogEntry {
    if seed % 3 == 0 {
        let (kind, value) = OTHER_DROPS[(seed as usize / 3) % OTHER_DROPS.len()];
        LogEntry {
            date,
            kind: kind.to_string(),
            value,
            details: String::new(),
        }
    } else {
        let (id, _, _) = DEMO_FRIENDS[seed as usize % DEMO_FRIENDS.len()];
        LogEntry {
            date,
            kind: FRIEND_DROP.to_string(),
            value: 5,
            details: format!(r#"{{"player_id":{}}}"#, id),
        }
    }
}

#[async_trait]
impl GameApi for DemoGame {
    async fn active_event_keys(&self) -> Result<Vec<String>, GameError> {
        Ok(vec![DEMO_EVENT.to_string()])
    }

    async fn search_friends(&self) -> Result<FriendsSearch, GameError> {
        sleep(Duration::from_millis(150)).await;
        let world = self.world();
        let mut players: Vec<Friend> = DEMO_FRIENDS.iter().copied().map(demo_friend).collect();
        if world.visitor_present {
            players.push(demo_friend(VISITOR));
        }
        Ok(FriendsSearch {
            envelope: Envelope::default(),
            players,
            event_activations: world.activations.clone(),
        })
    }

    async fn activate_event(
        &self,
        friend_id: PlayerId,
        event_key: &str,
    ) -> Result<(Timestamp, String), GameError> {
        sleep(Duration::from_millis(200)).await;
        let now = now();
        let mut world = self.world();
        let last = world
            .activations
            .iter()
            .filter(|a| a.friend_id == friend_id && a.event_name == event_key)
            .map(|a| a.activation_time)
            .max();
        if last.is_some_and(|t| now - t < 23 * 3600) {
            return Err(GameError::Server(
                "You have already sent this friend currency today.".to_string(),
            ));
        }
        world.activations.push(EventActivation {
            event_name: event_key.to_string(),
            friend_id,
            activation_time: now,
        });
        Ok((now, "Currency sent!".to_string()))
    }

    async fn fetch_log_page(
        &self,
        _event_key: &str,
        page: u32,
        limit: u32,
    ) -> Result<LogPage, GameError> {
        sleep(Duration::from_millis(100)).await;
        let world = self.world();
        let start = (page.saturating_sub(1) * limit) as usize;
        let end = (start + limit as usize).min(world.log.len());
        let entries = world.log.get(start..end).unwrap_or_default().to_vec();
        Ok(LogPage {
            envelope: Envelope::default(),
            entries,
            has_next: end < world.log.len(),
        })
    }
}

/// Keep the demo world alive: every few seconds some currency arrives
pub async fn run_demo(
    game: Arc<DemoGame>,
    tx: mpsc::Sender<GameEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                tracing::info!("Demo received shutdown signal");
                return;
            }
            _ = sleep(Duration::from_secs(8)) => {
                for event in game.tick() {
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_log_pages_cover_history() {
        let game = DemoGame::new();

        let first = game.fetch_log_page(DEMO_EVENT, 1, 50).await.unwrap();
        let second = game.fetch_log_page(DEMO_EVENT, 2, 50).await.unwrap();

        assert_eq!(first.entries.len(), 50);
        assert!(first.has_next);
        assert_eq!(second.entries.len(), 21);
        assert!(!second.has_next);
        assert!(first.entries[0].date > first.entries[49].date);
    }

    #[tokio::test]
    async fn test_visitor_comes_and_goes() {
        let game = DemoGame::new();
        let visitor_listed = |search: FriendsSearch| {
            search.players.iter().any(|f| f.player_id == VISITOR.0)
        };

        for _ in 1..VISITOR_JOINS {
            assert_eq!(game.tick().len(), 1);
        }
        assert!(!visitor_listed(game.search_friends().await.unwrap()));

        let events = game.tick();
        assert!(matches!(&events[1], GameEvent::FriendAdded(f) if f.player_id == VISITOR.0));
        assert!(visitor_listed(game.search_friends().await.unwrap()));

        for _ in VISITOR_JOINS + 1..VISITOR_LEAVES {
            game.tick();
        }
        assert_eq!(
            game.tick()[1],
            GameEvent::FriendRemoved {
                player_id: VISITOR.0
            }
        );
        assert!(!visitor_listed(game.search_friends().await.unwrap()));

        // Every tick added one entry on top of the 71 seeded ones
        let page = game.fetch_log_page(DEMO_EVENT, 1, 200).await.unwrap();
        assert_eq!(page.entries.len(), 71 + VISITOR_LEAVES as usize);
    }

    #[tokio::test]
    async fn test_demo_enforces_cooldown() {
        let game = DemoGame::new();
        assert!(game.activate_event(101, DEMO_EVENT).await.is_ok());
        assert!(matches!(
            game.activate_event(101, DEMO_EVENT).await,
            Err(GameError::Server(_))
        ));
        // 103 was only activated for another event
        assert!(game.activate_event(103, DEMO_EVENT).await.is_ok());
    }
}
