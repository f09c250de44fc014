//! Scripted in-memory game used by unit tests

use super::models::{
    Envelope, EventActivation, Friend, FriendsSearch, LogEntry, LogPage, PlayerId, Timestamp,
    FRIEND_DROP,
};
use super::{GameApi, GameError};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::Notify;

/// A [`GameApi`] whose log pages, roster and failures are set up by the test
#[derive(Default)]
pub struct ScriptedGame {
    pub event_keys: Vec<String>,
    pub friends: Vec<Friend>,
    pub activations: Vec<EventActivation>,
    /// Pages served for `page = 1, 2, ...`; missing pages come back empty
    pages: Mutex<Vec<LogPage>>,
    /// Page number that fails with a server error
    fail_page: Mutex<Option<u32>>,
    /// Every `(event, page, limit)` requested, in order
    requests: Mutex<Vec<(String, u32, u32)>>,
    /// When set, the first log fetch parks until `release` is notified
    gated: Mutex<bool>,
    pub entered: Notify,
    pub release: Notify,
    /// Activations are stamped from the wall clock, one second apart
    next_activation: Mutex<Timestamp>,
}

impl ScriptedGame {
    pub fn new() -> Self {
        Self {
            event_keys: vec!["Hearts".to_string()],
            next_activation: Mutex::new(crate::session::now()),
            ..Default::default()
        }
    }

    pub fn with_pages(self, pages: Vec<LogPage>) -> Self {
        *self.pages.lock().unwrap() = pages;
        self
    }

    pub fn set_pages(&self, pages: Vec<LogPage>) {
        *self.pages.lock().unwrap() = pages;
    }

    pub fn fail_on_page(&self, page: Option<u32>) {
        *self.fail_page.lock().unwrap() = page;
    }

    pub fn gate_next_fetch(&self) {
        *self.gated.lock().unwrap() = true;
    }

    pub fn requests(&self) -> Vec<(String, u32, u32)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Build a log page from `(date, kind, value, sender)` tuples
pub fn page(entries: &[(Timestamp, &str, i64, Option<PlayerId>)], has_next: bool) -> LogPage {
    LogPage {
        envelope: Envelope::default(),
        entries: entries
            .iter()
            .map(|(date, kind, value, sender)| LogEntry {
                date: *date,
                kind: kind.to_string(),
                value: *value,
                details: sender
                    .map(|id| format!(r#"{{"player_id":{}}}"#, id))
                    .unwrap_or_default(),
            })
            .collect(),
        has_next,
    }
}

/// Shorthand for a `friendDrop` tuple
pub fn drop_from(
    date: Timestamp,
    value: i64,
    sender: PlayerId,
) -> (Timestamp, &'static str, i64, Option<PlayerId>) {
    (date, FRIEND_DROP, value, Some(sender))
}

pub fn friend(id: PlayerId, name: &str) -> Friend {
    Friend {
        player_id: id,
        name: name.to_string(),
        level: 50,
        char_class: None,
        subclass: None,
        profession_id: None,
        avatar: None,
    }
}

#[async_trait]
impl GameApi for ScriptedGame {
    async fn active_event_keys(&self) -> Result<Vec<String>, GameError> {
        Ok(self.event_keys.clone())
    }

    async fn search_friends(&self) -> Result<FriendsSearch, GameError> {
        Ok(FriendsSearch {
            envelope: Envelope::default(),
            players: self.friends.clone(),
            event_activations: self.activations.clone(),
        })
    }

    async fn activate_event(
        &self,
        _friend_id: PlayerId,
        _event_key: &str,
    ) -> Result<(Timestamp, String), GameError> {
        let mut next = self.next_activation.lock().unwrap();
        *next += 1;
        Ok((*next, "Currency sent.".to_string()))
    }

    async fn fetch_log_page(
        &self,
        event_key: &str,
        page: u32,
        limit: u32,
    ) -> Result<LogPage, GameError> {
        self.requests
            .lock()
            .unwrap()
            .push((event_key.to_string(), page, limit));

        let gated = std::mem::take(&mut *self.gated.lock().unwrap());
        if gated {
            self.entered.notify_one();
            self.release.notified().await;
        }

        if *self.fail_page.lock().unwrap() == Some(page) {
            return Err(GameError::Server("Log temporarily unavailable".to_string()));
        }

        let pages = self.pages.lock().unwrap();
        Ok((page as usize)
            .checked_sub(1)
            .and_then(|i| pages.get(i))
            .cloned()
            .unwrap_or_default())
    }
}
