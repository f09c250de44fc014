//! HTTP client for the game's remote calls
//!
//! The game's web client talks to `game.php` with two flavours of call:
//! `window=<w>&action=<a>` for state-changing calls and `window=<w>&mode=<m>`
//! for read-only ones. Both are form-encoded POSTs authenticated by the
//! session cookie and the per-session `h` token, and both answer with a JSON
//! envelope (see [`super::models::Envelope`]).

use super::models::{ActivationResult, Envelope, FriendsSearch, LogPage, PlayerId, Timestamp};
use super::{GameApi, GameError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// How a call is addressed on `game.php`
#[derive(Debug, Clone, Copy)]
enum CallKind {
    Action,
    Mode,
}

impl CallKind {
    fn param(self) -> &'static str {
        match self {
            CallKind::Action => "action",
            CallKind::Mode => "mode",
        }
    }
}

/// Responses that carry the common envelope
trait Enveloped: DeserializeOwned {
    fn envelope(&self) -> &Envelope;
}

impl Enveloped for FriendsSearch {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

impl Enveloped for ActivationResult {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

impl Enveloped for LogPage {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

/// Decode a response body, turning `error: true` into [`GameError::Server`]
fn decode_response<T: Enveloped>(body: &str) -> Result<T, GameError> {
    let response: T = serde_json::from_str(body).map_err(|e| GameError::Decode(e.to_string()))?;
    let envelope = response.envelope();
    if envelope.error {
        return Err(GameError::server(envelope.msg.clone()));
    }
    Ok(response)
}

/// Connection settings for [`HttpGameClient`]
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// World base URL, e.g. `https://en1.the-west.net`
    pub server_url: String,
    /// Value of the session cookie header (`sid=...`)
    pub session_cookie: Option<String>,
    /// Per-session `h` token appended to every call
    pub token: Option<String>,
    /// Event key to use; the game exposes it only to the page script
    pub event_key: Option<String>,
    pub timeout: Duration,
}

/// `reqwest`-backed [`GameApi`]
pub struct HttpGameClient {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl HttpGameClient {
    pub fn new(settings: ClientSettings) -> Result<Self, GameError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &settings.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| GameError::Decode(format!("invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }
        headers.insert(
            "X-Requested-With",
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { client, settings })
    }

    fn endpoint(&self, window: &str, kind: CallKind, name: &str) -> Result<Url, GameError> {
        let base = format!("{}/game.php", self.settings.server_url.trim_end_matches('/'));
        let mut url = Url::parse(&base)
            .map_err(|e| GameError::Decode(format!("invalid server URL {}: {}", base, e)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("window", window);
            query.append_pair(kind.param(), name);
            if let Some(token) = &self.settings.token {
                query.append_pair("h", token);
            }
        }
        Ok(url)
    }

    async fn call<T: Enveloped>(
        &self,
        window: &str,
        kind: CallKind,
        name: &str,
        params: &[(&str, String)],
    ) -> Result<T, GameError> {
        let url = self.endpoint(window, kind, name)?;
        tracing::debug!("POST {}/{} {:?}", window, name, params);

        let response = self
            .client
            .post(url)
            .form(params)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        decode_response(&body).inspect_err(|e| {
            if matches!(e, GameError::Decode(_)) {
                tracing::debug!("Undecodable {}/{} response: {}", window, name, body);
            }
        })
    }
}

#[async_trait]
impl GameApi for HttpGameClient {
    async fn active_event_keys(&self) -> Result<Vec<String>, GameError> {
        Ok(self.settings.event_key.iter().cloned().collect())
    }

    async fn search_friends(&self) -> Result<FriendsSearch, GameError> {
        self.call(
            "friendsbar",
            CallKind::Mode,
            "search",
            &[("search_type", "friends".to_string())],
        )
        .await
    }

    async fn activate_event(
        &self,
        friend_id: PlayerId,
        event_key: &str,
    ) -> Result<(Timestamp, String), GameError> {
        let result: ActivationResult = self
            .call(
                "friendsbar",
                CallKind::Action,
                "event",
                &[
                    ("player_id", friend_id.to_string()),
                    ("event", event_key.to_string()),
                ],
            )
            .await?;
        let activation_time = result
            .activation_time
            .ok_or_else(|| GameError::Decode("missing activationTime".to_string()))?;
        Ok((activation_time, result.envelope.msg.unwrap_or_default()))
    }

    async fn fetch_log_page(
        &self,
        event_key: &str,
        page: u32,
        limit: u32,
    ) -> Result<LogPage, GameError> {
        self.call(
            "ses",
            CallKind::Mode,
            "log",
            &[
                ("ses_id", event_key.to_string()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}
