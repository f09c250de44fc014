//! Wire models for the game's RPC responses
//!
//! The game answers every remote call with a JSON envelope carrying an
//! `error` flag and a human-readable `msg`. Numeric fields are not always
//! numbers on the wire (log values in particular arrive as strings on some
//! worlds), so the helpers at the bottom accept both.

use serde::{Deserialize, Deserializer, Serialize};

/// Game-wide player identifier
pub type PlayerId = u64;

/// Unix timestamp in seconds, as the game reports it
pub type Timestamp = i64;

/// Log category for currency a friend sent us
pub const FRIEND_DROP: &str = "friendDrop";

/// Common envelope fields present on every response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub msg: Option<String>,
}

/// A friend as kept in the roster
///
/// Experience and map coordinates from the search result are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    #[serde(deserialize_with = "lenient_u64")]
    pub player_id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default, rename = "class")]
    pub char_class: Option<String>,
    #[serde(default)]
    pub subclass: Option<String>,
    #[serde(default)]
    pub profession_id: Option<u32>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// One "last sent" record from the friend search
#[derive(Debug, Clone, Deserialize)]
pub struct EventActivation {
    pub event_name: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub friend_id: PlayerId,
    #[serde(deserialize_with = "lenient_i64")]
    pub activation_time: Timestamp,
}

/// Response of `friendsbar/search`
#[derive(Debug, Clone, Deserialize)]
pub struct FriendsSearch {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub players: Vec<Friend>,
    #[serde(default, rename = "eventActivations")]
    pub event_activations: Vec<EventActivation>,
}

/// Response of `friendsbar/event`
#[derive(Debug, Clone, Deserialize)]
pub struct ActivationResult {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default, rename = "activationTime", deserialize_with = "lenient_opt_i64")]
    pub activation_time: Option<Timestamp>,
}

/// A single entry of the event activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(deserialize_with = "lenient_i64")]
    pub date: Timestamp,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub value: i64,
    /// Opaque JSON payload; for `friendDrop` it names the sender
    #[serde(default)]
    pub details: String,
}

impl LogEntry {
    pub fn is_friend_drop(&self) -> bool {
        self.kind == FRIEND_DROP
    }

    /// Sender of a `friendDrop` entry, parsed from the details payload
    pub fn sender(&self) -> Result<PlayerId, serde_json::Error> {
        #[derive(Deserialize)]
        struct Details {
            #[serde(deserialize_with = "lenient_u64")]
            player_id: PlayerId,
        }
        serde_json::from_str::<Details>(&self.details).map(|d| d.player_id)
    }
}

/// One page of the activity log, newest entry first
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogPage {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub entries: Vec<LogEntry>,
    #[serde(default, rename = "hasNext")]
    pub has_next: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Lenient number parsing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Str(String),
}

impl NumberOrString {
    fn into_i64<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            NumberOrString::Int(n) => Ok(n),
            NumberOrString::Float(f) => Ok(f as i64),
            NumberOrString::Str(s) => s
                .trim()
                .parse::<i64>()
                .or_else(|_| s.trim().parse::<f64>().map(|f| f as i64))
                .map_err(|_| E::custom(format!("expected a number, got {:?}", s))),
        }
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    NumberOrString::deserialize(d)?.into_i64()
}

fn lenient_opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Option::<NumberOrString>::deserialize(d)?
        .map(NumberOrString::into_i64)
        .transpose()
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let n = NumberOrString::deserialize(d)?.into_i64::<D::Error>()?;
    u64::try_from(n).map_err(|_| serde::de::Error::custom("negative id"))
}
