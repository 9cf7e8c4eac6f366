use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Map, Value};
use thiserror::Error;
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use utoipa::ToSchema;

/// Maximum number of results retained by every store, newest first.
pub const RESULTS_CAP: usize = 100;

/// Largest accepted score; every backend must store it losslessly (BSON has no unsigned 64-bit).
pub const MAX_SCORE: u64 = i64::MAX as u64;

/// Two-player games tracked by the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    Darts,
    AmericanPool,
    BritishPool,
    Wordle,
    Contexto,
    BoomBattleBar,
    Bowling,
}

impl GameType {
    /// Every supported game, in scoreboard display order.
    pub const ALL: [GameType; 7] = [
        GameType::Darts,
        GameType::AmericanPool,
        GameType::BritishPool,
        GameType::Wordle,
        GameType::Contexto,
        GameType::BoomBattleBar,
        GameType::Bowling,
    ];

    /// Wire identifier of the game (e.g. `american-pool`).
    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Darts => "darts",
            GameType::AmericanPool => "american-pool",
            GameType::BritishPool => "british-pool",
            GameType::Wordle => "wordle",
            GameType::Contexto => "contexto",
            GameType::BoomBattleBar => "boom-battle-bar",
            GameType::Bowling => "bowling",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string does not name a supported game.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown game type `{0}`")]
pub struct UnknownGameType(pub String);

impl FromStr for GameType {
    type Err = UnknownGameType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        GameType::ALL
            .into_iter()
            .find(|game| game.as_str() == value)
            .ok_or_else(|| UnknownGameType(value.to_owned()))
    }
}

/// One of the two fixed player positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    /// Map the public player number (1 or 2) to a slot.
    pub fn from_number(number: u64) -> Option<Self> {
        match number {
            1 => Some(PlayerSlot::One),
            2 => Some(PlayerSlot::Two),
            _ => None,
        }
    }

    /// Field name used for this slot in persisted documents.
    pub fn field(self) -> &'static str {
        match self {
            PlayerSlot::One => "player1",
            PlayerSlot::Two => "player2",
        }
    }
}

/// Scores of both players for a single game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlayerScores {
    #[serde(default)]
    pub player1: u64,
    #[serde(default)]
    pub player2: u64,
}

impl PlayerScores {
    pub fn set(&mut self, slot: PlayerSlot, score: u64) {
        match slot {
            PlayerSlot::One => self.player1 = score,
            PlayerSlot::Two => self.player2 = score,
        }
    }
}

/// Current scores keyed by game, serialized as a plain JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scoreboard(IndexMap<GameType, PlayerScores>);

impl Default for Scoreboard {
    /// All supported games with both scores at zero.
    fn default() -> Self {
        Self(
            GameType::ALL
                .into_iter()
                .map(|game| (game, PlayerScores::default()))
                .collect(),
        )
    }
}

impl Scoreboard {
    /// Scoreboard holding exactly the given entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (GameType, PlayerScores)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, game_type: GameType) -> Option<&PlayerScores> {
        self.0.get(&game_type)
    }

    /// Set one cell, creating the game entry with zeroed scores when absent.
    pub fn set_score(&mut self, game_type: GameType, slot: PlayerSlot, score: u64) {
        self.0.entry(game_type).or_default().set(slot, score);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GameType, &PlayerScores)> {
        self.0.iter()
    }
}

/// Recorded outcome of a single completed game.
///
/// Caller-supplied outcome data (winner, action, discipline specific values) is kept
/// verbatim in `fields` and flattened next to the server-owned keys on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub game_type: GameType,
    #[serde(with = "iso_timestamp")]
    pub timestamp: OffsetDateTime,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Result accepted by the API but not yet persisted (no identifier yet).
#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    pub game_type: GameType,
    pub timestamp: OffsetDateTime,
    pub fields: Map<String, Value>,
}

/// Keys owned by the server that never end up in the free-form outcome fields.
pub const RESERVED_RESULT_KEYS: [&str; 3] = ["id", "gameType", "timestamp"];

/// Whether an outcome field is dropped on submission: the reserved keys above plus every
/// `_`-prefixed key (`_id`, `_rev`, `_deleted`).
pub fn is_reserved_result_key(key: &str) -> bool {
    key.starts_with('_') || RESERVED_RESULT_KEYS.contains(&key)
}

impl NewResult {
    /// Build a new result, dropping reserved keys from the outcome fields.
    pub fn new(game_type: GameType, timestamp: OffsetDateTime, mut fields: Map<String, Value>) -> Self {
        fields.retain(|key, _| !is_reserved_result_key(key));
        Self {
            game_type,
            timestamp: truncate_to_millis(timestamp),
            fields,
        }
    }

    /// Attach the store-assigned identifier.
    pub fn with_id(self, id: impl Into<String>) -> GameResult {
        GameResult {
            id: id.into(),
            game_type: self.game_type,
            timestamp: self.timestamp,
            fields: self.fields,
        }
    }
}

/// Current UTC time at millisecond precision.
pub fn now_utc() -> OffsetDateTime {
    truncate_to_millis(OffsetDateTime::now_utc())
}

/// Normalize to UTC and drop sub-millisecond precision.
pub fn truncate_to_millis(value: OffsetDateTime) -> OffsetDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    let millis = utc.millisecond();
    utc.replace_millisecond(millis).unwrap_or(utc)
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(value: OffsetDateTime) -> String {
    let utc = value.to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        utc.year(),
        u8::from(utc.month()),
        utc.day(),
        utc.hour(),
        utc.minute(),
        utc.second(),
        utc.millisecond()
    )
}

/// Parse an RFC 3339 timestamp and normalize it to UTC milliseconds.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(value, &Rfc3339).map(truncate_to_millis)
}

mod iso_timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(de::Error::custom)
    }
}

// Older result files used numeric millisecond identifiers.
fn id_from_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(de::Error::custom(format!("invalid result id: {other}"))),
    }
}
