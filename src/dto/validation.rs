//! Validation helpers for DTOs.
//!
//! Request bodies are deserialized loosely (`serde_json::Value` per field) so that every
//! malformed input maps to one of the fixed client-facing messages below instead of a
//! serde error string.

use serde_json::Value;
use time::OffsetDateTime;
use validator::ValidationError;

use crate::dao::models::{GameType, MAX_SCORE, PlayerSlot, now_utc, parse_timestamp};

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Error returned when one of the mandatory scoreboard update fields is absent.
pub fn missing_fields() -> ValidationError {
    invalid("missing_fields", "Missing required fields")
}

/// Error returned when a result is submitted without a game type.
pub fn missing_game_type() -> ValidationError {
    invalid("game_type_required", "Game type is required")
}

/// Whether a field counts as "not provided": absent, `null`, `false`, `0` or `""`.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}

/// Validates that a game type names one of the supported games.
///
/// ```ignore
/// validate_game_type(&json!("darts"))   // Ok(GameType::Darts)
/// validate_game_type(&json!("chess"))   // Err - unknown game
/// validate_game_type(&json!(3))         // Err - not a string
/// ```
pub fn validate_game_type(value: &Value) -> Result<GameType, ValidationError> {
    value
        .as_str()
        .and_then(|raw| raw.parse::<GameType>().ok())
        .ok_or_else(|| invalid("game_type", "Invalid game type"))
}

/// Validates that a player number is exactly 1 or 2 (`1.0` is accepted, `"1"` is not).
pub fn validate_player(value: &Value) -> Result<PlayerSlot, ValidationError> {
    whole_number(value)
        .and_then(PlayerSlot::from_number)
        .ok_or_else(|| invalid("player", "Invalid player number"))
}

/// Validates that a score is a non-negative whole number no larger than [`MAX_SCORE`].
pub fn validate_score(value: &Value) -> Result<u64, ValidationError> {
    whole_number(value)
        .filter(|score| *score <= MAX_SCORE)
        .ok_or_else(|| invalid("score", "Invalid score"))
}

/// Resolve the timestamp of a submitted result.
///
/// Absent, `null` or empty means "now"; anything else must be an RFC 3339 string.
pub fn validate_timestamp(value: Option<&Value>) -> Result<OffsetDateTime, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(now_utc()),
        Some(Value::String(raw)) if raw.is_empty() => Ok(now_utc()),
        Some(Value::String(raw)) => {
            parse_timestamp(raw).map_err(|_| invalid("timestamp", "Invalid timestamp"))
        }
        Some(_) => Err(invalid("timestamp", "Invalid timestamp")),
    }
}

fn whole_number(value: &Value) -> Option<u64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(int) = number.as_u64() {
        return Some(int);
    }
    let float = number.as_f64()?;
    (float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64).then_some(float as u64)
}
