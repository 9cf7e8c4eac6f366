//! DTOs used by the scoreboard REST routes.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::ValidationError;

use crate::dao::models::{GameType, PlayerScores, PlayerSlot, Scoreboard};

use super::validation::{is_blank, missing_fields, validate_game_type, validate_player, validate_score};

/// Body of `POST /api/scoreboard/update`.
///
/// Fields are kept as raw JSON so that type mismatches surface as the documented
/// validation messages.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdateRequest {
    /// One of the supported game identifiers (e.g. `darts`).
    #[schema(value_type = String, example = "darts")]
    #[serde(default, deserialize_with = "present")]
    pub game_type: Option<Value>,
    /// Player number, 1 or 2.
    #[schema(value_type = u8, example = 1)]
    #[serde(default, deserialize_with = "present")]
    pub player: Option<Value>,
    /// New absolute score for that player.
    #[schema(value_type = u64, example = 5)]
    #[serde(default, deserialize_with = "present")]
    pub score: Option<Value>,
}

// `None` only when the key is absent; an explicit `null` stays `Some(Value::Null)`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// A score update that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub game_type: GameType,
    pub slot: PlayerSlot,
    pub score: u64,
}

impl TryFrom<ScoreUpdateRequest> for ScoreUpdate {
    type Error = ValidationError;

    fn try_from(request: ScoreUpdateRequest) -> Result<Self, Self::Error> {
        let (Some(game_type), Some(player), Some(score)) =
            (request.game_type, request.player, request.score)
        else {
            return Err(missing_fields());
        };
        if is_blank(Some(&game_type)) || is_blank(Some(&player)) {
            return Err(missing_fields());
        }

        Ok(Self {
            game_type: validate_game_type(&game_type)?,
            slot: validate_player(&player)?,
            score: validate_score(&score)?,
        })
    }
}

/// Response of the scoreboard mutations (`update` and `reset`).
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreboardUpdateResponse {
    pub success: bool,
    #[schema(value_type = HashMap<String, PlayerScores>)]
    pub scoreboard: Scoreboard,
}

impl From<Scoreboard> for ScoreboardUpdateResponse {
    fn from(scoreboard: Scoreboard) -> Self {
        Self {
            success: true,
            scoreboard,
        }
    }
}
