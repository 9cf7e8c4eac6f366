//! DTOs used by the results REST routes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::ValidationError;

use crate::dao::models::NewResult;

use super::validation::{is_blank, missing_game_type, validate_game_type, validate_timestamp};

/// Body of `POST /api/results`: a `gameType` plus any outcome fields (`winner`, `action`,
/// per-game details). `timestamp` is optional; `id` is always assigned by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ResultSubmission(pub Value);

impl TryFrom<ResultSubmission> for NewResult {
    type Error = ValidationError;

    fn try_from(submission: ResultSubmission) -> Result<Self, Self::Error> {
        let fields = match submission.0 {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };

        let game_type = match fields.get("gameType") {
            Some(raw) if !is_blank(Some(raw)) => validate_game_type(raw)?,
            _ => return Err(missing_game_type()),
        };
        let timestamp = validate_timestamp(fields.get("timestamp"))?;

        Ok(NewResult::new(game_type, timestamp, fields))
    }
}

/// Acknowledgement returned by `DELETE /api/results/{id}`, whether or not a result matched.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResultResponse {
    pub success: bool,
    /// Identifier that was requested for deletion.
    pub deleted: String,
}

impl DeleteResultResponse {
    pub fn new(id: String) -> Self {
        Self {
            success: true,
            deleted: id,
        }
    }
}
