//! Business logic behind the scoreboard routes.

use tracing::{debug, info};

use crate::{
    config::PlayerNames,
    dao::models::Scoreboard,
    dto::scoreboard::{ScoreUpdate, ScoreUpdateRequest, ScoreboardUpdateResponse},
    error::ServiceError,
    state::SharedState,
};

/// Return the persisted scoreboard, materializing the all-zero default on first use.
pub async fn get_scoreboard(state: &SharedState) -> Result<Scoreboard, ServiceError> {
    state
        .store()
        .get_scoreboard()
        .await
        .map_err(ServiceError::storage("Failed to get scoreboard"))
}

/// Validate and apply a single cell update, returning the whole scoreboard.
pub async fn update_score(
    state: &SharedState,
    request: ScoreUpdateRequest,
) -> Result<ScoreboardUpdateResponse, ServiceError> {
    let ScoreUpdate {
        game_type,
        slot,
        score,
    } = ScoreUpdate::try_from(request)?;

    let scoreboard = state
        .store()
        .set_score(game_type, slot, score)
        .await
        .map_err(ServiceError::storage("Failed to update scoreboard"))?;

    debug!(%game_type, player = slot.field(), score, "score updated");
    Ok(scoreboard.into())
}

/// Zero every game and drop all recorded results.
pub async fn reset(state: &SharedState) -> Result<ScoreboardUpdateResponse, ServiceError> {
    let scoreboard = state
        .store()
        .reset()
        .await
        .map_err(ServiceError::storage("Failed to reset scoreboard"))?;

    info!("scoreboard reset");
    Ok(scoreboard.into())
}

pub fn player_names(state: &SharedState) -> PlayerNames {
    state.config().players().clone()
}
