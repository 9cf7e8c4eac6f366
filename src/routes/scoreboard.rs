use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    config::PlayerNames,
    dao::models::{PlayerScores, Scoreboard},
    dto::{
        ApiJson,
        scoreboard::{ScoreUpdateRequest, ScoreboardUpdateResponse},
    },
    error::AppError,
    services::scoreboard_service,
    state::SharedState,
};

/// Scoreboard routes mounted under `/api/scoreboard`.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/api/scoreboard", get(get_scoreboard))
        .route("/api/scoreboard/update", post(update_score))
        .route("/api/scoreboard/reset", post(reset_scoreboard))
        .route("/api/scoreboard/players", get(player_names))
}

/// Current scores of both players for every game.
#[utoipa::path(
    get,
    path = "/api/scoreboard",
    tag = "scoreboard",
    responses(
        (status = 200, description = "Current scoreboard", body = HashMap<String, PlayerScores>),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn get_scoreboard(State(state): State<SharedState>) -> Result<Json<Scoreboard>, AppError> {
    Ok(Json(scoreboard_service::get_scoreboard(&state).await?))
}

/// Set one player's score for one game.
#[utoipa::path(
    post,
    path = "/api/scoreboard/update",
    tag = "scoreboard",
    request_body = ScoreUpdateRequest,
    responses(
        (status = 200, description = "Score updated", body = ScoreboardUpdateResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn update_score(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<ScoreUpdateRequest>,
) -> Result<Json<ScoreboardUpdateResponse>, AppError> {
    Ok(Json(scoreboard_service::update_score(&state, payload).await?))
}

/// Zero every score and clear the results history.
#[utoipa::path(
    post,
    path = "/api/scoreboard/reset",
    tag = "scoreboard",
    responses(
        (status = 200, description = "Scoreboard reset", body = ScoreboardUpdateResponse),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn reset_scoreboard(
    State(state): State<SharedState>,
) -> Result<Json<ScoreboardUpdateResponse>, AppError> {
    Ok(Json(scoreboard_service::reset(&state).await?))
}

/// Display names of the two player slots.
#[utoipa::path(
    get,
    path = "/api/scoreboard/players",
    tag = "scoreboard",
    responses((status = 200, description = "Player names", body = PlayerNames))
)]
pub async fn player_names(State(state): State<SharedState>) -> Json<PlayerNames> {
    Json(scoreboard_service::player_names(&state))
}
