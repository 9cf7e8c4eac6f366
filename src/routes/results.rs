use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};

use crate::{
    dao::models::GameResult,
    dto::{
        ApiJson,
        results::{DeleteResultResponse, ResultSubmission},
    },
    error::AppError,
    services::results_service,
    state::SharedState,
};

/// Results routes mounted under `/api/results`.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/api/results", get(list_results).post(add_result))
        .route("/api/results/latest", get(latest_result))
        .route("/api/results/{id}", delete(delete_result))
}

/// Most recent results, newest first (at most 100).
#[utoipa::path(
    get,
    path = "/api/results",
    tag = "results",
    responses(
        (status = 200, description = "Recorded results", body = [serde_json::Value]),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_results(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameResult>>, AppError> {
    Ok(Json(results_service::list_results(&state).await?))
}

/// The newest result, or `null` when none exist.
#[utoipa::path(
    get,
    path = "/api/results/latest",
    tag = "results",
    responses(
        (status = 200, description = "Latest result or null", body = serde_json::Value),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn latest_result(
    State(state): State<SharedState>,
) -> Result<Json<Option<GameResult>>, AppError> {
    Ok(Json(results_service::latest_result(&state).await?))
}

/// Record a completed game. Extra fields are stored as given.
#[utoipa::path(
    post,
    path = "/api/results",
    tag = "results",
    request_body(
        content = serde_json::Value,
        description = "`gameType` plus free-form outcome fields (`winner`, `action`, ...)"
    ),
    responses(
        (status = 200, description = "Created result with its identifier and timestamp", body = serde_json::Value),
        (status = 400, description = "Missing or invalid game type, or invalid timestamp"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn add_result(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<ResultSubmission>,
) -> Result<Json<GameResult>, AppError> {
    Ok(Json(results_service::add_result(&state, payload).await?))
}

/// Delete a result; unknown identifiers are acknowledged as well.
#[utoipa::path(
    delete,
    path = "/api/results/{id}",
    tag = "results",
    params(("id" = String, Path, description = "Identifier of the result to delete")),
    responses(
        (status = 200, description = "Deletion acknowledged", body = DeleteResultResponse),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn delete_result(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResultResponse>, AppError> {
    Ok(Json(results_service::delete_result(&state, id).await?))
}
