//! Business logic behind the results routes.

use tracing::debug;

use crate::{
    dao::models::{GameResult, NewResult, RESULTS_CAP},
    dto::results::{DeleteResultResponse, ResultSubmission},
    error::ServiceError,
    state::SharedState,
};

/// Up to [`RESULTS_CAP`] results, newest first.
pub async fn list_results(state: &SharedState) -> Result<Vec<GameResult>, ServiceError> {
    state
        .store()
        .list_results(RESULTS_CAP)
        .await
        .map_err(ServiceError::storage("Failed to get results"))
}

/// Newest result, or `None` when nothing has been recorded yet.
pub async fn latest_result(state: &SharedState) -> Result<Option<GameResult>, ServiceError> {
    let results = state
        .store()
        .list_results(1)
        .await
        .map_err(ServiceError::storage("Failed to get latest result"))?;
    Ok(results.into_iter().next())
}

pub async fn add_result(
    state: &SharedState,
    submission: ResultSubmission,
) -> Result<GameResult, ServiceError> {
    let result = NewResult::try_from(submission)?;

    let created = state
        .store()
        .add_result(result)
        .await
        .map_err(ServiceError::storage("Failed to add result"))?;

    debug!(id = %created.id, game_type = %created.game_type, "result recorded");
    Ok(created)
}

/// Remove a result by identifier. Unknown identifiers are acknowledged all the same.
pub async fn delete_result(
    state: &SharedState,
    id: String,
) -> Result<DeleteResultResponse, ServiceError> {
    state
        .store()
        .delete_result(id.clone())
        .await
        .map_err(ServiceError::storage("Failed to delete result"))?;

    debug!(%id, "result deleted");
    Ok(DeleteResultResponse::new(id))
}
