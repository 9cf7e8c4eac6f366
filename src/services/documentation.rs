use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the scoreboard backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::scoreboard::get_scoreboard,
        crate::routes::scoreboard::update_score,
        crate::routes::scoreboard::reset_scoreboard,
        crate::routes::scoreboard::player_names,
        crate::routes::results::list_results,
        crate::routes::results::latest_result,
        crate::routes::results::add_result,
        crate::routes::results::delete_result,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::scoreboard::ScoreUpdateRequest,
            crate::dto::scoreboard::ScoreboardUpdateResponse,
            crate::dto::results::DeleteResultResponse,
            crate::dao::models::GameType,
            crate::dao::models::PlayerScores,
            crate::config::PlayerNames,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "scoreboard", description = "Per-game scores of both players"),
        (name = "results", description = "History of completed games"),
    )
)]
pub struct ApiDoc;
