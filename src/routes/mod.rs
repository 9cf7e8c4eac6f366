use axum::{
    Router,
    http::{HeaderValue, Method, header, request::Parts},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::AppConfig, state::SharedState};

pub mod docs;
pub mod health;
pub mod results;
pub mod scoreboard;

/// Compose all route trees, wiring in shared state, documentation routes and the
/// cross-cutting middleware layers.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(scoreboard::router())
        .merge(results::router());

    let docs_router = docs::router(state.clone());
    let cors = cors_layer(state.config());

    api_router
        .merge(docs_router)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS restricted to the configured origin allow-list. Requests from other origins get
/// no `Access-Control-Allow-Origin` header and are blocked by the browser.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let config = config.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| config.is_origin_allowed(origin))
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
