use axum::extract::FromRequest;

use crate::error::AppError;

pub mod health;
pub mod results;
pub mod scoreboard;
pub mod validation;

/// JSON body extractor whose rejections are rendered as `400 {"error": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
