use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/api/health` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Human readable status line.
    pub message: String,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Server is running".to_string(),
        }
    }

    /// Create a health response indicating the storage backend cannot be reached.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            message: "Storage backend unavailable".to_string(),
        }
    }
}
