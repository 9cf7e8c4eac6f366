/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Recording, listing and deleting game results.
pub mod results_service;
/// Scoreboard reads, updates and reset.
pub mod scoreboard_service;
