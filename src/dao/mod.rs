/// Persisted shapes shared by every backend.
pub mod models;
/// Scoreboard and results persistence backends.
pub mod score_store;
/// Backend-agnostic storage errors.
pub mod storage;
