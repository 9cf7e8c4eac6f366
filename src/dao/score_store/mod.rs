#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod file;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::sync::Arc;

use crate::config::StorageBackend;
use crate::dao::models::{GameResult, GameType, NewResult, PlayerSlot, Scoreboard};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for the scoreboard and the results history.
///
/// Implementations are selected once at startup and shared behind an `Arc<dyn ScoreStore>`.
/// No in-process locking is performed: concurrent writers race and the last write wins.
pub trait ScoreStore: Send + Sync {
    /// Current scoreboard, materialising the all-zero default when none is stored yet.
    fn get_scoreboard(&self) -> BoxFuture<'static, StorageResult<Scoreboard>>;
    /// Set a single cell and return the full updated scoreboard.
    fn set_score(
        &self,
        game_type: GameType,
        slot: PlayerSlot,
        score: u64,
    ) -> BoxFuture<'static, StorageResult<Scoreboard>>;
    /// Zero every score, clear the results history and return the fresh scoreboard.
    fn reset(&self) -> BoxFuture<'static, StorageResult<Scoreboard>>;
    /// Up to `limit` results, newest first.
    fn list_results(&self, limit: usize) -> BoxFuture<'static, StorageResult<Vec<GameResult>>>;
    /// Persist a result, evicting the oldest entries beyond the cap.
    fn add_result(&self, result: NewResult) -> BoxFuture<'static, StorageResult<GameResult>>;
    /// Remove a result; unknown identifiers are not an error.
    fn delete_result(&self, id: String) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Release backend resources before the process exits.
    fn close(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Open the backend selected at startup.
pub async fn open(backend: &StorageBackend) -> StorageResult<Arc<dyn ScoreStore>> {
    match backend {
        StorageBackend::File { data_dir } => {
            Ok(Arc::new(file::FileScoreStore::new(data_dir.clone())))
        }
        #[cfg(feature = "mongo-store")]
        StorageBackend::Mongo => {
            let config = self::mongodb::MongoConfig::from_env().await?;
            let store = self::mongodb::MongoScoreStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongo-store"))]
        StorageBackend::Mongo => Err(crate::dao::storage::StorageError::NotCompiled {
            feature: "mongo-store",
        }),
        #[cfg(feature = "couch-store")]
        StorageBackend::Couch => {
            let config = couchdb::CouchConfig::from_env()?;
            let store = couchdb::CouchScoreStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "couch-store"))]
        StorageBackend::Couch => Err(crate::dao::storage::StorageError::NotCompiled {
            feature: "couch-store",
        }),
    }
}
