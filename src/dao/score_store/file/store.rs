use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use serde::{Serialize, de::DeserializeOwned};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dao::{
    models::{GameResult, GameType, NewResult, PlayerSlot, RESULTS_CAP, Scoreboard},
    score_store::ScoreStore,
    storage::StorageResult,
};

use super::error::{FileResult, FileStoreError};

const SCOREBOARD_FILE: &str = "scoreboard.json";
const RESULTS_FILE: &str = "results.json";

/// [`ScoreStore`] keeping one pretty-printed JSON document per resource under a data directory.
///
/// Every mutation rewrites the whole document.
#[derive(Clone)]
pub struct FileScoreStore {
    data_dir: Arc<Path>,
}

impl FileScoreStore {
    /// Create a store rooted at `data_dir`; the directory is created on first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir: PathBuf = data_dir.into();
        info!(path = %data_dir.display(), "using file storage");
        Self {
            data_dir: Arc::from(data_dir),
        }
    }

    fn scoreboard_path(&self) -> PathBuf {
        self.data_dir.join(SCOREBOARD_FILE)
    }

    fn results_path(&self) -> PathBuf {
        self.data_dir.join(RESULTS_FILE)
    }

    /// Read a document, writing out and returning `default` when it does not exist yet.
    async fn read_json<T, F>(&self, path: &Path, default: F) -> FileResult<T>
    where
        T: DeserializeOwned + Serialize,
        F: FnOnce() -> T,
    {
        match fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| FileStoreError::Decode {
                path: path.to_path_buf(),
                source,
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "document missing; writing default");
                let value = default();
                self.write_json(path, &value).await?;
                Ok(value)
            }
            Err(source) => Err(FileStoreError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    async fn write_json<T>(&self, path: &Path, value: &T) -> FileResult<()>
    where
        T: ?Sized + Serialize,
    {
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|source| FileStoreError::CreateDir {
                path: self.data_dir.to_path_buf(),
                source,
            })?;

        let bytes = serde_json::to_vec_pretty(value).map_err(|source| FileStoreError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

        fs::write(path, bytes)
            .await
            .map_err(|source| FileStoreError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn load_scoreboard(&self) -> FileResult<Scoreboard> {
        self.read_json(&self.scoreboard_path(), Scoreboard::default)
            .await
    }

    async fn load_results(&self) -> FileResult<Vec<GameResult>> {
        self.read_json(&self.results_path(), Vec::new).await
    }

    async fn set_score(
        &self,
        game_type: GameType,
        slot: PlayerSlot,
        score: u64,
    ) -> FileResult<Scoreboard> {
        let mut scoreboard = self.load_scoreboard().await?;
        scoreboard.set_score(game_type, slot, score);
        self.write_json(&self.scoreboard_path(), &scoreboard)
            .await?;
        Ok(scoreboard)
    }

    async fn reset(&self) -> FileResult<Scoreboard> {
        let scoreboard = Scoreboard::default();
        self.write_json(&self.scoreboard_path(), &scoreboard)
            .await?;
        self.write_json(&self.results_path(), &Vec::<GameResult>::new())
            .await?;
        Ok(scoreboard)
    }

    async fn list_results(&self, limit: usize) -> FileResult<Vec<GameResult>> {
        let mut results = self.load_results().await?;
        results.truncate(limit);
        Ok(results)
    }

    async fn add_result(&self, result: NewResult) -> FileResult<GameResult> {
        let mut results = self.load_results().await?;
        let created = result.with_id(Uuid::new_v4().to_string());

        results.insert(0, created.clone());
        results.truncate(RESULTS_CAP);

        self.write_json(&self.results_path(), &results).await?;
        Ok(created)
    }

    async fn delete_result(&self, id: &str) -> FileResult<()> {
        let mut results = self.load_results().await?;
        results.retain(|result| result.id != id);
        self.write_json(&self.results_path(), &results).await
    }

    async fn health_check(&self) -> FileResult<()> {
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|source| FileStoreError::CreateDir {
                path: self.data_dir.to_path_buf(),
                source,
            })
    }
}

impl ScoreStore for FileScoreStore {
    fn get_scoreboard(&self) -> BoxFuture<'static, StorageResult<Scoreboard>> {
        let store = self.clone();
        Box::pin(async move { store.load_scoreboard().await.map_err(Into::into) })
    }

    fn set_score(
        &self,
        game_type: GameType,
        slot: PlayerSlot,
        score: u64,
    ) -> BoxFuture<'static, StorageResult<Scoreboard>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .set_score(game_type, slot, score)
                .await
                .map_err(Into::into)
        })
    }

    fn reset(&self) -> BoxFuture<'static, StorageResult<Scoreboard>> {
        let store = self.clone();
        Box::pin(async move { store.reset().await.map_err(Into::into) })
    }

    fn list_results(&self, limit: usize) -> BoxFuture<'static, StorageResult<Vec<GameResult>>> {
        let store = self.clone();
        Box::pin(async move { store.list_results(limit).await.map_err(Into::into) })
    }

    fn add_result(&self, result: NewResult) -> BoxFuture<'static, StorageResult<GameResult>> {
        let store = self.clone();
        Box::pin(async move { store.add_result(result).await.map_err(Into::into) })
    }

    fn delete_result(&self, id: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.delete_result(&id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.health_check().await.map_err(Into::into) })
    }

    fn close(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};
    use time::Duration;

    use super::*;
    use crate::dao::models::{PlayerScores, now_utc};

    fn temp_store() -> (FileScoreStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("scoreboard_store_{}", Uuid::new_v4()));
        (FileScoreStore::new(dir.clone()), dir)
    }

    fn outcome(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn first_read_materializes_default_documents() {
        let (store, dir) = temp_store();

        let scoreboard = store.load_scoreboard().await.unwrap();
        let results = store.load_results().await.unwrap();

        assert_eq!(scoreboard, Scoreboard::default());
        assert!(results.is_empty());
        assert!(fs::metadata(dir.join(SCOREBOARD_FILE)).await.is_ok());
        assert!(fs::metadata(dir.join(RESULTS_FILE)).await.is_ok());
    }

    #[tokio::test]
    async fn set_score_only_touches_one_cell() {
        let (store, _dir) = temp_store();

        store
            .set_score(GameType::Darts, PlayerSlot::One, 5)
            .await
            .unwrap();
        let scoreboard = store
            .set_score(GameType::Darts, PlayerSlot::Two, 3)
            .await
            .unwrap();

        assert_eq!(
            scoreboard.get(GameType::Darts),
            Some(&PlayerScores {
                player1: 5,
                player2: 3
            })
        );
        assert_eq!(
            scoreboard.get(GameType::Bowling),
            Some(&PlayerScores::default())
        );
        assert_eq!(store.load_scoreboard().await.unwrap(), scoreboard);
    }

    #[tokio::test]
    async fn adding_past_the_cap_evicts_the_oldest() {
        let (store, _dir) = temp_store();
        let start = now_utc();

        for index in 0..=RESULTS_CAP {
            let fields = outcome(json!({ "winner": "player1", "seq": index }));
            let at = start + Duration::seconds(index as i64);
            store
                .add_result(NewResult::new(GameType::Wordle, at, fields))
                .await
                .unwrap();
        }

        let results = store.list_results(RESULTS_CAP).await.unwrap();
        assert_eq!(results.len(), RESULTS_CAP);
        assert_eq!(results[0].fields["seq"], json!(RESULTS_CAP));
        assert_eq!(results[RESULTS_CAP - 1].fields["seq"], json!(1));
    }

    #[tokio::test]
    async fn delete_unknown_id_leaves_results_untouched() {
        let (store, _dir) = temp_store();
        let created = store
            .add_result(NewResult::new(
                GameType::Bowling,
                now_utc(),
                outcome(json!({ "winner": "player2" })),
            ))
            .await
            .unwrap();

        store.delete_result("missing").await.unwrap();
        assert_eq!(store.list_results(RESULTS_CAP).await.unwrap(), vec![created.clone()]);

        store.delete_result(&created.id).await.unwrap();
        assert!(store.list_results(RESULTS_CAP).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_zeroes_scores_and_clears_results() {
        let (store, _dir) = temp_store();
        store
            .set_score(GameType::Contexto, PlayerSlot::One, 12)
            .await
            .unwrap();
        store
            .add_result(NewResult::new(GameType::Contexto, now_utc(), Map::new()))
            .await
            .unwrap();

        let scoreboard = store.reset().await.unwrap();

        assert_eq!(scoreboard, Scoreboard::default());
        assert_eq!(store.load_scoreboard().await.unwrap(), Scoreboard::default());
        assert!(store.load_results().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupted_document_is_reported() {
        let (store, dir) = temp_store();
        fs::create_dir_all(&dir).await.unwrap();
        fs::write(dir.join(SCOREBOARD_FILE), b"{not json").await.unwrap();

        let err = store.load_scoreboard().await.unwrap_err();
        assert!(matches!(err, FileStoreError::Decode { .. }));
    }
}
