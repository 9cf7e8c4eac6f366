use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Bson, Document, doc, oid::ObjectId},
    options::{IndexOptions, ReturnDocument},
};
use tracing::{debug, info};

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
    models::{
        RESULTS_COLLECTION, SCOREBOARD_COLLECTION, current_scoreboard_filter, inserted_result_id,
        result_document,
        result_from_document, score_to_bson, scoreboard_document, scoreboard_from_document,
        scores_document,
    },
};
use crate::dao::{
    models::{
        GameResult, GameType, MAX_SCORE, NewResult, PlayerScores, PlayerSlot, RESULTS_CAP,
        Scoreboard,
    },
    score_store::ScoreStore,
    storage::StorageResult,
};

/// MongoDB-backed [`ScoreStore`].
///
/// The scoreboard is a single document keyed `current`; each result is its own document in
/// the `results` collection.
#[derive(Clone)]
pub struct MongoScoreStore {
    client: Client,
    database: Database,
}

impl MongoScoreStore {
    /// Connect, verify the deployment answers a ping and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let client = Client::with_options(config.options)
            .map_err(|source| MongoDaoError::ClientConstruction { source })?;
        let database = client.database(&config.database_name);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::InitialPing { source })?;
        info!(database = %config.database_name, "connected to MongoDB");

        let store = Self { client, database };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let index = IndexModel::builder()
            .keys(doc! {"timestamp": -1})
            .options(
                IndexOptions::builder()
                    .name(Some("result_timestamp_idx".to_owned()))
                    .build(),
            )
            .build();

        self.results()
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: RESULTS_COLLECTION,
                index: "timestamp",
                source,
            })?;

        Ok(())
    }

    fn scoreboard(&self) -> Collection<Document> {
        self.database.collection::<Document>(SCOREBOARD_COLLECTION)
    }

    fn results(&self) -> Collection<Document> {
        self.database.collection::<Document>(RESULTS_COLLECTION)
    }

    async fn get_scoreboard(&self) -> MongoResult<Scoreboard> {
        let collection = self.scoreboard();
        let existing = collection
            .find_one(current_scoreboard_filter())
            .await
            .map_err(|source| MongoDaoError::LoadScoreboard { source })?;

        if let Some(document) = existing {
            return Ok(scoreboard_from_document(&document));
        }

        debug!("no scoreboard document yet; creating default");
        let scoreboard = Scoreboard::default();
        collection
            .replace_one(current_scoreboard_filter(), scoreboard_document(&scoreboard))
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveScoreboard { source })?;
        Ok(scoreboard)
    }

    async fn set_score(
        &self,
        game_type: GameType,
        slot: PlayerSlot,
        score: u64,
    ) -> MongoResult<Scoreboard> {
        if score > MAX_SCORE {
            return Err(MongoDaoError::ScoreOutOfRange { score });
        }
        let current = self.get_scoreboard().await?;

        // A game missing from the document gets a full entry so the other player reads as zero.
        let mut set = Document::new();
        if current.get(game_type).is_some() {
            let path = format!("{}.{}", game_type.as_str(), slot.field());
            set.insert(path, score_to_bson(score));
        } else {
            let mut scores = PlayerScores::default();
            scores.set(slot, score);
            set.insert(game_type.as_str(), scores_document(&scores));
        }
        let update = doc! { "$set": set };

        let updated = self
            .scoreboard()
            .find_one_and_update(current_scoreboard_filter(), update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::SaveScoreboard { source })?;

        match updated {
            Some(document) => Ok(scoreboard_from_document(&document)),
            None => {
                let mut scoreboard = current;
                scoreboard.set_score(game_type, slot, score);
                Ok(scoreboard)
            }
        }
    }

    async fn reset(&self) -> MongoResult<Scoreboard> {
        let scoreboard = Scoreboard::default();
        self.scoreboard()
            .replace_one(current_scoreboard_filter(), scoreboard_document(&scoreboard))
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveScoreboard { source })?;

        self.results()
            .delete_many(doc! {})
            .await
            .map_err(|source| MongoDaoError::ClearResults { source })?;

        Ok(scoreboard)
    }

    async fn list_results(&self, limit: usize) -> MongoResult<Vec<GameResult>> {
        let documents: Vec<Document> = self
            .results()
            .find(doc! {})
            .sort(doc! {"timestamp": -1})
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await
            .map_err(|source| MongoDaoError::ListResults { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListResults { source })?;

        documents.into_iter().map(result_from_document).collect()
    }

    async fn add_result(&self, result: NewResult) -> MongoResult<GameResult> {
        let inserted = self
            .results()
            .insert_one(result_document(&result))
            .await
            .map_err(|source| MongoDaoError::SaveResult { source })?;

        let id = inserted_result_id(inserted.inserted_id)?;

        self.evict_overflow().await?;
        Ok(result.with_id(id))
    }

    /// Delete every result older than the newest [`RESULTS_CAP`] entries.
    async fn evict_overflow(&self) -> MongoResult<()> {
        let overflow: Vec<Document> = self
            .results()
            .find(doc! {})
            .sort(doc! {"timestamp": -1})
            .skip(RESULTS_CAP as u64)
            .projection(doc! {"_id": 1})
            .await
            .map_err(|source| MongoDaoError::ListResults { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListResults { source })?;

        let ids: Vec<Bson> = overflow
            .into_iter()
            .filter_map(|mut document| document.remove("_id"))
            .collect();
        if ids.is_empty() {
            return Ok(());
        }

        debug!(count = ids.len(), "evicting results beyond cap");
        self.results()
            .delete_many(doc! {"_id": {"$in": ids}})
            .await
            .map_err(|source| MongoDaoError::ClearResults { source })?;
        Ok(())
    }

    async fn delete_result(&self, id: String) -> MongoResult<()> {
        // Identifiers that are not ObjectIds cannot match anything.
        let Ok(object_id) = ObjectId::parse_str(&id) else {
            debug!(%id, "ignoring delete for non ObjectId identifier");
            return Ok(());
        };

        self.results()
            .delete_one(doc! {"_id": object_id})
            .await
            .map_err(|source| MongoDaoError::DeleteResult { id, source })?;
        Ok(())
    }

    async fn ping(&self) -> MongoResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }
}

impl ScoreStore for MongoScoreStore {
    fn get_scoreboard(&self) -> BoxFuture<'static, StorageResult<Scoreboard>> {
        let store = self.clone();
        Box::pin(async move { store.get_scoreboard().await.map_err(Into::into) })
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
        Box::pin(async move { store.delete_result(id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn close(&self) -> BoxFuture<'static, StorageResult<()>> {
        let client = self.client.clone();
        Box::pin(async move {
            client.shutdown().await;
            info!("MongoDB connection closed");
            Ok(())
        })
    }
}
