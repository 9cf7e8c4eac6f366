use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dao::{
    models::{GameResult, GameType, NewResult, PlayerSlot, RESULTS_CAP, Scoreboard},
    score_store::ScoreStore,
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, CouchResultDocument, CouchScoreboardDocument, END_SUFFIX, RESULT_PREFIX,
        SCOREBOARD_DOC_ID, result_doc_id,
    },
};

/// CouchDB-backed [`ScoreStore`] talking to the HTTP API through `reqwest`.
///
/// The scoreboard is the single document `scoreboard::current`; results are stored one
/// per document under the `result::` prefix.
#[derive(Clone)]
pub struct CouchScoreStore {
    client: Client,
    database_url: Arc<Url>,
    credentials: Option<Arc<(String, String)>>,
}

impl CouchScoreStore {
    /// Build the HTTP client and create the database when it does not exist yet.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            database_url: Arc::new(database_url(&config.base_url, &config.database)?),
            credentials: config.credentials.map(Arc::new),
        };

        store.ensure_database().await?;
        info!(database = %config.database, "connected to CouchDB");
        Ok(store)
    }

    /// Send a request against the database (`path` empty) or one of its endpoints.
    async fn send(
        &self,
        method: Method,
        path: &str,
        configure: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> CouchResult<Response> {
        let url = endpoint_url(&self.database_url, path);
        let mut builder = self.client.request(method, url);
        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(&credentials.0, Some(&credentials.1));
        }

        configure(builder)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: display_path(path),
                source,
            })
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let response = self.send(Method::GET, "", |builder| builder).await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let created = self.send(Method::PUT, "", |builder| builder).await?;
                expect_success("", created.status())?;
                info!(database = %self.database_url, "created CouchDB database");
                Ok(())
            }
            other => Err(unexpected("", other)),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.send(Method::GET, doc_id, |builder| builder).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: doc_id.to_owned(),
                        source,
                    }
                })
            }
            other => Err(unexpected(doc_id, other)),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .send(Method::PUT, doc_id, |builder| builder.json(document))
            .await?;
        expect_success(doc_id, response.status())
    }

    /// Delete a document revision; an already missing document is not an error.
    async fn delete_document(&self, doc_id: &str, rev: &str) -> CouchResult<()> {
        let response = self
            .send(Method::DELETE, doc_id, |builder| builder.query(&[("rev", rev)]))
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(()),
            status => expect_success(doc_id, status),
        }
    }

    /// Every document whose id starts with `prefix`, in id order.
    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        const ALL_DOCS: &str = "_all_docs";
        let query = [
            ("include_docs", "true".to_owned()),
            ("startkey", format!("\"{prefix}\"")),
            ("endkey", format!("\"{prefix}{END_SUFFIX}\"")),
        ];

        let response = self
            .send(Method::GET, ALL_DOCS, |builder| builder.query(&query))
            .await?;
        expect_success(ALL_DOCS, response.status())?;

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_owned(),
                source,
            }
        })?;

        payload
            .rows
            .into_iter()
            .filter_map(|row| row.doc.map(|doc| (row.id, doc)))
            .map(|(doc_id, doc)| {
                from_value(doc).map_err(|source| CouchDaoError::MalformedDocument { doc_id, source })
            })
            .collect()
    }

    async fn scoreboard_document(&self) -> CouchResult<Option<CouchScoreboardDocument>> {
        self.get_document::<CouchScoreboardDocument>(SCOREBOARD_DOC_ID)
            .await
    }

    async fn get_scoreboard(&self) -> CouchResult<Scoreboard> {
        if let Some(existing) = self.scoreboard_document().await? {
            return Ok(existing.scores);
        }

        debug!("no scoreboard document yet; creating default");
        let scoreboard = Scoreboard::default();
        self.put_document(
            SCOREBOARD_DOC_ID,
            &CouchScoreboardDocument::new(scoreboard.clone(), None),
        )
        .await?;
        Ok(scoreboard)
    }

    async fn set_score(
        &self,
        game_type: GameType,
        slot: PlayerSlot,
        score: u64,
    ) -> CouchResult<Scoreboard> {
        let mut document = match self.scoreboard_document().await? {
            Some(existing) => existing,
            None => CouchScoreboardDocument::new(Scoreboard::default(), None),
        };
        document.scores.set_score(game_type, slot, score);
        self.put_document(SCOREBOARD_DOC_ID, &document).await?;
        Ok(document.scores)
    }

    async fn reset(&self) -> CouchResult<Scoreboard> {
        let rev = self.scoreboard_document().await?.and_then(|doc| doc.rev);
        let scoreboard = Scoreboard::default();
        self.put_document(
            SCOREBOARD_DOC_ID,
            &CouchScoreboardDocument::new(scoreboard.clone(), rev),
        )
        .await?;

        let documents = self
            .list_documents::<CouchResultDocument>(RESULT_PREFIX)
            .await?;
        self.delete_result_documents(documents).await?;
        Ok(scoreboard)
    }

    /// All result documents, newest first.
    async fn sorted_result_documents(&self) -> CouchResult<Vec<CouchResultDocument>> {
        let mut documents = self
            .list_documents::<CouchResultDocument>(RESULT_PREFIX)
            .await?;
        documents.sort_by(|a, b| b.result.timestamp.cmp(&a.result.timestamp));
        Ok(documents)
    }

    async fn delete_result_documents(&self, documents: Vec<CouchResultDocument>) -> CouchResult<()> {
        for document in documents {
            let rev = document
                .rev
                .ok_or_else(|| CouchDaoError::MissingRevision {
                    doc_id: document.id.clone(),
                })?;
            self.delete_document(&document.id, &rev).await?;
        }
        Ok(())
    }

    async fn list_results(&self, limit: usize) -> CouchResult<Vec<GameResult>> {
        Ok(self
            .sorted_result_documents()
            .await?
            .into_iter()
            .take(limit)
            .map(|document| document.result)
            .collect())
    }

    async fn add_result(&self, result: NewResult) -> CouchResult<GameResult> {
        let created = result.with_id(Uuid::new_v4().to_string());
        let document = CouchResultDocument::from(created.clone());
        self.put_document(&document.id, &document).await?;

        let mut documents = self.sorted_result_documents().await?;
        if documents.len() > RESULTS_CAP {
            let overflow = documents.split_off(RESULTS_CAP);
            debug!(count = overflow.len(), "evicting results beyond cap");
            self.delete_result_documents(overflow).await?;
        }

        Ok(created)
    }

    async fn delete_result(&self, id: &str) -> CouchResult<()> {
        let doc_id = result_doc_id(id);
        match self.get_document::<CouchResultDocument>(&doc_id).await? {
            Some(document) => self.delete_result_documents(vec![document]).await,
            None => Ok(()),
        }
    }

    async fn health_check(&self) -> CouchResult<()> {
        let response = self.send(Method::GET, "", |builder| builder).await?;
        expect_success("", response.status())
    }
}

/// `{base_url}/{database}` with the database name encoded as one path segment.
fn database_url(base_url: &str, database: &str) -> CouchResult<Url> {
    let invalid = |reason: String| CouchDaoError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason,
    };
    let mut url = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("URL cannot have a path".to_owned()))?
        .pop_if_empty()
        .push(database);
    Ok(url)
}

/// Append `path` as a single percent-encoded segment so document ids containing `/`, `?`
/// or `#` cannot address anything outside the database.
fn endpoint_url(database_url: &Url, path: &str) -> Url {
    let mut url = database_url.clone();
    if !path.is_empty() {
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(path);
        }
    }
    url
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_owned()
    } else {
        path.to_owned()
    }
}

fn unexpected(path: &str, status: StatusCode) -> CouchDaoError {
    CouchDaoError::UnexpectedStatus {
        path: display_path(path),
        status,
    }
}

fn expect_success(path: &str, status: StatusCode) -> CouchResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(unexpected(path, status))
    }
}

impl ScoreStore for CouchScoreStore {
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
    use super::*;

    fn scoreboard_db() -> Url {
        database_url("http://couch:5984", "scoreboard").unwrap()
    }

    #[test]
    fn database_url_appends_the_database() {
        assert_eq!(scoreboard_db().as_str(), "http://couch:5984/scoreboard");
        assert_eq!(
            database_url("http://couch:5984/prefix", "scores").unwrap().as_str(),
            "http://couch:5984/prefix/scores"
        );
        assert!(matches!(
            database_url("not a url", "scores"),
            Err(CouchDaoError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn document_ids_stay_inside_the_database() {
        let db = scoreboard_db();

        let url = endpoint_url(&db, &result_doc_id("x/../../_users/org.couchdb.user:bob"));
        assert!(url.path().starts_with("/scoreboard/"));
        assert_eq!(url.path_segments().map(Iterator::count), Some(2));

        let url = endpoint_url(&db, &result_doc_id("a?rev=1#frag"));
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
        assert!(url.path().starts_with("/scoreboard/result::a%3Frev=1%23frag"));
    }

    #[test]
    fn empty_path_targets_the_database_itself() {
        let db = scoreboard_db();
        assert_eq!(endpoint_url(&db, ""), db);
        assert_eq!(endpoint_url(&db, "_all_docs").as_str(), "http://couch:5984/scoreboard/_all_docs");
    }
}
