use mongodb::error::Error as MongoError;
use thiserror::Error;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection")]
    InitialPing {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to load the scoreboard")]
    LoadScoreboard {
        #[source]
        source: MongoError,
    },
    #[error("failed to save the scoreboard")]
    SaveScoreboard {
        #[source]
        source: MongoError,
    },
    #[error("failed to list results")]
    ListResults {
        #[source]
        source: MongoError,
    },
    #[error("failed to save result")]
    SaveResult {
        #[source]
        source: MongoError,
    },
    #[error("failed to delete result `{id}`")]
    DeleteResult {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to clear results")]
    ClearResults {
        #[source]
        source: MongoError,
    },
    #[error("score {score} does not fit a BSON int64")]
    ScoreOutOfRange { score: u64 },
    #[error("malformed document in `{collection}`: {reason}")]
    InvalidDocument {
        collection: &'static str,
        reason: String,
    },
}
