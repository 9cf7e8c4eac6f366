//! Error types of the CouchDB score store.

use reqwest::StatusCode;
use thiserror::Error;

pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures talking to CouchDB. `path` is relative to the database (`_all_docs`, a
/// document id) or the database itself.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("invalid CouchDB base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request never got an HTTP response (connection refused, timeout).
    #[error("CouchDB request to `{path}` failed")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB answered {status} for `{path}`")]
    UnexpectedStatus { path: String, status: StatusCode },
    #[error("failed to decode CouchDB response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// A listed document does not have the expected shape.
    #[error("malformed CouchDB document `{doc_id}`")]
    MalformedDocument {
        doc_id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("CouchDB document `{doc_id}` has no revision")]
    MissingRevision { doc_id: String },
}
