use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::models::{GameResult, Scoreboard};

pub const SCOREBOARD_DOC_ID: &str = "scoreboard::current";
pub const RESULT_PREFIX: &str = "result::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Single scoreboard document holding every game's scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchScoreboardDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub scores: Scoreboard,
}

impl CouchScoreboardDocument {
    pub fn new(scores: Scoreboard, rev: Option<String>) -> Self {
        Self {
            id: SCOREBOARD_DOC_ID.to_owned(),
            rev,
            scores,
        }
    }
}

/// One result per document, the record flattened next to CouchDB's bookkeeping keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchResultDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub result: GameResult,
}

impl From<GameResult> for CouchResultDocument {
    fn from(result: GameResult) -> Self {
        Self {
            id: result_doc_id(&result.id),
            rev: None,
            result,
        }
    }
}

pub fn result_doc_id(id: &str) -> String {
    format!("{RESULT_PREFIX}{id}")
}
