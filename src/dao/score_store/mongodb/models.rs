use mongodb::bson::{self, Bson, Document, doc};
use serde_json::{Map, Number, Value};
use time::OffsetDateTime;

use crate::dao::models::{
    GameResult, GameType, NewResult, PlayerScores, Scoreboard, format_timestamp, parse_timestamp,
};

use super::error::{MongoDaoError, MongoResult};

pub const SCOREBOARD_COLLECTION: &str = "scoreboard";
pub const RESULTS_COLLECTION: &str = "results";
/// Fixed key of the single scoreboard document.
pub const CURRENT_SCOREBOARD_ID: &str = "current";

pub fn current_scoreboard_filter() -> Document {
    doc! {"_id": CURRENT_SCOREBOARD_ID}
}

pub fn scores_document(scores: &PlayerScores) -> Document {
    doc! {
        "player1": score_to_bson(scores.player1),
        "player2": score_to_bson(scores.player2),
    }
}

pub fn scoreboard_document(scoreboard: &Scoreboard) -> Document {
    let mut document = current_scoreboard_filter();
    for (game, scores) in scoreboard.iter() {
        document.insert(game.as_str(), scores_document(scores));
    }
    document
}

/// Rebuild the scoreboard from its document, ignoring keys that are not known games.
pub fn scoreboard_from_document(document: &Document) -> Scoreboard {
    Scoreboard::from_entries(GameType::ALL.into_iter().filter_map(|game| {
        match document.get(game.as_str()) {
            Some(Bson::Document(scores)) => Some((
                game,
                PlayerScores {
                    player1: read_score(scores, "player1"),
                    player2: read_score(scores, "player2"),
                },
            )),
            _ => None,
        }
    }))
}

pub fn score_to_bson(score: u64) -> Bson {
    Bson::Int64(i64::try_from(score).unwrap_or(i64::MAX))
}

fn read_score(scores: &Document, key: &str) -> u64 {
    match scores.get(key) {
        Some(Bson::Int32(value)) => u64::try_from(*value).unwrap_or_default(),
        Some(Bson::Int64(value)) => u64::try_from(*value).unwrap_or_default(),
        Some(Bson::Double(value)) if *value >= 0.0 => *value as u64,
        _ => 0,
    }
}

/// Result document: outcome fields at the top level next to `gameType` and `timestamp`.
pub fn result_document(result: &NewResult) -> Document {
    let mut document: Document = result
        .fields
        .iter()
        .map(|(key, value)| (key.clone(), json_to_bson(value.clone())))
        .collect();
    document.insert("gameType", result.game_type.as_str());
    document.insert("timestamp", to_bson_datetime(result.timestamp));
    document
}

pub fn result_from_document(mut document: Document) -> MongoResult<GameResult> {
    let id = match document.remove("_id") {
        Some(Bson::ObjectId(id)) => id.to_hex(),
        Some(Bson::String(id)) => id,
        other => return Err(invalid(format!("unexpected result id {other:?}"))),
    };

    let game_type = match document.remove("gameType") {
        Some(Bson::String(raw)) => raw
            .parse::<GameType>()
            .map_err(|err| invalid(err.to_string()))?,
        other => return Err(invalid(format!("unexpected game type {other:?}"))),
    };

    let timestamp = match document.remove("timestamp") {
        Some(Bson::DateTime(at)) => from_bson_datetime(at),
        Some(Bson::String(raw)) => {
            parse_timestamp(&raw).map_err(|err| invalid(format!("bad timestamp `{raw}`: {err}")))?
        }
        other => return Err(invalid(format!("unexpected timestamp {other:?}"))),
    };

    let fields: Map<String, Value> = document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect();

    Ok(GameResult {
        id,
        game_type,
        timestamp,
        fields,
    })
}

/// Identifier returned to clients for a freshly inserted result.
pub fn inserted_result_id(inserted_id: Bson) -> MongoResult<String> {
    match inserted_id {
        Bson::ObjectId(id) => Ok(id.to_hex()),
        other => Err(invalid(format!("unexpected inserted id {other:?}"))),
    }
}

fn invalid(reason: String) -> MongoDaoError {
    MongoDaoError::InvalidDocument {
        collection: RESULTS_COLLECTION,
        reason,
    }
}

pub fn to_bson_datetime(value: OffsetDateTime) -> bson::DateTime {
    let millis = value.unix_timestamp_nanos() / 1_000_000;
    bson::DateTime::from_millis(i64::try_from(millis).unwrap_or(i64::MAX))
}

pub fn from_bson_datetime(value: bson::DateTime) -> OffsetDateTime {
    let nanos = i128::from(value.timestamp_millis()) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

fn json_to_bson(value: Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(flag) => Bson::Boolean(flag),
        Value::Number(number) => match number.as_i64() {
            Some(int) => Bson::Int64(int),
            None => Bson::Double(number.as_f64().unwrap_or_default()),
        },
        Value::String(text) => Bson::String(text),
        Value::Array(items) => Bson::Array(items.into_iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(
            map.into_iter()
                .map(|(key, value)| (key, json_to_bson(value)))
                .collect(),
        ),
    }
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(flag) => Value::Bool(flag),
        Bson::Int32(int) => Value::from(int),
        Bson::Int64(int) => Value::from(int),
        Bson::Double(float) => Number::from_f64(float).map_or(Value::Null, Value::Number),
        Bson::String(text) => Value::String(text),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(document) => Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::DateTime(at) => Value::String(format_timestamp(from_bson_datetime(at))),
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        other => Value::String(other.to_string()),
    }
}
