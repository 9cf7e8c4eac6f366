use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use scoreboard_back::{
    config::{AppConfig, OriginPattern, PlayerNames},
    dao::score_store::file::FileScoreStore,
    routes,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    data_dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

fn test_app() -> TestApp {
    let data_dir = std::env::temp_dir().join(format!("scoreboard_api_{}", Uuid::new_v4()));
    let store = Arc::new(FileScoreStore::new(data_dir.clone()));
    let config = AppConfig::new(
        PlayerNames {
            player1: "Ada".into(),
            player2: "Grace".into(),
        },
        vec![
            OriginPattern::parse("http://localhost:5173"),
            OriginPattern::parse("https://*.netlify.app"),
        ],
    );
    TestApp {
        router: routes::router(AppState::new(store, config)),
        data_dir,
    }
}

async fn json_body(res: Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &TestApp, uri: &str) -> Response {
    app.router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn send_json(app: &TestApp, method: Method, uri: &str, body: Value) -> Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn send_empty(app: &TestApp, method: Method, uri: &str) -> Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn fresh_scoreboard_is_all_zero() {
    let app = test_app();

    let res = get(&app, "/api/scoreboard").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;

    let games = body.as_object().unwrap();
    assert_eq!(games.len(), 7);
    for scores in games.values() {
        assert_eq!(scores, &json!({"player1": 0, "player2": 0}));
    }
    assert!(app.data_dir.join("scoreboard.json").exists());
}

#[tokio::test]
async fn update_sets_a_single_cell() {
    let app = test_app();

    let res = send_json(
        &app,
        Method::POST,
        "/api/scoreboard/update",
        json!({"gameType": "darts", "player": 1, "score": 5}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["scoreboard"]["darts"], json!({"player1": 5, "player2": 0}));
    assert_eq!(body["scoreboard"]["bowling"], json!({"player1": 0, "player2": 0}));

    let res = send_json(
        &app,
        Method::POST,
        "/api/scoreboard/update",
        json!({"gameType": "darts", "player": 2, "score": 3}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = json_body(get(&app, "/api/scoreboard").await).await;
    assert_eq!(body["darts"], json!({"player1": 5, "player2": 3}));
    assert_eq!(body["wordle"], json!({"player1": 0, "player2": 0}));
}

#[tokio::test]
async fn invalid_updates_are_rejected_with_messages() {
    let app = test_app();

    let cases = [
        (json!({"gameType": "chess", "player": 1, "score": 1}), "Invalid game type"),
        (json!({"gameType": "darts", "player": 4, "score": 1}), "Invalid player number"),
        (json!({"gameType": "darts", "player": 1, "score": -1}), "Invalid score"),
        (json!({"gameType": "darts", "score": 1}), "Missing required fields"),
    ];

    for (payload, message) in cases {
        let res = send_json(&app, Method::POST, "/api/scoreboard/update", payload).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await, json!({"error": message}));
    }

    let body = json_body(get(&app, "/api/scoreboard").await).await;
    assert_eq!(body["darts"], json!({"player1": 0, "player2": 0}));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = test_app();

    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/scoreboard/update")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json_body(res).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn results_round_trip_through_latest() {
    let app = test_app();

    let res = get(&app, "/api/results/latest").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, Value::Null);

    let res = send_json(
        &app,
        Method::POST,
        "/api/results",
        json!({"gameType": "bowling", "winner": "player1", "id": "mine"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let created = json_body(res).await;

    let id = created["id"].as_str().unwrap();
    assert_ne!(id, "mine");
    assert_eq!(created["gameType"], json!("bowling"));
    assert_eq!(created["winner"], json!("player1"));
    let timestamp = created["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z'));
    assert_eq!(timestamp.len(), "2024-01-01T00:00:00.000Z".len());

    let latest = json_body(get(&app, "/api/results/latest").await).await;
    assert_eq!(latest, created);

    let all = json_body(get(&app, "/api/results").await).await;
    assert_eq!(all, json!([created]));
}

#[tokio::test]
async fn submitted_ids_and_metadata_are_ignored() {
    let app = test_app();

    let res = send_json(
        &app,
        Method::POST,
        "/api/results",
        json!({"gameType": "darts", "_id": "x", "_rev": "1-a", "winner": "player2"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let created = json_body(res).await;

    let id = created["id"].as_str().unwrap();
    assert!(Uuid::parse_str(id).is_ok());
    assert!(created.get("_id").is_none());
    assert!(created.get("_rev").is_none());
    assert_eq!(created["winner"], json!("player2"));

    let res = send_empty(&app, Method::DELETE, &format!("/api/results/{id}")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(get(&app, "/api/results").await).await, json!([]));
}

#[tokio::test]
async fn null_score_is_invalid_rather_than_missing() {
    let app = test_app();

    let res = send_json(
        &app,
        Method::POST,
        "/api/scoreboard/update",
        json!({"gameType": "darts", "player": 1, "score": null}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await, json!({"error": "Invalid score"}));

    let res = send_json(
        &app,
        Method::POST,
        "/api/scoreboard/update",
        json!({"gameType": "darts", "player": 1, "score": 9_223_372_036_854_775_808u64}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await, json!({"error": "Invalid score"}));
}

#[tokio::test]
async fn invalid_results_are_rejected() {
    let app = test_app();

    let res = send_json(&app, Method::POST, "/api/results", json!({"winner": "player2"})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await, json!({"error": "Game type is required"}));

    let res = send_json(&app, Method::POST, "/api/results", json!({"gameType": "chess"})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await, json!({"error": "Invalid game type"}));

    let res = send_json(
        &app,
        Method::POST,
        "/api/results",
        json!({"gameType": "darts", "timestamp": "soon"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await, json!({"error": "Invalid timestamp"}));
}

#[tokio::test]
async fn results_are_capped_at_one_hundred_newest_first() {
    let app = test_app();

    for seq in 0..101 {
        let res = send_json(
            &app,
            Method::POST,
            "/api/results",
            json!({"gameType": "wordle", "seq": seq}),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let all = json_body(get(&app, "/api/results").await).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 100);
    assert_eq!(all[0]["seq"], json!(100));
    assert_eq!(all[99]["seq"], json!(1));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let app = test_app();

    let created = json_body(
        send_json(&app, Method::POST, "/api/results", json!({"gameType": "contexto"})).await,
    )
    .await;
    let id = created["id"].as_str().unwrap().to_owned();

    let uri = format!("/api/results/{id}");
    let res = send_empty(&app, Method::DELETE, &uri).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!({"success": true, "deleted": id}));

    let res = send_empty(&app, Method::DELETE, &uri).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!({"success": true, "deleted": id}));

    let res = send_empty(&app, Method::DELETE, "/api/results/does-not-exist").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        json_body(res).await,
        json!({"success": true, "deleted": "does-not-exist"})
    );

    assert_eq!(json_body(get(&app, "/api/results").await).await, json!([]));
}

#[tokio::test]
async fn reset_clears_scores_and_results() {
    let app = test_app();

    send_json(
        &app,
        Method::POST,
        "/api/scoreboard/update",
        json!({"gameType": "british-pool", "player": 2, "score": 9}),
    )
    .await;
    send_json(&app, Method::POST, "/api/results", json!({"gameType": "british-pool"})).await;

    let res = send_empty(&app, Method::POST, "/api/scoreboard/reset").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["scoreboard"]["british-pool"], json!({"player1": 0, "player2": 0}));

    assert_eq!(json_body(get(&app, "/api/results").await).await, json!([]));
    assert_eq!(json_body(get(&app, "/api/results/latest").await).await, Value::Null);
}

#[tokio::test]
async fn players_come_from_configuration() {
    let app = test_app();

    let res = get(&app, "/api/scoreboard/players").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!({"player1": "Ada", "player2": "Grace"}));
}

#[tokio::test]
async fn health_reports_ok_with_reachable_storage() {
    let app = test_app();

    let res = get(&app, "/api/health").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        json_body(res).await,
        json!({"status": "ok", "message": "Server is running"})
    );
}

#[tokio::test]
async fn corrupted_storage_surfaces_generic_error() {
    let app = test_app();
    std::fs::create_dir_all(&app.data_dir).unwrap();
    std::fs::write(app.data_dir.join("scoreboard.json"), "{broken").unwrap();

    let res = get(&app, "/api/scoreboard").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(res).await, json!({"error": "Failed to get scoreboard"}));
}

#[tokio::test]
async fn cors_allows_configured_origins_only() {
    let app = test_app();

    let preflight = |origin: &'static str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/scoreboard/update")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let res = app
        .router
        .clone()
        .oneshot(preflight("https://billow-scoreboard.netlify.app"))
        .await
        .unwrap();
    assert_eq!(
        res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://billow-scoreboard.netlify.app"
    );
    assert_eq!(
        res.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );

    let res = app
        .router
        .clone()
        .oneshot(preflight("https://evil.example"))
        .await
        .unwrap();
    assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = test_app();

    let res = get(&app, "/api-doc/openapi.json").await;
    assert_eq!(res.status(), StatusCode::OK);
    let doc = json_body(res).await;
    assert!(doc["paths"]["/api/scoreboard/update"].is_object());
    assert!(doc["paths"]["/api/results/{id}"].is_object());
}
