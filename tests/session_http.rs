mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::app::spawn_test_app;
use common::http::{assert_json_error, send_json, session_report, start_session};

#[tokio::test]
async fn it_session_lifecycle() {
    let app = spawn_test_app().await;

    let (status, body) = send_json(&app.app, Method::GET, "/api/session", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");

    let (status, body) = send_json(
        &app.app,
        Method::POST,
        "/api/session",
        Some(json!({ "exerciseType": "ForearmSupinationPronation", "debugOverlayEnabled": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = body["data"]["sessionId"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["config"]["debugOverlayEnabled"], true);
    assert!(body["data"]["replacedSessionId"].is_null());

    let report = session_report(&app.app).await;
    assert_eq!(report["sessionId"], session_id.as_str());
    assert_eq!(report["metrics"]["exercise"], "ForearmSupinationPronation");
    assert!(report["metrics"]["supination"]["current"].is_null());
    assert_eq!(report["stats"]["handFrames"], 0);

    let (status, body) = send_json(&app.app, Method::DELETE, "/api/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sessionId"], session_id.as_str());

    let (status, _) = send_json(&app.app, Method::DELETE, "/api/session", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn it_new_session_replaces_running_one() {
    let app = spawn_test_app().await;

    let first = start_session(&app.app, "OpeningClosingFist").await;
    let (status, body) = send_json(
        &app.app,
        Method::POST,
        "/api/session",
        Some(json!({ "exerciseType": "WristFlexionExtension" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["replacedSessionId"], first.as_str());
    assert_eq!(body["data"]["config"]["debugOverlayEnabled"], false);

    let report = session_report(&app.app).await;
    assert_eq!(report["metrics"]["exercise"], "WristFlexionExtension");
}

#[tokio::test]
async fn it_rejects_unknown_exercise() {
    let app = spawn_test_app().await;

    let (status, body) = send_json(
        &app.app,
        Method::POST,
        "/api/session",
        Some(json!({ "exerciseType": "Squat" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_REQUEST_BODY");
}
