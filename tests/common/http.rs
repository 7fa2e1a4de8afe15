use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt;

pub async fn request(app: &Router, method: Method, path: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(path);

    let req = if let Some(payload) = body {
        builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("empty body")
    };

    app.clone().oneshot(req).await.expect("oneshot response")
}

pub async fn response_json(resp: Response) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body bytes");

    let json = if bytes.is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_slice::<Value>(&bytes).expect("parse json body")
    };

    (status, json)
}

pub async fn send_json(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    response_json(request(app, method, path, body).await).await
}

pub async fn start_session(app: &Router, exercise: &str) -> String {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/api/session",
        Some(serde_json::json!({ "exerciseType": exercise })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["sessionId"]
        .as_str()
        .expect("session id")
        .to_string()
}

/// Current session report. Also acts as a barrier: every frame accepted
/// before this call has been processed when it returns.
pub async fn session_report(app: &Router) -> Value {
    let (status, body) = send_json(app, Method::GET, "/api/session", None).await;
    assert_status_ok_json(status, &body);
    body["data"].clone()
}

pub fn assert_json_error(body: &Value, code: &str) {
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], code);
    assert!(body.get("message").is_some());
}

pub fn assert_status_ok_json(status: StatusCode, body: &Value) {
    assert!(status.is_success());
    assert_eq!(body["success"], true);
    assert!(body.get("data").is_some());
}
