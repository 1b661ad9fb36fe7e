//! Common test utilities

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use core_banking::{api, AppState};
use serde_json::Value;
use tower::util::ServiceExt;

/// Fresh seeded state plus a router over it
pub fn setup_app() -> (AppState, Router) {
    let state = AppState::seeded().expect("Failed to seed accounts");
    let app = api::build_router(state.clone());
    (state, app)
}

/// POST a JSON body and return status and parsed response
pub async fn post_json(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, req).await
}

/// GET and return status and parsed response
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}
