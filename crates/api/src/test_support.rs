//! Router fixtures for handler tests.
//!
//! The connection is never opened, so only requests rejected before any
//! query can be exercised here.

use axum::{
    Router,
    body::Body,
    http::{Request, header},
};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

use crate::{AppState, create_router};

pub fn test_app() -> Router {
    create_router(AppState::new(
        DatabaseConnection::default(),
        Tz::Africa__Johannesburg,
    ))
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    use http_body_util::BodyExt;

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
