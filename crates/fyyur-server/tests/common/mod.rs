// Shared test utilities for integration tests
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use fyyur_db::sea_orm::{ConnectOptions, Database};
use fyyur_db::AppState;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test AppState backed by a migrated in-memory SQLite database
pub async fn test_app_state() -> Arc<AppState> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    fyyur_migration::Migrator::up(&db, None).await.unwrap();
    Arc::new(AppState { db })
}

pub async fn test_app() -> Router {
    fyyur_server::router(test_app_state().await)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// A urlencoded form POST. `body` is already encoded.
pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub const HOP_FORM: &str = "name=The+Musical+Hop&city=San+Francisco&state=CA\
&address=1015+Folsom+Street&phone=123-123-1234\
&image_link=https%3A%2F%2Fimg.example.com%2Fhop.jpg\
&seeking_talent=y&seeking_description=Looking+for+a+local+artist\
&genres=Jazz&genres=Folk";

pub const PETALS_FORM: &str = "name=Guns+N+Petals&city=San+Francisco&state=CA\
&phone=326-123-5000&seeking_venue=y&genres=Rock+n+Roll";
