use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use fyyur_db::AppState;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};

pub mod api;
pub mod config;
pub mod error;

#[derive(Serialize)]
struct ApiStatus {
    status: &'static str,
    version: &'static str,
}

/// Every route, with tracing and security headers applied.
pub fn router(state: Arc<AppState>) -> Router {
    let venues = Router::new()
        .route("/", get(api::venues::list_venues))
        .route("/search", post(api::venues::search_venues))
        .route(
            "/create",
            get(api::venues::create_venue_form).post(api::venues::create_venue_submission),
        )
        .route(
            "/{id}",
            get(api::venues::show_venue).delete(api::venues::delete_venue),
        )
        .route(
            "/{id}/edit",
            get(api::venues::edit_venue).post(api::venues::edit_venue_submission),
        );

    let artists = Router::new()
        .route("/", get(api::artists::list_artists))
        .route("/search", post(api::artists::search_artists))
        .route(
            "/create",
            get(api::artists::create_artist_form).post(api::artists::create_artist_submission),
        )
        .route("/{id}", get(api::artists::show_artist))
        .route(
            "/{id}/edit",
            get(api::artists::edit_artist).post(api::artists::edit_artist_submission),
        );

    let shows = Router::new()
        .route("/", get(api::shows::list_shows))
        .route(
            "/create",
            get(api::shows::create_show_form).post(api::shows::create_show_submission),
        );

    Router::new()
        .route("/", get(healthz))
        .route("/healthz", get(healthz))
        .nest("/venues", venues)
        .nest("/artists", artists)
        .nest("/shows", shows)
        .layer(TraceLayer::new_for_http())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

/// CORS restricted to the configured origins.
pub fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

async fn healthz() -> Json<ApiStatus> {
    Json(ApiStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
