use axum::{extract::State, response::Redirect, Json};
use axum_extra::extract::Form;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use fyyur_db::mutation::{self, ShowInput};
use fyyur_db::query::{self, ShowListing};
use fyyur_db::AppState;

use crate::error::ApiResult;

/// Defaults presented by an empty "new show" form.
#[derive(Debug, Serialize)]
pub struct ShowFormDefaults {
    pub venue_id: Option<i32>,
    pub artist_id: Option<i32>,
    pub start_time: DateTime<Utc>,
}

/// GET /shows
pub async fn list_shows(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ShowListing>>> {
    Ok(Json(query::list_shows(&state.db).await?))
}

/// GET /shows/create
pub async fn create_show_form() -> Json<ShowFormDefaults> {
    Json(ShowFormDefaults {
        venue_id: None,
        artist_id: None,
        start_time: Utc::now(),
    })
}

/// POST /shows/create
pub async fn create_show_submission(
    State(state): State<Arc<AppState>>,
    Form(input): Form<ShowInput>,
) -> ApiResult<Redirect> {
    mutation::create_show(&state.db, input).await?;
    Ok(Redirect::to("/"))
}
