use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use axum_extra::extract::Form;
use chrono::Utc;
use std::sync::Arc;

use fyyur_db::mutation::{self, ArtistInput};
use fyyur_db::query::{self, ArtistDetail, ArtistEdit, ArtistSummary, SearchResults};
use fyyur_db::AppState;

use super::SearchForm;
use crate::error::ApiResult;

/// GET /artists
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ArtistSummary>>> {
    Ok(Json(query::list_artists(&state.db).await?))
}

/// POST /artists/search
pub async fn search_artists(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> ApiResult<Json<SearchResults>> {
    let results = query::search_artists(&state.db, &form.search_term, Utc::now()).await?;
    Ok(Json(results))
}

/// GET /artists/{id}
pub async fn show_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ArtistDetail>> {
    let detail = query::artist_detail(&state.db, id, Utc::now()).await?;
    Ok(Json(detail))
}

/// GET /artists/create
pub async fn create_artist_form() -> Json<ArtistInput> {
    Json(ArtistInput::blank())
}

/// POST /artists/create
pub async fn create_artist_submission(
    State(state): State<Arc<AppState>>,
    Form(input): Form<ArtistInput>,
) -> ApiResult<Redirect> {
    mutation::create_artist(&state.db, input).await?;
    Ok(Redirect::to("/"))
}

/// GET /artists/{id}/edit
pub async fn edit_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ArtistEdit>> {
    Ok(Json(query::artist_for_edit(&state.db, id).await?))
}

/// POST /artists/{id}/edit
pub async fn edit_artist_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Form(input): Form<ArtistInput>,
) -> ApiResult<Redirect> {
    mutation::update_artist(&state.db, id, input).await?;
    Ok(Redirect::to(&format!("/artists/{id}")))
}
