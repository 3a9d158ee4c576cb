use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::Form;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use fyyur_db::mutation::{self, VenueInput};
use fyyur_db::query::{self, CityArea, SearchResults, VenueDetail, VenueEdit};
use fyyur_db::AppState;

use super::SearchForm;
use crate::error::{ApiError, ApiResult};

/// GET /venues
pub async fn list_venues(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<CityArea>>> {
    let areas = query::list_venues_by_city(&state.db, Utc::now()).await?;
    Ok(Json(areas))
}

/// POST /venues/search
pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> ApiResult<Json<SearchResults>> {
    let results = query::search_venues(&state.db, &form.search_term, Utc::now()).await?;
    Ok(Json(results))
}

/// GET /venues/{id}
pub async fn show_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<VenueDetail>> {
    let detail = query::venue_detail(&state.db, id, Utc::now()).await?;
    Ok(Json(detail))
}

/// GET /venues/create
pub async fn create_venue_form() -> Json<VenueInput> {
    Json(VenueInput::blank())
}

/// POST /venues/create
pub async fn create_venue_submission(
    State(state): State<Arc<AppState>>,
    Form(input): Form<VenueInput>,
) -> ApiResult<Redirect> {
    mutation::create_venue(&state.db, input).await?;
    Ok(Redirect::to("/"))
}

/// GET /venues/{id}/edit
pub async fn edit_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<VenueEdit>> {
    let venue = query::venue_for_edit(&state.db, id).await?;
    Ok(Json(venue))
}

/// POST /venues/{id}/edit
pub async fn edit_venue_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Form(input): Form<VenueInput>,
) -> ApiResult<Redirect> {
    mutation::update_venue(&state.db, id, input).await?;
    Ok(Redirect::to(&format!("/venues/{id}")))
}

#[derive(Debug, Serialize)]
pub struct DeleteOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn delete_failure(status: StatusCode, error: String) -> Response {
    let body = DeleteOutcome {
        success: false,
        error: Some(error),
    };
    (status, Json(body)).into_response()
}

/// DELETE /venues/{id}
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "invalid venue id");
            return delete_failure(rejection.status(), rejection.body_text());
        }
    };

    match mutation::delete_venue(&state.db, id).await {
        Ok(_) => Json(DeleteOutcome {
            success: true,
            error: None,
        })
        .into_response(),
        Err(err) => {
            let err = ApiError::from(err);
            err.log();
            delete_failure(err.status(), err.message())
        }
    }
}
