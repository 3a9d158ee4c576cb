use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fyyur_db::CatalogError;
use serde::Serialize;

/// A catalog failure on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CatalogError::NotFound { .. } | CatalogError::DanglingReference { .. } => {
                StatusCode::NOT_FOUND
            }
            CatalogError::Validation(_) | CatalogError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Database details stay in the logs.
    pub fn message(&self) -> String {
        match &self.0 {
            CatalogError::Database(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Log at a level matching the status code.
    pub fn log(&self) {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "not found");
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let body = Json(ErrorBody {
            error: self.message(),
            status: status.as_u16(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use fyyur_db::sea_orm::DbErr;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError(CatalogError::NotFound {
            entity: "venue",
            id: 1,
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let dangling = ApiError(CatalogError::DanglingReference {
            show_id: 1,
            entity: "artist",
            id: 2,
        });
        assert_eq!(dangling.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError(CatalogError::Validation("name is required".into()));
        assert_eq!(invalid.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let db = ApiError(CatalogError::Database(DbErr::Custom("boom".into())));
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_database_message_is_generic() {
        let err = ApiError(CatalogError::Database(DbErr::Custom(
            "relation \"venues\" does not exist".into(),
        )));
        assert_eq!(err.message(), "internal server error");
    }

    #[test]
    fn test_validation_message_is_kept() {
        let err = ApiError(CatalogError::Validation("name is required".into()));
        assert_eq!(err.message(), "invalid input: name is required");
    }

    #[test]
    fn test_not_found_message_names_entity() {
        let err = ApiError(CatalogError::NotFound {
            entity: "artist",
            id: 12,
        });
        assert_eq!(err.message(), "artist 12 not found");
    }
}
