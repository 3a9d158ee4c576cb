//! Catalog error types.

use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("show {show_id} references missing {entity} {id}")]
    DanglingReference {
        show_id: i32,
        entity: &'static str,
        id: i32,
    },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl CatalogError {
    /// True for failures caused by an id that does not resolve, either the
    /// requested entity itself or the far side of one of its shows.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::NotFound { .. } | CatalogError::DanglingReference { .. }
        )
    }
}
