use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::domain::a002_page_section::ValidationError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageSectionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("storage error: {0}")]
    Storage(#[from] DbErr),
    #[error("catalog error: {0}")]
    Catalog(anyhow::Error),
    #[error("corrupt section document: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl IntoResponse for PageSectionError {
    fn into_response(self) -> Response {
        match self {
            // Нарушенное правило уходит клиенту как есть: {rule, detail}
            PageSectionError::Validation(e) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(e)).into_response()
            }
            other => {
                tracing::error!("Page section request failed: {}", other);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
