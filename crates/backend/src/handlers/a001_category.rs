use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a001_category::{Category, CategoryDto};
use serde_json::json;

use crate::domain::a001_category::service::{self, CategoryError};
use crate::shared::data::db::get_connection;

fn status_of(e: &CategoryError) -> StatusCode {
    match e {
        CategoryError::Invalid(_) => StatusCode::BAD_REQUEST,
        CategoryError::NotFound(_) => StatusCode::NOT_FOUND,
        CategoryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// GET /api/categories
pub async fn list_all() -> Result<Json<Vec<Category>>, StatusCode> {
    match service::list_all(get_connection()).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/categories/main
pub async fn list_main() -> Result<Json<Vec<Category>>, StatusCode> {
    match service::list_main(get_connection()).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/categories/sub
pub async fn list_sub() -> Result<Json<Vec<Category>>, StatusCode> {
    match service::list_sub(get_connection()).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/categories/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Category>, StatusCode> {
    match service::get_by_id(get_connection(), &id).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/categories
pub async fn upsert(
    Json(dto): Json<CategoryDto>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match service::upsert(get_connection(), dto).await {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(e) => {
            tracing::warn!("Category upsert failed: {}", e);
            Err((status_of(&e), e.to_string()))
        }
    }
}

/// DELETE /api/categories/:id
pub async fn deactivate(Path(id): Path<String>) -> StatusCode {
    match service::deactivate(get_connection(), &id).await {
        Ok(()) => StatusCode::OK,
        Err(e) => status_of(&e),
    }
}

/// POST /api/categories/testdata
pub async fn insert_test_data() -> StatusCode {
    match service::insert_test_data(get_connection()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("Failed to insert test categories: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
