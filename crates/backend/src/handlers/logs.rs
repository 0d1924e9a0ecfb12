use axum::{extract::Query, http::StatusCode, Json};
use contracts::shared::logger::LogEntry;
use serde::Deserialize;

use crate::shared::data::db::get_connection;
use crate::shared::logger;

const DEFAULT_LIMIT: u64 = 200;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub category: Option<String>,
    pub limit: Option<u64>,
}

/// GET /api/logs
pub async fn list_recent(Query(query): Query<LogsQuery>) -> Result<Json<Vec<LogEntry>>, StatusCode> {
    match logger::repository::list_recent(
        get_connection(),
        query.category.as_deref(),
        query.limit.unwrap_or(DEFAULT_LIMIT),
    )
    .await
    {
        Ok(logs) => Ok(Json(logs)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// DELETE /api/logs
pub async fn clear_all() -> StatusCode {
    match logger::repository::clear_all(get_connection()).await {
        Ok(removed) => {
            tracing::info!("Change log cleared ({} entries)", removed);
            StatusCode::OK
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
