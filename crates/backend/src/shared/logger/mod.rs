pub mod repository;

use sea_orm::DatabaseConnection;

/// Записать событие в журнал изменений.
///
/// Ошибка записи только логируется: журнал не должен ломать основную операцию.
pub async fn record(db: &DatabaseConnection, source: &str, category: &str, message: &str) {
    if let Err(e) = repository::log_event(db, source, category, message).await {
        tracing::warn!("Failed to write change log entry ({}): {}", category, e);
    }
}
