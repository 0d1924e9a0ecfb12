use serde::{Deserialize, Serialize};

/// Запись журнала изменений
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub timestamp: String,
    /// "server" или имя администратора
    pub source: String,
    pub category: String,
    pub message: String,
}
