use chrono::Utc;
use contracts::shared::logger::LogEntry;
use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "system_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timestamp: String,
    pub source: String,
    pub category: String,
    pub message: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LogEntry {
    fn from(m: Model) -> Self {
        LogEntry {
            id: m.id,
            timestamp: m.timestamp,
            source: m.source,
            category: m.category,
            message: m.message,
        }
    }
}

pub async fn log_event(
    db: &DatabaseConnection,
    source: &str,
    category: &str,
    message: &str,
) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        timestamp: Set(Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()),
        source: Set(source.to_string()),
        category: Set(category.to_string()),
        message: Set(message.to_string()),
    };
    active.insert(db).await?;
    Ok(())
}

/// Последние записи, новые сверху
pub async fn list_recent(
    db: &DatabaseConnection,
    category: Option<&str>,
    limit: u64,
) -> Result<Vec<LogEntry>, DbErr> {
    let mut query = Entity::find().order_by_desc(Column::Id).limit(limit);
    if let Some(category) = category {
        query = query.filter(Column::Category.eq(category));
    }
    Ok(query.all(db).await?.into_iter().map(Into::into).collect())
}

pub async fn clear_all(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let result = Entity::delete_many().exec(db).await?;
    Ok(result.rows_affected)
}
