use chrono::{DateTime, Utc};
use contracts::domain::a002_page_section::{PageSectionConfig, SectionEntry};
use contracts::enums::section_layout::SectionLayout;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, DatabaseBackend, EntityTrait, Statement};

use super::error::PageSectionError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a002_page_section")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub page_id: String,
    pub enabled: bool,
    pub max_categories_to_display: i64,
    pub layout: String,
    pub show_subcategories_on_hover: bool,
    pub entries_json: String,
    pub modified_by: Option<String>,
    pub last_modified: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for PageSectionConfig {
    type Error = PageSectionError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let entries: Vec<SectionEntry> = serde_json::from_str(&m.entries_json)?;
        let layout = SectionLayout::from_code(&m.layout).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown layout '{}' for page {}, using default",
                m.layout,
                m.page_id
            );
            SectionLayout::default()
        });
        Ok(PageSectionConfig {
            page_id: m.page_id,
            enabled: m.enabled,
            max_categories_to_display: u32::try_from(m.max_categories_to_display.max(0))
                .unwrap_or(u32::MAX),
            layout,
            show_subcategories_on_hover: m.show_subcategories_on_hover,
            entries,
            modified_by: m.modified_by,
            last_modified: m.last_modified,
        })
    }
}

pub async fn find_model(db: &DatabaseConnection, page_id: &str) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(page_id.to_string()).one(db).await
}

pub async fn find(
    db: &DatabaseConnection,
    page_id: &str,
) -> Result<Option<PageSectionConfig>, PageSectionError> {
    match find_model(db, page_id).await? {
        Some(model) => Ok(Some(model.try_into()?)),
        None => Ok(None),
    }
}

fn document_values(config: &PageSectionConfig) -> Result<Vec<sea_orm::Value>, PageSectionError> {
    let entries_json = serde_json::to_string(&config.entries)?;
    Ok(vec![
        config.page_id.clone().into(),
        config.enabled.into(),
        i64::from(config.max_categories_to_display).into(),
        config.layout.code().into(),
        config.show_subcategories_on_hover.into(),
        entries_json.into(),
        config.modified_by.clone().into(),
        config.last_modified.into(),
    ])
}

/// Создать запись, если её ещё нет. Существующая запись не трогается.
pub async fn insert_if_missing(
    db: &DatabaseConnection,
    config: &PageSectionConfig,
) -> Result<(), PageSectionError> {
    let query = r#"
        INSERT INTO a002_page_section (
            page_id, enabled, max_categories_to_display, layout,
            show_subcategories_on_hover, entries_json, modified_by, last_modified
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(page_id) DO NOTHING
    "#;
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        query,
        document_values(config)?,
    ))
    .await?;
    Ok(())
}

/// Заменить документ целиком одним запросом.
///
/// `enabled` берётся из `config` только для новой записи; у существующей
/// флаг не меняется.
pub async fn upsert_content(
    db: &DatabaseConnection,
    config: &PageSectionConfig,
) -> Result<(), PageSectionError> {
    let query = r#"
        INSERT INTO a002_page_section (
            page_id, enabled, max_categories_to_display, layout,
            show_subcategories_on_hover, entries_json, modified_by, last_modified
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(page_id) DO UPDATE SET
            max_categories_to_display = excluded.max_categories_to_display,
            layout = excluded.layout,
            show_subcategories_on_hover = excluded.show_subcategories_on_hover,
            entries_json = excluded.entries_json,
            modified_by = excluded.modified_by,
            last_modified = excluded.last_modified
    "#;
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        query,
        document_values(config)?,
    ))
    .await?;
    Ok(())
}

pub async fn set_enabled(
    db: &DatabaseConnection,
    page_id: &str,
    enabled: bool,
    now: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let result = Entity::update_many()
        .col_expr(Column::Enabled, Expr::value(enabled))
        .col_expr(Column::LastModified, Expr::value(now))
        .filter(Column::PageId.eq(page_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    #[tokio::test]
    async fn test_insert_if_missing_keeps_existing_row() {
        let db = test_connection().await;
        let mut config = PageSectionConfig::new_default("home", Utc::now());
        config.entries = vec![SectionEntry::main("cat-A", true, 0)];
        insert_if_missing(&db, &config).await.unwrap();

        let other = PageSectionConfig::new_default("home", Utc::now());
        insert_if_missing(&db, &other).await.unwrap();

        let stored = find(&db, "home").await.unwrap().unwrap();
        assert_eq!(stored.entries, config.entries);
    }

    #[tokio::test]
    async fn test_upsert_content_does_not_touch_enabled() {
        let db = test_connection().await;
        let config = PageSectionConfig::new_default("home", Utc::now());
        insert_if_missing(&db, &config).await.unwrap();
        assert!(set_enabled(&db, "home", false, Utc::now()).await.unwrap());

        let mut next = config.clone();
        next.enabled = true;
        next.layout = SectionLayout::Carousel;
        next.entries = vec![SectionEntry::main("cat-B", true, 0)];
        upsert_content(&db, &next).await.unwrap();

        let stored = find(&db, "home").await.unwrap().unwrap();
        assert!(!stored.enabled);
        assert_eq!(stored.layout, SectionLayout::Carousel);
        assert_eq!(stored.entries, next.entries);
    }

    #[tokio::test]
    async fn test_corrupt_entries_are_reported() {
        let db = test_connection().await;
        let config = PageSectionConfig::new_default("home", Utc::now());
        insert_if_missing(&db, &config).await.unwrap();
        db.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "UPDATE a002_page_section SET entries_json = '{oops' WHERE page_id = 'home'"
                .to_string(),
        ))
        .await
        .unwrap();

        assert!(matches!(
            find(&db, "home").await,
            Err(PageSectionError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_large_display_limit_is_stored_exactly() {
        let db = test_connection().await;
        let mut config = PageSectionConfig::new_default("home", Utc::now());
        config.max_categories_to_display = 3_000_000_000;
        upsert_content(&db, &config).await.unwrap();

        let stored = find(&db, "home").await.unwrap().unwrap();
        assert_eq!(stored.max_categories_to_display, 3_000_000_000);
        assert_eq!(stored.display_limit(), Some(3_000_000_000));
    }

    #[tokio::test]
    async fn test_set_enabled_on_missing_row() {
        let db = test_connection().await;
        assert!(!set_enabled(&db, "nope", true, Utc::now()).await.unwrap());
    }
}
