use chrono::Utc;
use contracts::domain::a001_category::Category;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a001_category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub parent_id: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Category {
    fn from(m: Model) -> Self {
        Category {
            id: m.id,
            code: m.code,
            name: m.name,
            description: m.description,
            image: m.image,
            parent_id: m.parent_id,
            is_active: m.is_active,
            sort_order: m.sort_order,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn ordered(select: Select<Entity>) -> Select<Entity> {
    select
        .order_by_asc(Column::SortOrder)
        .order_by_asc(Column::Name)
        .order_by_asc(Column::Id)
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Category>, DbErr> {
    let items = ordered(Entity::find()).all(db).await?;
    Ok(items.into_iter().map(Into::into).collect())
}

/// Основные категории (без родителя), включая неактивные
pub async fn list_main(db: &DatabaseConnection) -> Result<Vec<Category>, DbErr> {
    let items = ordered(Entity::find().filter(Column::ParentId.is_null()))
        .all(db)
        .await?;
    Ok(items.into_iter().map(Into::into).collect())
}

/// Подкатегории (с родителем), включая неактивные
pub async fn list_sub(db: &DatabaseConnection) -> Result<Vec<Category>, DbErr> {
    let items = ordered(Entity::find().filter(Column::ParentId.is_not_null()))
        .all(db)
        .await?;
    Ok(items.into_iter().map(Into::into).collect())
}

pub async fn get_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<Category>, DbErr> {
    let result = Entity::find_by_id(id.to_string()).one(db).await?;
    Ok(result.map(Into::into))
}

pub async fn count_children(db: &DatabaseConnection, id: &str) -> Result<u64, DbErr> {
    Entity::find()
        .filter(Column::ParentId.eq(id))
        .count(db)
        .await
}

/// Вставка или полная замена записи по id; `created_at` сохраняется
pub async fn upsert(db: &DatabaseConnection, category: &Category) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(category.id.clone()),
        code: Set(category.code.clone()),
        name: Set(category.name.clone()),
        description: Set(category.description.clone()),
        image: Set(category.image.clone()),
        parent_id: Set(category.parent_id.clone()),
        is_active: Set(category.is_active),
        sort_order: Set(category.sort_order),
        created_at: Set(category.created_at),
        updated_at: Set(category.updated_at),
    };
    Entity::insert(active)
        .on_conflict(
            OnConflict::column(Column::Id)
                .update_columns([
                    Column::Code,
                    Column::Name,
                    Column::Description,
                    Column::Image,
                    Column::ParentId,
                    Column::IsActive,
                    Column::SortOrder,
                    Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Снять категорию с витрины (is_active = false)
pub async fn deactivate(db: &DatabaseConnection, id: &str) -> Result<bool, DbErr> {
    let result = Entity::update_many()
        .col_expr(Column::IsActive, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    fn category(id: &str, parent: Option<&str>) -> Category {
        Category {
            id: id.into(),
            code: id.into(),
            name: id.to_uppercase(),
            description: String::new(),
            image: None,
            parent_id: parent.map(Into::into),
            is_active: true,
            sort_order: 0,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_main_and_sub_lists_are_split_by_parent() {
        let db = test_connection().await;
        upsert(&db, &category("cat-a", None)).await.unwrap();
        upsert(&db, &category("cat-b", None)).await.unwrap();
        upsert(&db, &category("sub-1", Some("cat-a"))).await.unwrap();

        let mains = list_main(&db).await.unwrap();
        let subs = list_sub(&db).await.unwrap();
        assert_eq!(mains.len(), 2);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].parent_id.as_deref(), Some("cat-a"));
        assert_eq!(count_children(&db, "cat-a").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_deactivate_hides() {
        let db = test_connection().await;
        let mut cat = category("cat-a", None);
        upsert(&db, &cat).await.unwrap();

        cat.name = "Обувь".into();
        upsert(&db, &cat).await.unwrap();
        assert_eq!(list_all(&db).await.unwrap().len(), 1);
        assert_eq!(get_by_id(&db, "cat-a").await.unwrap().unwrap().name, "Обувь");

        assert!(deactivate(&db, "cat-a").await.unwrap());
        assert!(!get_by_id(&db, "cat-a").await.unwrap().unwrap().is_active);
        assert!(!deactivate(&db, "missing").await.unwrap());
    }
}
