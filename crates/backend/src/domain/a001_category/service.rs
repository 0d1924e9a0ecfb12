use super::repository;
use chrono::Utc;
use contracts::domain::a001_category::{Category, CategoryDto};
use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Validation failed: {0}")]
    Invalid(String),
    #[error("Category not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] DbErr),
}

/// Создание или обновление категории.
///
/// Новая запись получает id/код, если они не заданы. Родитель должен
/// существовать и быть основной категорией; основная категория с
/// подкатегориями не может сама стать подкатегорией.
pub async fn upsert(db: &DatabaseConnection, dto: CategoryDto) -> Result<String, CategoryError> {
    let id = dto
        .id
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let existing = repository::get_by_id(db, &id).await?;
    let now = Utc::now();

    let category = Category {
        code: dto
            .code
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| existing.as_ref().map(|c| c.code.clone()))
            .unwrap_or_else(|| format!("CAT-{}", id.chars().take(8).collect::<String>())),
        id: id.clone(),
        name: dto.name,
        description: dto.description,
        image: dto.image,
        parent_id: dto.parent_id.filter(|s| !s.trim().is_empty()),
        is_active: dto.is_active,
        sort_order: dto.sort_order,
        created_at: existing.as_ref().and_then(|c| c.created_at).or(Some(now)),
        updated_at: Some(now),
    };

    category.validate().map_err(CategoryError::Invalid)?;

    if let Some(parent_id) = category.parent_id.as_deref() {
        let parent = repository::get_by_id(db, parent_id)
            .await?
            .ok_or_else(|| CategoryError::Invalid(format!("Родитель {} не найден", parent_id)))?;
        if !parent.is_main() {
            return Err(CategoryError::Invalid(format!(
                "Родитель {} сам является подкатегорией",
                parent_id
            )));
        }
        if repository::count_children(db, &id).await? > 0 {
            return Err(CategoryError::Invalid(format!(
                "Категория {} имеет подкатегории и не может стать подкатегорией",
                id
            )));
        }
    }

    repository::upsert(db, &category).await?;
    tracing::info!("Category {} saved (parent: {:?})", id, category.parent_id);
    Ok(id)
}

/// Мягкое удаление: категория остаётся в базе, но пропадает с витрины
pub async fn deactivate(db: &DatabaseConnection, id: &str) -> Result<(), CategoryError> {
    if repository::deactivate(db, id).await? {
        tracing::info!("Category {} deactivated", id);
        Ok(())
    } else {
        Err(CategoryError::NotFound(id.to_string()))
    }
}

pub async fn get_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<Category>, DbErr> {
    repository::get_by_id(db, id).await
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Category>, DbErr> {
    repository::list_all(db).await
}

pub async fn list_main(db: &DatabaseConnection) -> Result<Vec<Category>, DbErr> {
    repository::list_main(db).await
}

pub async fn list_sub(db: &DatabaseConnection) -> Result<Vec<Category>, DbErr> {
    repository::list_sub(db).await
}

/// Вставка тестовых данных: три основные категории с подкатегориями
pub async fn insert_test_data(db: &DatabaseConnection) -> Result<(), CategoryError> {
    let mains = [
        ("cat-electronics", "ELEC", "Электроника", 1),
        ("cat-clothing", "CLTH", "Одежда", 2),
        ("cat-home", "HOME", "Дом и сад", 3),
    ];
    let subs = [
        ("sub-phones", "cat-electronics", "Смартфоны", 1),
        ("sub-laptops", "cat-electronics", "Ноутбуки", 2),
        ("sub-audio", "cat-electronics", "Аудиотехника", 3),
        ("sub-men", "cat-clothing", "Мужская одежда", 1),
        ("sub-women", "cat-clothing", "Женская одежда", 2),
        ("sub-garden", "cat-home", "Сад", 1),
    ];

    for (id, code, name, sort_order) in mains {
        upsert(
            db,
            CategoryDto {
                id: Some(id.into()),
                code: Some(code.into()),
                name: name.into(),
                is_active: true,
                sort_order,
                ..Default::default()
            },
        )
        .await?;
    }

    for (id, parent, name, sort_order) in subs {
        upsert(
            db,
            CategoryDto {
                id: Some(id.into()),
                name: name.into(),
                parent_id: Some(parent.into()),
                is_active: true,
                sort_order,
                ..Default::default()
            },
        )
        .await?;
    }

    Ok(())
}
