use async_trait::async_trait;
use contracts::domain::a001_category::{CatalogSnapshot, Category};
use sea_orm::DatabaseConnection;

use super::repository;

/// Источник категорий для секций страниц.
///
/// Каталог внешний по отношению к секциям: ядро только читает плоские
/// списки и строит из них [`CatalogSnapshot`].
#[async_trait]
pub trait CategoryCatalog: Send + Sync {
    async fn list_main_categories(&self) -> anyhow::Result<Vec<Category>>;
    async fn list_subcategories(&self) -> anyhow::Result<Vec<Category>>;
}

/// Каталог поверх таблицы `a001_category`
#[derive(Clone)]
pub struct SqliteCategoryCatalog {
    db: DatabaseConnection,
}

impl SqliteCategoryCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryCatalog for SqliteCategoryCatalog {
    async fn list_main_categories(&self) -> anyhow::Result<Vec<Category>> {
        Ok(repository::list_main(&self.db).await?)
    }

    async fn list_subcategories(&self) -> anyhow::Result<Vec<Category>> {
        Ok(repository::list_sub(&self.db).await?)
    }
}

/// Снимок каталога на время одного чтения
pub async fn load_snapshot(catalog: &dyn CategoryCatalog) -> anyhow::Result<CatalogSnapshot> {
    let mains = catalog.list_main_categories().await?;
    let subs = catalog.list_subcategories().await?;
    Ok(CatalogSnapshot::new(mains, subs))
}
