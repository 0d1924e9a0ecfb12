use chrono::Utc;
use contracts::domain::a001_category::CatalogSnapshot;
use contracts::domain::a002_page_section::{
    validate_entries, CategorySelection, DisplayPayload, PageSectionConfig, SaveSectionRequest,
    SectionEditorState, SelectionLimits, SelectionRules,
};
use sea_orm::DatabaseConnection;

use super::error::PageSectionError;
use super::{render, repository};
use crate::domain::a001_category::catalog::CategoryCatalog;
use crate::shared::logger;

const LOG_SOURCE: &str = "server";
const LOG_CATEGORY: &str = "page_section";

/// Получить конфигурацию страницы, создав её со значениями по умолчанию
pub async fn load(
    db: &DatabaseConnection,
    page_id: &str,
) -> Result<PageSectionConfig, PageSectionError> {
    let default = PageSectionConfig::new_default(page_id, Utc::now());
    repository::insert_if_missing(db, &default).await?;
    Ok(repository::find(db, page_id).await?.unwrap_or(default))
}

/// Проверить и сохранить записи секции целиком.
///
/// При ошибке валидации сохранённая конфигурация не меняется.
/// Флаг `enabled` не трогается, им управляет [`set_enabled`].
pub async fn save(
    db: &DatabaseConnection,
    limits: &SelectionLimits,
    page_id: &str,
    request: SaveSectionRequest,
) -> Result<PageSectionConfig, PageSectionError> {
    if let Err(e) = validate_entries(&request.entries, limits) {
        tracing::warn!("Page {}: save rejected: {}", page_id, e);
        return Err(e.into());
    }

    let meta = request.meta;
    let config = PageSectionConfig {
        page_id: page_id.to_string(),
        enabled: true,
        max_categories_to_display: meta.max_categories_to_display,
        layout: meta.layout,
        show_subcategories_on_hover: meta.show_subcategories_on_hover,
        entries: request.entries,
        modified_by: meta.modified_by,
        last_modified: Utc::now(),
    };
    repository::upsert_content(db, &config).await?;

    tracing::info!(
        "Page {}: section saved ({} entries, by {:?})",
        page_id,
        config.entries.len(),
        config.modified_by
    );
    logger::record(
        db,
        LOG_SOURCE,
        LOG_CATEGORY,
        &format!("{} saved: {} entries", page_id, config.entries.len()),
    )
    .await;

    Ok(repository::find(db, page_id).await?.unwrap_or(config))
}

/// Данные витрины. Только чтение: отсутствующая запись даёт значения по умолчанию.
pub async fn render(
    db: &DatabaseConnection,
    catalog: &dyn CategoryCatalog,
    page_id: &str,
) -> Result<DisplayPayload, PageSectionError> {
    let config = repository::find(db, page_id)
        .await?
        .unwrap_or_else(|| PageSectionConfig::new_default(page_id, Utc::now()));

    if !config.enabled {
        return Ok(DisplayPayload::disabled(page_id, config.layout));
    }

    let snapshot = snapshot_of(catalog).await?;
    Ok(render::build_display_payload(&config, &snapshot))
}

/// Включить/выключить секцию, не трогая записи и без валидации
pub async fn set_enabled(
    db: &DatabaseConnection,
    page_id: &str,
    enabled: bool,
) -> Result<PageSectionConfig, PageSectionError> {
    let now = Utc::now();
    repository::insert_if_missing(db, &PageSectionConfig::new_default(page_id, now)).await?;
    repository::set_enabled(db, page_id, enabled, now).await?;

    tracing::info!("Page {}: section enabled = {}", page_id, enabled);
    logger::record(
        db,
        LOG_SOURCE,
        LOG_CATEGORY,
        &format!("{} enabled = {}", page_id, enabled),
    )
    .await;

    load(db, page_id).await
}

/// Состояние редактора: конфигурация, активные категории и выбор,
/// восстановленный по текущему каталогу
pub async fn editor_state(
    db: &DatabaseConnection,
    catalog: &dyn CategoryCatalog,
    rules: SelectionRules,
    page_id: &str,
) -> Result<SectionEditorState, PageSectionError> {
    let config = load(db, page_id).await?;
    let snapshot = snapshot_of(catalog).await?;
    let selection = CategorySelection::hydrate(rules, &config.entries, &snapshot);
    tracing::debug!(
        "Page {}: editor opened ({} mains, {} subs in catalog, {} mains selected)",
        page_id,
        snapshot.main_count(),
        snapshot.sub_count(),
        selection.selected_main_count()
    );

    let main_categories: Vec<_> = snapshot.active_mains().into_iter().cloned().collect();
    let subcategories = main_categories
        .iter()
        .flat_map(|main| snapshot.active_subs_of(&main.id))
        .cloned()
        .collect();

    Ok(SectionEditorState {
        config,
        rules,
        main_categories,
        subcategories,
        selection,
    })
}

async fn snapshot_of(catalog: &dyn CategoryCatalog) -> Result<CatalogSnapshot, PageSectionError> {
    crate::domain::a001_category::catalog::load_snapshot(catalog)
        .await
        .map_err(PageSectionError::Catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;
    use crate::shared::logger::repository as log_repository;
    use async_trait::async_trait;
    use contracts::domain::a001_category::Category;
    use contracts::domain::a002_page_section::{SectionEntry, SectionMeta, ValidationRule};
    use contracts::enums::section_layout::SectionLayout;

    fn category(id: &str, parent: Option<&str>) -> Category {
        Category {
            id: id.into(),
            code: id.into(),
            name: format!("Name {}", id),
            description: format!("About {}", id),
            image: None,
            parent_id: parent.map(Into::into),
            is_active: true,
            sort_order: 0,
            created_at: None,
            updated_at: None,
        }
    }

    struct FakeCatalog {
        mains: Vec<Category>,
        subs: Vec<Category>,
    }

    impl FakeCatalog {
        fn standard() -> Self {
            Self {
                mains: vec![
                    category("cat-A", None),
                    category("cat-B", None),
                    category("cat-C", None),
                ],
                subs: vec![
                    category("sub-1", Some("cat-A")),
                    category("sub-2", Some("cat-A")),
                    category("sub-3", Some("cat-B")),
                ],
            }
        }
    }

    #[async_trait]
    impl CategoryCatalog for FakeCatalog {
        async fn list_main_categories(&self) -> anyhow::Result<Vec<Category>> {
            Ok(self.mains.clone())
        }

        async fn list_subcategories(&self) -> anyhow::Result<Vec<Category>> {
            Ok(self.subs.clone())
        }
    }

    struct FailingCatalog;

    #[async_trait]
    impl CategoryCatalog for FailingCatalog {
        async fn list_main_categories(&self) -> anyhow::Result<Vec<Category>> {
            Err(anyhow::anyhow!("catalog unavailable"))
        }

        async fn list_subcategories(&self) -> anyhow::Result<Vec<Category>> {
            Err(anyhow::anyhow!("catalog unavailable"))
        }
    }

    fn request(entries: Vec<SectionEntry>) -> SaveSectionRequest {
        SaveSectionRequest {
            entries,
            meta: SectionMeta {
                max_categories_to_display: 0,
                layout: SectionLayout::Carousel,
                show_subcategories_on_hover: true,
                modified_by: Some("admin".into()),
            },
        }
    }

    #[tokio::test]
    async fn test_load_creates_default_once() {
        let db = test_connection().await;
        let first = load(&db, "home").await.unwrap();
        assert!(first.enabled);
        assert!(first.entries.is_empty());
        assert_eq!(first.layout, SectionLayout::Grid);

        let second = load(&db, "home").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_save_replaces_entries() {
        let db = test_connection().await;
        let limits = SelectionLimits::default();
        save(
            &db,
            &limits,
            "home",
            request(vec![
                SectionEntry::main("cat-A", true, 0),
                SectionEntry::sub("sub-1", "cat-A", true, 0),
            ]),
        )
        .await
        .unwrap();

        let saved = save(
            &db,
            &limits,
            "home",
            request(vec![SectionEntry::main("cat-B", true, 0)]),
        )
        .await
        .unwrap();

        assert_eq!(saved.entries, vec![SectionEntry::main("cat-B", true, 0)]);
        assert_eq!(saved.layout, SectionLayout::Carousel);
        assert_eq!(saved.modified_by.as_deref(), Some("admin"));
        assert_eq!(load(&db, "home").await.unwrap(), saved);

        let logs = log_repository::list_recent(&db, Some(LOG_CATEGORY), 10).await.unwrap();
        assert_eq!(logs.len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_save_leaves_row_unchanged() {
        let db = test_connection().await;
        let limits = SelectionLimits::default();
        save(
            &db,
            &limits,
            "home",
            request(vec![SectionEntry::main("cat-A", true, 0)]),
        )
        .await
        .unwrap();
        let before = repository::find_model(&db, "home").await.unwrap();

        let result = save(
            &db,
            &limits,
            "home",
            request(vec![
                SectionEntry::main("cat-A", true, 0),
                SectionEntry::main("cat-A", true, 1),
            ]),
        )
        .await;

        match result {
            Err(PageSectionError::Validation(e)) => {
                assert_eq!(e.rule, ValidationRule::Duplicate);
                assert_eq!(e.detail, "cat-A");
            }
            other => panic!("expected duplicate rejection, got {:?}", other),
        }
        assert_eq!(repository::find_model(&db, "home").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_rejected_save_on_new_page_creates_nothing() {
        let db = test_connection().await;
        let result = save(&db, &SelectionLimits::default(), "home", request(vec![])).await;
        assert!(matches!(result, Err(PageSectionError::Validation(_))));
        assert!(repository::find_model(&db, "home").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_render_omits_deleted_category() {
        let db = test_connection().await;
        save(
            &db,
            &SelectionLimits::default(),
            "home",
            request(vec![
                SectionEntry::main("cat-X", true, 0),
                SectionEntry::main("cat-A", true, 1),
                SectionEntry::sub("sub-2", "cat-A", true, 0),
                SectionEntry::sub("sub-1", "cat-A", true, 1),
            ]),
        )
        .await
        .unwrap();

        let payload = render(&db, &FakeCatalog::standard(), "home").await.unwrap();
        assert!(payload.enabled);
        assert_eq!(payload.layout, SectionLayout::Carousel);
        assert_eq!(payload.categories.len(), 1);
        let cat = &payload.categories[0];
        assert_eq!(cat.id, "cat-A");
        assert_eq!(cat.description, "About cat-A");
        let subs: Vec<_> = cat.subcategories.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(subs, vec!["sub-2", "sub-1"]);
    }

    #[tokio::test]
    async fn test_render_disabled_skips_catalog() {
        let db = test_connection().await;
        save(
            &db,
            &SelectionLimits::default(),
            "home",
            request(vec![SectionEntry::main("cat-A", true, 0)]),
        )
        .await
        .unwrap();
        set_enabled(&db, "home", false).await.unwrap();

        let payload = render(&db, &FailingCatalog, "home").await.unwrap();
        assert!(!payload.enabled);
        assert!(payload.categories.is_empty());
    }

    #[tokio::test]
    async fn test_render_is_read_only_and_propagates_catalog_errors() {
        let db = test_connection().await;
        let payload = render(&db, &FakeCatalog::standard(), "fresh").await.unwrap();
        assert!(payload.enabled);
        assert!(payload.categories.is_empty());
        assert!(repository::find_model(&db, "fresh").await.unwrap().is_none());

        let result = render(&db, &FailingCatalog, "fresh").await;
        assert!(matches!(result, Err(PageSectionError::Catalog(_))));
    }

    #[tokio::test]
    async fn test_set_enabled_keeps_entries_and_skips_validation() {
        let db = test_connection().await;
        save(
            &db,
            &SelectionLimits::default(),
            "home",
            request(vec![SectionEntry::main("cat-A", true, 0)]),
        )
        .await
        .unwrap();
        // Хранимая конфигурация становится невалидной при более строгих лимитах
        let strict = SelectionLimits {
            min_main: 2,
            ..SelectionLimits::default()
        };
        let stored = load(&db, "home").await.unwrap();
        assert!(validate_entries(&stored.entries, &strict).is_err());

        let disabled = set_enabled(&db, "home", false).await.unwrap();
        assert!(!disabled.enabled);
        assert_eq!(disabled.entries, stored.entries);

        let enabled = set_enabled(&db, "home", true).await.unwrap();
        assert!(enabled.enabled);
    }

    #[tokio::test]
    async fn test_save_keeps_disabled_flag() {
        let db = test_connection().await;
        set_enabled(&db, "home", false).await.unwrap();
        let saved = save(
            &db,
            &SelectionLimits::default(),
            "home",
            request(vec![SectionEntry::main("cat-A", true, 0)]),
        )
        .await
        .unwrap();
        assert!(!saved.enabled);
    }

    #[tokio::test]
    async fn test_save_keeps_large_display_limit() {
        let db = test_connection().await;
        let mut req = request(vec![SectionEntry::main("cat-A", true, 0)]);
        req.meta.max_categories_to_display = 3_000_000_000;
        save(&db, &SelectionLimits::default(), "home", req)
            .await
            .unwrap();

        let stored = load(&db, "home").await.unwrap();
        assert_eq!(stored.max_categories_to_display, 3_000_000_000);
        assert!(stored.display_limit().is_some());
    }

    #[tokio::test]
    async fn test_save_without_meta_keeps_hover_default() {
        let db = test_connection().await;
        let req: SaveSectionRequest = serde_json::from_str(
            r#"{"entries":[{"categoryId":"cat-A","enabled":true,"order":0,"kind":"main"}]}"#,
        )
        .unwrap();
        let saved = save(&db, &SelectionLimits::default(), "home", req)
            .await
            .unwrap();

        let defaults = PageSectionConfig::new_default("home", Utc::now());
        assert_eq!(
            saved.show_subcategories_on_hover,
            defaults.show_subcategories_on_hover
        );
        assert_eq!(saved.layout, defaults.layout);
    }

    #[tokio::test]
    async fn test_editor_state_hydrates_against_catalog() {
        let db = test_connection().await;
        save(
            &db,
            &SelectionLimits::default(),
            "home",
            request(vec![
                SectionEntry::main("cat-B", true, 0),
                SectionEntry::main("cat-gone", true, 1),
                SectionEntry::main("cat-A", true, 2),
                SectionEntry::sub("sub-1", "cat-A", true, 0),
            ]),
        )
        .await
        .unwrap();

        let state = editor_state(
            &db,
            &FakeCatalog::standard(),
            SelectionRules::default(),
            "home",
        )
        .await
        .unwrap();

        assert_eq!(state.selection.selected_main_ids(), vec!["cat-B", "cat-A"]);
        assert!(state.selection.is_sub_selected("sub-1", "cat-A"));
        assert_eq!(state.main_categories.len(), 3);
        assert_eq!(state.subcategories.len(), 3);
        assert_eq!(state.config.entries.len(), 4);
    }
}
