use contracts::domain::a001_category::CatalogSnapshot;
use contracts::domain::a002_page_section::{
    DisplayCategory, DisplayPayload, DisplaySubcategory, EntryKind, PageSectionConfig,
    SectionEntry,
};

/// Включённые записи нужного вида в порядке отображения
fn enabled_in_order<'a>(
    entries: &'a [SectionEntry],
    keep: impl Fn(&SectionEntry) -> bool,
) -> Vec<&'a SectionEntry> {
    let mut picked: Vec<(usize, &SectionEntry)> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.enabled && keep(*e))
        .collect();
    picked.sort_by_key(|(pos, e)| (e.order, *pos));
    picked.into_iter().map(|(_, e)| e).collect()
}

/// Собрать данные витрины из конфигурации и снимка каталога.
///
/// Записи, которых нет в каталоге или которые неактивны, пропускаются.
/// Лимит применяется к основным категориям после разрешения ссылок.
pub fn build_display_payload(
    config: &PageSectionConfig,
    catalog: &CatalogSnapshot,
) -> DisplayPayload {
    if !config.enabled {
        return DisplayPayload::disabled(&config.page_id, config.layout);
    }

    let mains = enabled_in_order(&config.entries, |e| e.kind == EntryKind::Main);
    let limit = config.display_limit().unwrap_or(usize::MAX);

    let resolved = mains.into_iter().filter_map(|entry| {
        let category = catalog.resolve_main(&entry.category_id);
        if category.is_none() {
            tracing::debug!(
                "Page {}: skipping stale category {}",
                config.page_id,
                entry.category_id
            );
        }
        category
    });

    let categories = resolved
        .take(limit)
        .enumerate()
        .map(|(index, category)| DisplayCategory {
            id: category.id.clone(),
            name: category.name.clone(),
            description: category.description.clone(),
            image: category.image.clone(),
            order: index as u32,
            subcategories: if config.show_subcategories_on_hover {
                resolve_subcategories(config, catalog, &category.id)
            } else {
                Vec::new()
            },
        })
        .collect();

    DisplayPayload {
        page_id: config.page_id.clone(),
        enabled: true,
        layout: config.layout,
        show_subcategories_on_hover: config.show_subcategories_on_hover,
        categories,
    }
}

fn resolve_subcategories(
    config: &PageSectionConfig,
    catalog: &CatalogSnapshot,
    parent_id: &str,
) -> Vec<DisplaySubcategory> {
    enabled_in_order(&config.entries, |e| {
        e.kind == EntryKind::Subcategory && e.parent_id.as_deref() == Some(parent_id)
    })
    .into_iter()
    .filter_map(|entry| {
        let sub = catalog.resolve_sub(&entry.category_id, parent_id);
        if sub.is_none() {
            tracing::debug!(
                "Page {}: skipping stale subcategory {}",
                config.page_id,
                entry.category_id
            );
        }
        sub
    })
    .enumerate()
    .map(|(index, sub)| DisplaySubcategory {
        id: sub.id.clone(),
        name: sub.name.clone(),
        description: sub.description.clone(),
        image: sub.image.clone(),
        order: index as u32,
    })
    .collect()
}
