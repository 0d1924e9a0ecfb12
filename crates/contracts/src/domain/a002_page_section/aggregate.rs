use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::selection::{CategorySelection, SelectionRules};
use crate::domain::a001_category::Category;
use crate::enums::section_layout::SectionLayout;

// ============================================================================
// Entries
// ============================================================================

/// Вид записи в конфигурации секции
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Main,
    Subcategory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Main => "main",
            EntryKind::Subcategory => "subcategory",
        }
    }
}

/// Плоская запись конфигурации: основная категория или подкатегория.
///
/// `order` задаёт порядок среди соседей: основных категорий между собой,
/// подкатегорий внутри одного родителя.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionEntry {
    pub category_id: String,
    pub enabled: bool,
    pub order: u32,
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl SectionEntry {
    pub fn main(category_id: impl Into<String>, enabled: bool, order: u32) -> Self {
        Self {
            category_id: category_id.into(),
            enabled,
            order,
            kind: EntryKind::Main,
            parent_id: None,
        }
    }

    pub fn sub(
        category_id: impl Into<String>,
        parent_id: impl Into<String>,
        enabled: bool,
        order: u32,
    ) -> Self {
        Self {
            category_id: category_id.into(),
            enabled,
            order,
            kind: EntryKind::Subcategory,
            parent_id: Some(parent_id.into()),
        }
    }
}

// ============================================================================
// Persisted document
// ============================================================================

/// Конфигурация секции категорий для страницы (одна на страницу)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSectionConfig {
    pub page_id: String,
    pub enabled: bool,
    /// 0 = без ограничения
    pub max_categories_to_display: u32,
    pub layout: SectionLayout,
    pub show_subcategories_on_hover: bool,
    pub entries: Vec<SectionEntry>,
    #[serde(default)]
    pub modified_by: Option<String>,
    pub last_modified: DateTime<Utc>,
}

impl PageSectionConfig {
    /// Конфигурация по умолчанию для страницы, которую ещё ни разу не сохраняли
    pub fn new_default(page_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            page_id: page_id.into(),
            enabled: true,
            max_categories_to_display: 0,
            layout: SectionLayout::Grid,
            show_subcategories_on_hover: true,
            entries: Vec::new(),
            modified_by: None,
            last_modified: now,
        }
    }

    /// Лимит отображения, `None` если без ограничения
    pub fn display_limit(&self) -> Option<usize> {
        match self.max_categories_to_display {
            0 => None,
            n => Some(n as usize),
        }
    }
}

// ============================================================================
// Requests / Responses
// ============================================================================

/// Настройки секции, сохраняемые вместе с записями.
///
/// Отсутствующие поля получают те же значения, что и
/// [`PageSectionConfig::new_default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionMeta {
    pub max_categories_to_display: u32,
    pub layout: SectionLayout,
    pub show_subcategories_on_hover: bool,
    pub modified_by: Option<String>,
}

impl Default for SectionMeta {
    fn default() -> Self {
        Self {
            max_categories_to_display: 0,
            layout: SectionLayout::Grid,
            show_subcategories_on_hover: true,
            modified_by: None,
        }
    }
}

/// PUT /api/page-sections/:page_id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSectionRequest {
    pub entries: Vec<SectionEntry>,
    #[serde(default)]
    pub meta: SectionMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSectionResponse {
    pub success: bool,
    pub message: String,
    pub last_modified: DateTime<Utc>,
}

/// PATCH /api/page-sections/:page_id/enabled
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// Всё, что нужно редактору при открытии: сохранённая конфигурация,
/// доступные категории и восстановленное состояние выбора.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionEditorState {
    pub config: PageSectionConfig,
    pub rules: SelectionRules,
    pub main_categories: Vec<Category>,
    pub subcategories: Vec<Category>,
    pub selection: CategorySelection,
}
