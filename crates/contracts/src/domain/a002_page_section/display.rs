use serde::{Deserialize, Serialize};

use crate::enums::section_layout::SectionLayout;

/// Данные секции категорий для витрины.
///
/// Вычисляется при каждом чтении и никогда не сохраняется.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPayload {
    pub page_id: String,
    pub enabled: bool,
    pub layout: SectionLayout,
    pub show_subcategories_on_hover: bool,
    pub categories: Vec<DisplayCategory>,
}

impl DisplayPayload {
    /// Отключённая секция: пустой список независимо от записей
    pub fn disabled(page_id: impl Into<String>, layout: SectionLayout) -> Self {
        Self {
            page_id: page_id.into(),
            enabled: false,
            layout,
            show_subcategories_on_hover: false,
            categories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayCategory {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub order: u32,
    pub subcategories: Vec<DisplaySubcategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySubcategory {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub order: u32,
}
