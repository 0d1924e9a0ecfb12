use serde::{Deserialize, Serialize};

// ============================================================================
// Read model
// ============================================================================

/// Категория каталога
///
/// `parent_id == None` означает основную категорию, иначе подкатегорию.
/// Каталог принадлежит внешнему сервису; ядро читает его только на чтение.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "sortOrder", default)]
    pub sort_order: i32,
    #[serde(rename = "createdAt")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Category {
    pub fn is_main(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("ID категории не может быть пустым".into());
        }
        if self.name.trim().is_empty() {
            return Err("Название не может быть пустым".into());
        }
        if self.parent_id.as_deref() == Some(self.id.as_str()) {
            return Err("Категория не может быть родителем самой себя".into());
        }
        Ok(())
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления категории
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CategoryDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
    #[serde(rename = "sortOrder", default)]
    pub sort_order: i32,
}

fn default_true() -> bool {
    true
}
