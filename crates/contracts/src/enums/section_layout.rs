use serde::{Deserialize, Serialize};

/// Способ отображения секции категорий на витрине
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SectionLayout {
    #[default]
    Grid,
    Carousel,
    List,
}

impl SectionLayout {
    /// Код для хранения в БД
    pub fn code(&self) -> &'static str {
        match self {
            SectionLayout::Grid => "grid",
            SectionLayout::Carousel => "carousel",
            SectionLayout::List => "list",
        }
    }

    /// Человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            SectionLayout::Grid => "Сетка",
            SectionLayout::Carousel => "Карусель",
            SectionLayout::List => "Список",
        }
    }

    pub fn all() -> Vec<SectionLayout> {
        vec![
            SectionLayout::Grid,
            SectionLayout::Carousel,
            SectionLayout::List,
        ]
    }

    /// Парсинг из кода БД
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "grid" => Some(SectionLayout::Grid),
            "carousel" => Some(SectionLayout::Carousel),
            "list" => Some(SectionLayout::List),
            _ => None,
        }
    }
}

impl std::fmt::Display for SectionLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        for layout in SectionLayout::all() {
            assert_eq!(SectionLayout::from_code(layout.code()), Some(layout));
        }
        assert_eq!(SectionLayout::from_code("masonry"), None);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&SectionLayout::Carousel).unwrap();
        assert_eq!(json, "\"carousel\"");
    }
}
