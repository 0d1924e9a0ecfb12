use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::aggregate::{EntryKind, SectionEntry};

/// Минимум выбранных основных категорий
pub const MIN_MAIN: usize = 1;
/// Максимум выбранных основных категорий
pub const MAX_MAIN: usize = 10;
/// Максимум выбранных подкатегорий у одной основной категории
pub const MAX_SUB_PER_MAIN: usize = 10;

/// Cardinality limits shared by the editor and the save path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionLimits {
    pub min_main: usize,
    pub max_main: usize,
    pub max_sub_per_main: usize,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            min_main: MIN_MAIN,
            max_main: MAX_MAIN,
            max_sub_per_main: MAX_SUB_PER_MAIN,
        }
    }
}

impl SelectionLimits {
    /// Limits are usable only when `min_main <= max_main`.
    pub fn check(&self) -> Result<(), String> {
        if self.min_main > self.max_main {
            return Err(format!(
                "min_main ({}) не может превышать max_main ({})",
                self.min_main, self.max_main
            ));
        }
        Ok(())
    }
}

/// Нарушенное правило сохранения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    /// Повтор categoryId в пределах одного вида записей
    Duplicate,
    /// Число выбранных основных категорий вне допустимого диапазона
    MainCount,
    /// Слишком много выбранных подкатегорий у одного родителя
    SubCount,
    /// Подкатегория ссылается на отсутствующую основную запись
    OrphanSubcategory,
    /// Основная запись с parentId
    MalformedEntry,
}

impl ValidationRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationRule::Duplicate => "duplicate",
            ValidationRule::MainCount => "main_count",
            ValidationRule::SubCount => "sub_count",
            ValidationRule::OrphanSubcategory => "orphan_subcategory",
            ValidationRule::MalformedEntry => "malformed_entry",
        }
    }
}

impl std::fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ошибка валидации при сохранении; отдаётся клиенту как есть.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{rule}: {detail}")]
pub struct ValidationError {
    pub rule: ValidationRule,
    pub detail: String,
}

impl ValidationError {
    pub fn new(rule: ValidationRule, detail: impl Into<String>) -> Self {
        Self {
            rule,
            detail: detail.into(),
        }
    }
}

/// Проверка набора записей перед сохранением.
///
/// Порядок проверок фиксирован: дубликаты, структура записей, ссылки на
/// родителя, число основных категорий, число подкатегорий. Возвращается
/// первое найденное нарушение.
pub fn validate_entries(
    entries: &[SectionEntry],
    limits: &SelectionLimits,
) -> Result<(), ValidationError> {
    let mut seen: HashSet<(EntryKind, &str)> = HashSet::new();
    for entry in entries {
        if !seen.insert((entry.kind, entry.category_id.as_str())) {
            return Err(ValidationError::new(
                ValidationRule::Duplicate,
                entry.category_id.clone(),
            ));
        }
    }

    let main_ids: HashSet<&str> = entries
        .iter()
        .filter(|e| e.kind == EntryKind::Main)
        .map(|e| e.category_id.as_str())
        .collect();

    for entry in entries {
        match (entry.kind, entry.parent_id.as_deref()) {
            (EntryKind::Main, Some(_)) => {
                return Err(ValidationError::new(
                    ValidationRule::MalformedEntry,
                    entry.category_id.clone(),
                ));
            }
            (EntryKind::Subcategory, None) => {
                return Err(ValidationError::new(
                    ValidationRule::OrphanSubcategory,
                    entry.category_id.clone(),
                ));
            }
            (EntryKind::Subcategory, Some(parent)) if !main_ids.contains(parent) => {
                return Err(ValidationError::new(
                    ValidationRule::OrphanSubcategory,
                    entry.category_id.clone(),
                ));
            }
            _ => {}
        }
    }

    let selected_mains = entries
        .iter()
        .filter(|e| e.kind == EntryKind::Main && e.enabled)
        .count();
    if selected_mains < limits.min_main || selected_mains > limits.max_main {
        return Err(ValidationError::new(
            ValidationRule::MainCount,
            format!(
                "выбрано {}, допустимо от {} до {}",
                selected_mains, limits.min_main, limits.max_main
            ),
        ));
    }

    // Порядок родителей берём из записей, чтобы ошибка была детерминированной
    let mut per_parent: HashMap<&str, usize> = HashMap::new();
    for entry in entries
        .iter()
        .filter(|e| e.kind == EntryKind::Subcategory && e.enabled)
    {
        if let Some(parent) = entry.parent_id.as_deref() {
            let count = per_parent.entry(parent).or_insert(0);
            *count += 1;
            if *count > limits.max_sub_per_main {
                return Err(ValidationError::new(
                    ValidationRule::SubCount,
                    parent.to_string(),
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mains(n: usize) -> Vec<SectionEntry> {
        (0..n)
            .map(|i| SectionEntry::main(format!("cat-{}", i), true, i as u32))
            .collect()
    }

    #[test]
    fn test_duplicate_main_is_rejected() {
        let entries = vec![
            SectionEntry::main("cat-A", true, 0),
            SectionEntry::main("cat-A", true, 1),
        ];
        let err = validate_entries(&entries, &SelectionLimits::default()).unwrap_err();
        assert_eq!(err, ValidationError::new(ValidationRule::Duplicate, "cat-A"));
    }

    #[test]
    fn test_same_id_in_different_kinds_is_not_a_duplicate() {
        let entries = vec![
            SectionEntry::main("cat-A", true, 0),
            SectionEntry::sub("cat-A", "cat-A", true, 0),
        ];
        assert!(validate_entries(&entries, &SelectionLimits::default()).is_ok());
    }

    #[test]
    fn test_main_count_bounds() {
        let limits = SelectionLimits::default();
        let err = validate_entries(&[], &limits).unwrap_err();
        assert_eq!(err.rule, ValidationRule::MainCount);

        assert!(validate_entries(&mains(MAX_MAIN), &limits).is_ok());
        let err = validate_entries(&mains(MAX_MAIN + 1), &limits).unwrap_err();
        assert_eq!(err.rule, ValidationRule::MainCount);
    }

    #[test]
    fn test_disabled_mains_do_not_count() {
        let entries = vec![
            SectionEntry::main("cat-A", false, 0),
            SectionEntry::main("cat-B", false, 1),
        ];
        let err = validate_entries(&entries, &SelectionLimits::default()).unwrap_err();
        assert_eq!(err.rule, ValidationRule::MainCount);
    }

    #[test]
    fn test_orphan_subcategory() {
        let mut entries = mains(1);
        entries.push(SectionEntry::sub("sub-1", "cat-missing", true, 0));
        let err = validate_entries(&entries, &SelectionLimits::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::new(ValidationRule::OrphanSubcategory, "sub-1")
        );
    }

    #[test]
    fn test_staged_subcategory_under_unselected_main_is_valid() {
        let entries = vec![
            SectionEntry::main("cat-A", true, 0),
            SectionEntry::main("cat-B", false, 1),
            SectionEntry::sub("sub-1", "cat-B", true, 0),
        ];
        assert!(validate_entries(&entries, &SelectionLimits::default()).is_ok());
    }

    #[test]
    fn test_main_with_parent_is_malformed() {
        let mut entry = SectionEntry::main("cat-A", true, 0);
        entry.parent_id = Some("cat-B".into());
        let err = validate_entries(&[entry], &SelectionLimits::default()).unwrap_err();
        assert_eq!(err.rule, ValidationRule::MalformedEntry);
    }

    #[test]
    fn test_sub_count_per_parent() {
        let limits = SelectionLimits {
            max_sub_per_main: 2,
            ..SelectionLimits::default()
        };
        let mut entries = mains(1);
        for i in 0..3 {
            entries.push(SectionEntry::sub(format!("sub-{}", i), "cat-0", true, i));
        }
        let err = validate_entries(&entries, &limits).unwrap_err();
        assert_eq!(err, ValidationError::new(ValidationRule::SubCount, "cat-0"));

        entries[3].enabled = false;
        assert!(validate_entries(&entries, &limits).is_ok());
    }

    #[test]
    fn test_error_serializes_rule_and_detail() {
        let json =
            serde_json::to_value(ValidationError::new(ValidationRule::Duplicate, "cat-A")).unwrap();
        assert_eq!(json["rule"], "duplicate");
        assert_eq!(json["detail"], "cat-A");
    }

    #[test]
    fn test_limits_check() {
        assert!(SelectionLimits::default().check().is_ok());
        let bad = SelectionLimits {
            min_main: 5,
            max_main: 2,
            max_sub_per_main: 1,
        };
        assert!(bad.check().is_err());
    }
}
