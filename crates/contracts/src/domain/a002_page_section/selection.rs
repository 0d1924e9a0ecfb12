//! In-progress category selection for the page section editor.
//!
//! The editor keeps one canonical hierarchical map (main category ->
//! subcategories) and converts to/from the flat persisted entries only at
//! [`CategorySelection::hydrate`] and [`CategorySelection::to_persistable`].
//!
//! Ordering: selected siblings always carry dense orders `0..n`. Selecting
//! appends (`order = selected count`), deselecting compacts the remaining
//! selected siblings. Unselected records follow with `n..`, keeping their
//! relative order, so no two siblings share an order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::aggregate::{EntryKind, SectionEntry};
use super::validation::{validate_entries, SelectionLimits, ValidationError};
use crate::domain::a001_category::CatalogSnapshot;

// ============================================================================
// Rules
// ============================================================================

/// Можно ли выбирать подкатегорию, пока её основная категория не выбрана
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubcategoryStaging {
    /// Родитель создаётся невыбранным, подкатегория выбирается
    #[default]
    Permissive,
    /// Выбор подкатегории отклоняется, пока родитель не выбран
    RequireSelectedParent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRules {
    pub limits: SelectionLimits,
    pub staging: SubcategoryStaging,
}

// ============================================================================
// Rejections
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionScope {
    Main,
    Sub,
}

impl std::fmt::Display for SelectionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionScope::Main => f.write_str("main"),
            SelectionScope::Sub => f.write_str("sub"),
        }
    }
}

/// Отказ в переключении; состояние выбора при этом не меняется.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SelectionRejection {
    #[error("limit exceeded ({scope})")]
    LimitExceeded {
        scope: SelectionScope,
        #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<String>,
    },
    #[error("minimum required ({scope})")]
    MinimumRequired { scope: SelectionScope },
    #[error("parent {parent_id} is not selected")]
    ParentNotSelected {
        #[serde(rename = "parentId")]
        parent_id: String,
    },
}

/// Итог массового выбора: сколько кандидатов было и сколько реально добавлено
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSelectOutcome {
    pub requested: usize,
    pub applied: usize,
}

impl BulkSelectOutcome {
    pub fn is_complete(&self) -> bool {
        self.applied == self.requested
    }
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SubSelection {
    pub selected: bool,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MainSelection {
    pub selected: bool,
    pub order: u32,
    pub subcategories: BTreeMap<String, SubSelection>,
}

impl MainSelection {
    fn staged(order: u32) -> Self {
        Self {
            selected: false,
            order,
            subcategories: BTreeMap::new(),
        }
    }

    pub fn selected_sub_count(&self) -> usize {
        self.subcategories.values().filter(|s| s.selected).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CategorySelection {
    rules: SelectionRules,
    mains: BTreeMap<String, MainSelection>,
}

impl CategorySelection {
    pub fn new(rules: SelectionRules) -> Self {
        Self {
            rules,
            mains: BTreeMap::new(),
        }
    }

    /// Восстановить выбор из сохранённых записей.
    ///
    /// Записи, которые не разрешаются в текущем снимке каталога (удалены,
    /// неактивны, подкатегория сменила родителя), молча отбрасываются.
    pub fn hydrate(
        rules: SelectionRules,
        entries: &[SectionEntry],
        catalog: &CatalogSnapshot,
    ) -> Self {
        let mut selection = Self::new(rules);
        let mut main_positions: HashMap<String, usize> = HashMap::new();
        let mut sub_positions: HashMap<(String, String), usize> = HashMap::new();

        for (pos, entry) in entries.iter().enumerate() {
            if entry.kind != EntryKind::Main || entry.parent_id.is_some() {
                continue;
            }
            if catalog.resolve_main(&entry.category_id).is_none() {
                continue;
            }
            if selection.mains.contains_key(&entry.category_id) {
                continue;
            }
            selection.mains.insert(
                entry.category_id.clone(),
                MainSelection {
                    selected: entry.enabled,
                    order: entry.order,
                    subcategories: BTreeMap::new(),
                },
            );
            main_positions.insert(entry.category_id.clone(), pos);
        }

        for (pos, entry) in entries.iter().enumerate() {
            if entry.kind != EntryKind::Subcategory {
                continue;
            }
            let Some(parent_id) = entry.parent_id.as_deref() else {
                continue;
            };
            if catalog.resolve_sub(&entry.category_id, parent_id).is_none() {
                continue;
            }
            // Родитель без своей записи уходит в конец, номер выставится ниже
            let main = selection
                .mains
                .entry(parent_id.to_string())
                .or_insert_with(|| MainSelection::staged(u32::MAX));
            if main.subcategories.contains_key(&entry.category_id) {
                continue;
            }
            main.subcategories.insert(
                entry.category_id.clone(),
                SubSelection {
                    selected: entry.enabled,
                    order: entry.order,
                },
            );
            sub_positions.insert((parent_id.to_string(), entry.category_id.clone()), pos);
        }

        // Равные order разрешаются позицией в записях
        let main_rank = |id: &str| main_positions.get(id).copied().unwrap_or(usize::MAX);
        let mut ranked: Vec<(bool, u32, usize, String)> = selection
            .mains
            .iter()
            .map(|(id, m)| (!m.selected, m.order, main_rank(id), id.clone()))
            .collect();
        ranked.sort();
        for (order, (_, _, _, id)) in ranked.into_iter().enumerate() {
            if let Some(main) = selection.mains.get_mut(&id) {
                main.order = order as u32;
            }
        }

        for (parent_id, main) in selection.mains.iter_mut() {
            let mut ranked: Vec<(bool, u32, usize, String)> = main
                .subcategories
                .iter()
                .map(|(id, s)| {
                    let pos = sub_positions
                        .get(&(parent_id.clone(), id.clone()))
                        .copied()
                        .unwrap_or(usize::MAX);
                    (!s.selected, s.order, pos, id.clone())
                })
                .collect();
            ranked.sort();
            for (order, (_, _, _, id)) in ranked.into_iter().enumerate() {
                if let Some(sub) = main.subcategories.get_mut(&id) {
                    sub.order = order as u32;
                }
            }
        }

        selection
    }

    pub fn rules(&self) -> &SelectionRules {
        &self.rules
    }

    pub fn mains(&self) -> &BTreeMap<String, MainSelection> {
        &self.mains
    }

    pub fn is_empty(&self) -> bool {
        self.mains.is_empty()
    }

    pub fn selected_main_count(&self) -> usize {
        self.mains.values().filter(|m| m.selected).count()
    }

    pub fn selected_sub_count(&self, parent_id: &str) -> usize {
        self.mains
            .get(parent_id)
            .map(MainSelection::selected_sub_count)
            .unwrap_or(0)
    }

    pub fn is_main_selected(&self, id: &str) -> bool {
        self.mains.get(id).map(|m| m.selected).unwrap_or(false)
    }

    pub fn is_sub_selected(&self, sub_id: &str, parent_id: &str) -> bool {
        self.mains
            .get(parent_id)
            .and_then(|m| m.subcategories.get(sub_id))
            .map(|s| s.selected)
            .unwrap_or(false)
    }

    /// Выбранные основные категории в порядке отображения
    pub fn selected_main_ids(&self) -> Vec<&str> {
        sorted_by_display(self.mains.iter(), |m| (m.selected, m.order))
            .into_iter()
            .filter(|(_, m)| m.selected)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Переключить основную категорию.
    ///
    /// Снятие выбора каскадно снимает все её подкатегории.
    pub fn toggle_main(&mut self, category_id: &str) -> Result<(), SelectionRejection> {
        let limits = self.rules.limits;
        let selected_count = self.selected_main_count();

        if self.is_main_selected(category_id) {
            if selected_count <= limits.min_main {
                return Err(SelectionRejection::MinimumRequired {
                    scope: SelectionScope::Main,
                });
            }
            if let Some(main) = self.mains.get_mut(category_id) {
                main.selected = false;
                for sub in main.subcategories.values_mut() {
                    sub.selected = false;
                }
                compact_subs(main);
            }
            self.compact_mains();
            return Ok(());
        }

        if selected_count >= limits.max_main {
            return Err(SelectionRejection::LimitExceeded {
                scope: SelectionScope::Main,
                parent_id: None,
            });
        }
        let main = self.mains.entry(category_id.to_string()).or_default();
        main.selected = true;
        main.order = selected_count as u32;
        self.compact_mains();
        Ok(())
    }

    /// Переключить подкатегорию внутри `parent_id`.
    ///
    /// Если подкатегория записана у другого родителя, запись переносится
    /// к `parent_id`: одна подкатегория не бывает у двух родителей.
    pub fn toggle_sub(
        &mut self,
        subcategory_id: &str,
        parent_id: &str,
    ) -> Result<(), SelectionRejection> {
        if self.is_sub_selected(subcategory_id, parent_id) {
            if let Some(main) = self.mains.get_mut(parent_id) {
                if let Some(sub) = main.subcategories.get_mut(subcategory_id) {
                    sub.selected = false;
                }
                compact_subs(main);
            }
            return Ok(());
        }

        self.ensure_can_stage(parent_id)?;
        let selected_count = self.selected_sub_count(parent_id);
        if selected_count >= self.rules.limits.max_sub_per_main {
            return Err(SelectionRejection::LimitExceeded {
                scope: SelectionScope::Sub,
                parent_id: Some(parent_id.to_string()),
            });
        }

        self.detach_sub(subcategory_id, parent_id);
        let main = self.stage_parent(parent_id);
        let sub = main
            .subcategories
            .entry(subcategory_id.to_string())
            .or_default();
        sub.selected = true;
        sub.order = selected_count as u32;
        compact_subs(main);
        Ok(())
    }

    /// Выбрать все доступные основные категории, сколько поместится.
    pub fn bulk_select_all_mains<I, S>(&mut self, available: I) -> BulkSelectOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates = unselected_candidates(available, |id| self.is_main_selected(id));
        let mut applied = 0;
        for id in &candidates {
            if self.toggle_main(id).is_err() {
                break;
            }
            applied += 1;
        }
        BulkSelectOutcome {
            requested: candidates.len(),
            applied,
        }
    }

    /// Выбрать все доступные подкатегории родителя, сколько поместится.
    pub fn bulk_select_all_subs<I, S>(
        &mut self,
        parent_id: &str,
        available: I,
    ) -> Result<BulkSelectOutcome, SelectionRejection>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates =
            unselected_candidates(available, |id| self.is_sub_selected(id, parent_id));
        if candidates.is_empty() {
            return Ok(BulkSelectOutcome {
                requested: 0,
                applied: 0,
            });
        }
        self.ensure_can_stage(parent_id)?;

        let mut applied = 0;
        for id in &candidates {
            if self.toggle_sub(id, parent_id).is_err() {
                break;
            }
            applied += 1;
        }
        Ok(BulkSelectOutcome {
            requested: candidates.len(),
            applied,
        })
    }

    /// Сбросить всё. Минимум не проверяется: пустой выбор не пройдёт
    /// валидацию при сохранении.
    pub fn clear(&mut self) {
        self.mains.clear();
    }

    /// Плоские записи для сохранения: сначала основные категории в порядке
    /// отображения, затем подкатегории каждой из них в том же порядке.
    pub fn to_persistable(&self) -> Vec<SectionEntry> {
        let mains = sorted_by_display(self.mains.iter(), |m| (m.selected, m.order));

        let mut entries: Vec<SectionEntry> = mains
            .iter()
            .map(|(id, m)| SectionEntry::main(id.as_str(), m.selected, m.order))
            .collect();

        for (parent_id, main) in &mains {
            let subs = sorted_by_display(main.subcategories.iter(), |s| (s.selected, s.order));
            entries.extend(subs.into_iter().map(|(id, s)| {
                SectionEntry::sub(id.as_str(), parent_id.as_str(), s.selected, s.order)
            }));
        }

        entries
    }

    /// Та же проверка, что выполнит сервер при сохранении
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_entries(&self.to_persistable(), &self.rules.limits)
    }

    fn ensure_can_stage(&self, parent_id: &str) -> Result<(), SelectionRejection> {
        if self.rules.staging == SubcategoryStaging::RequireSelectedParent
            && !self.is_main_selected(parent_id)
        {
            return Err(SelectionRejection::ParentNotSelected {
                parent_id: parent_id.to_string(),
            });
        }
        Ok(())
    }

    /// Убрать запись подкатегории у всех родителей, кроме `keep_parent`
    fn detach_sub(&mut self, subcategory_id: &str, keep_parent: &str) {
        for (parent_id, main) in self.mains.iter_mut() {
            if parent_id != keep_parent && main.subcategories.remove(subcategory_id).is_some() {
                compact_subs(main);
            }
        }
    }

    fn stage_parent(&mut self, parent_id: &str) -> &mut MainSelection {
        let staged_order = self
            .mains
            .values()
            .map(|m| m.order.saturating_add(1))
            .max()
            .unwrap_or(0);
        self.mains
            .entry(parent_id.to_string())
            .or_insert_with(|| MainSelection::staged(staged_order))
    }

    /// Выбранные получают `0..n`, невыбранные `n..` в прежнем порядке
    fn compact_mains(&mut self) {
        let ids: Vec<String> = sorted_by_display(self.mains.iter(), |m| (m.selected, m.order))
            .into_iter()
            .map(|(id, _)| id.clone())
            .collect();
        for (order, id) in ids.into_iter().enumerate() {
            if let Some(main) = self.mains.get_mut(&id) {
                main.order = order as u32;
            }
        }
    }
}

fn compact_subs(main: &mut MainSelection) {
    let ids: Vec<String> = sorted_by_display(main.subcategories.iter(), |s| (s.selected, s.order))
        .into_iter()
        .map(|(id, _)| id.clone())
        .collect();
    for (order, id) in ids.into_iter().enumerate() {
        if let Some(sub) = main.subcategories.get_mut(&id) {
            sub.order = order as u32;
        }
    }
}

/// Selected first, then by order, then by id.
fn sorted_by_display<'a, T, F>(
    items: impl Iterator<Item = (&'a String, &'a T)>,
    key: F,
) -> Vec<(&'a String, &'a T)>
where
    T: 'a,
    F: Fn(&T) -> (bool, u32),
{
    let mut items: Vec<(&String, &T)> = items.collect();
    items.sort_by(|(a_id, a), (b_id, b)| {
        let (a_selected, a_order) = key(*a);
        let (b_selected, b_order) = key(*b);
        match b_selected.cmp(&a_selected) {
            Ordering::Equal => a_order.cmp(&b_order).then_with(|| a_id.cmp(b_id)),
            other => other,
        }
    });
    items
}

fn unselected_candidates<I, S, F>(available: I, is_selected: F) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&str) -> bool,
{
    let mut candidates: Vec<String> = Vec::new();
    for id in available {
        let id = id.as_ref();
        if !is_selected(id) && !candidates.iter().any(|c| c == id) {
            candidates.push(id.to_string());
        }
    }
    candidates
}
