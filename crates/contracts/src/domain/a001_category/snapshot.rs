use std::collections::HashMap;

use super::aggregate::Category;

/// Immutable index over one read of the category catalog.
///
/// Built once per render/hydrate call and never mutated afterwards, so a
/// single snapshot can be shared between concurrent readers.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    mains: HashMap<String, Category>,
    subs: HashMap<String, Category>,
}

impl CatalogSnapshot {
    /// Main categories carrying a parent id, and subcategories without one,
    /// are ignored.
    pub fn new(mains: Vec<Category>, subs: Vec<Category>) -> Self {
        let mains = mains
            .into_iter()
            .filter(|c| c.parent_id.is_none())
            .map(|c| (c.id.clone(), c))
            .collect();
        let subs = subs
            .into_iter()
            .filter(|c| c.parent_id.is_some())
            .map(|c| (c.id.clone(), c))
            .collect();
        Self { mains, subs }
    }

    /// Splits a flat category list into mains and subcategories.
    pub fn from_flat(categories: Vec<Category>) -> Self {
        let (mains, subs): (Vec<_>, Vec<_>) = categories.into_iter().partition(Category::is_main);
        Self::new(mains, subs)
    }

    /// Active main category by id.
    pub fn resolve_main(&self, id: &str) -> Option<&Category> {
        self.mains.get(id).filter(|c| c.is_active)
    }

    /// Active subcategory whose parent is `parent_id` and is itself active.
    pub fn resolve_sub(&self, id: &str, parent_id: &str) -> Option<&Category> {
        let sub = self.subs.get(id).filter(|c| c.is_active)?;
        if sub.parent_id.as_deref() != Some(parent_id) {
            return None;
        }
        self.resolve_main(parent_id)?;
        Some(sub)
    }

    pub fn main_count(&self) -> usize {
        self.mains.len()
    }

    pub fn sub_count(&self) -> usize {
        self.subs.len()
    }

    /// Active mains, ordered by catalog sort order then name.
    pub fn active_mains(&self) -> Vec<&Category> {
        let mut items: Vec<&Category> = self.mains.values().filter(|c| c.is_active).collect();
        sort_for_display(&mut items);
        items
    }

    /// Active subcategories of an active main category.
    pub fn active_subs_of(&self, parent_id: &str) -> Vec<&Category> {
        if self.resolve_main(parent_id).is_none() {
            return Vec::new();
        }
        let mut items: Vec<&Category> = self
            .subs
            .values()
            .filter(|c| c.is_active && c.parent_id.as_deref() == Some(parent_id))
            .collect();
        sort_for_display(&mut items);
        items
    }
}

fn sort_for_display(items: &mut [&Category]) {
    items.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: &str, parent: Option<&str>, active: bool) -> Category {
        Category {
            id: id.into(),
            code: id.into(),
            name: id.to_uppercase(),
            description: String::new(),
            image: None,
            parent_id: parent.map(Into::into),
            is_active: active,
            sort_order: 0,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_inactive_main_hides_its_subcategories() {
        let snapshot = CatalogSnapshot::from_flat(vec![
            cat("cat-A", None, false),
            cat("sub-1", Some("cat-A"), true),
        ]);
        assert!(snapshot.resolve_main("cat-A").is_none());
        assert!(snapshot.resolve_sub("sub-1", "cat-A").is_none());
        assert!(snapshot.active_subs_of("cat-A").is_empty());
    }

    #[test]
    fn test_sub_resolves_only_under_its_catalog_parent() {
        let snapshot = CatalogSnapshot::from_flat(vec![
            cat("cat-A", None, true),
            cat("cat-B", None, true),
            cat("sub-1", Some("cat-A"), true),
        ]);
        assert!(snapshot.resolve_sub("sub-1", "cat-A").is_some());
        assert!(snapshot.resolve_sub("sub-1", "cat-B").is_none());
        assert_eq!(snapshot.main_count(), 2);
        assert_eq!(snapshot.sub_count(), 1);
    }
}
