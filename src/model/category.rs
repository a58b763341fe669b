//! Category and category-group snapshot types, plus the per-cycle lookup index.

use crate::model::Milliunits;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// A budget line item with an available balance, nested inside a [`CategoryGroup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub category_group_id: Uuid,
    pub name: String,
    /// The available balance in milliunits. May be negative (overspent).
    pub balance: Milliunits,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted: bool,
}

/// A named, ordered collection of categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl CategoryGroup {
    /// Sum of the available balances of all categories in this group.
    pub fn total_available(&self) -> Milliunits {
        self.categories.iter().map(|c| c.balance).sum()
    }
}

/// Lookup structures over one fetch cycle's category groups.
///
/// Rebuilt from scratch each cycle and borrowed from the snapshot; nothing here survives
/// between cycles. Display selection is keyed by category name (last-write-wins when two
/// groups reuse a name, which is logged but must not fail), while transaction attribution is
/// keyed by category id so name collisions cannot misattribute spending.
pub struct CategoryIndex<'a> {
    by_name: HashMap<&'a str, &'a Category>,
    by_id: HashMap<Uuid, (&'a Category, &'a CategoryGroup)>,
    category_count: usize,
}

impl<'a> CategoryIndex<'a> {
    pub fn new(groups: &'a [CategoryGroup]) -> Self {
        let mut by_name: HashMap<&str, &Category> = HashMap::new();
        let mut by_id = HashMap::new();
        let mut category_count = 0;
        for group in groups {
            for category in &group.categories {
                category_count += 1;
                if let Some(previous) = by_name.insert(category.name.as_str(), category) {
                    debug!(
                        name = %category.name,
                        previous_group = %previous.category_group_id,
                        group = %group.id,
                        "duplicate category name, keeping the later one for name lookup"
                    );
                }
                by_id.insert(category.id, (category, group));
            }
        }
        Self {
            by_name,
            by_id,
            category_count,
        }
    }

    /// Finds a category by display name.
    pub fn by_name(&self, name: &str) -> Option<&'a Category> {
        self.by_name.get(name).copied()
    }

    /// Resolves a transaction's category reference to the category and its owning group.
    /// Group membership is always derived this way, never stored on the transaction.
    pub fn locate(&self, category_id: Uuid) -> Option<(&'a Category, &'a CategoryGroup)> {
        self.by_id.get(&category_id).copied()
    }

    /// Total number of categories across all groups.
    pub fn category_count(&self) -> usize {
        self.category_count
    }

    /// All category names, for the unmatched-category diagnostic.
    pub fn names(&self) -> Vec<&'a str> {
        let mut names: Vec<&str> = self.by_name.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// One entry from the budget listing, used only during budget resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub id: Uuid,
    pub name: String,
}

/// One entry from the account listing, consulted when tracking-only accounts are excluded
/// from aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub on_budget: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{category_in, group_with};

    #[test]
    fn index_finds_categories_by_name_and_id() {
        let groups = vec![
            group_with("Everyday", vec![("Groceries", 45230), ("Fun", 1000)]),
            group_with("Bills", vec![("Rent", 0)]),
        ];
        let index = CategoryIndex::new(&groups);
        assert_eq!(index.category_count(), 3);
        let groceries = index.by_name("Groceries").unwrap();
        assert_eq!(groceries.balance, Milliunits(45230));
        let (cat, group) = index.locate(groceries.id).unwrap();
        assert_eq!(cat.name, "Groceries");
        assert_eq!(group.name, "Everyday");
        assert!(index.by_name("Nope").is_none());
    }

    #[test]
    fn duplicate_names_keep_the_last_and_do_not_panic() {
        let groups = vec![
            group_with("First", vec![("Misc", 100)]),
            group_with("Second", vec![("Misc", 200)]),
        ];
        let index = CategoryIndex::new(&groups);
        // Last write wins for the name lookup.
        assert_eq!(index.by_name("Misc").unwrap().balance, Milliunits(200));
        // Both remain reachable by id.
        let first = &groups[0].categories[0];
        assert_eq!(index.locate(first.id).unwrap().1.name, "First");
    }

    #[test]
    fn group_total_available_sums_balances() {
        let group = group_with("Bills", vec![("Rent", -500), ("Power", 250)]);
        assert_eq!(group.total_available(), Milliunits(-250));
    }

    #[test]
    fn names_are_sorted() {
        let groups = vec![group_with("G", vec![("b", 0), ("a", 0), ("c", 0)])];
        let index = CategoryIndex::new(&groups);
        assert_eq!(index.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn category_in_helper_links_group_id() {
        let group = group_with("G", vec![("a", 1)]);
        let cat = category_in(&group, "extra", 2);
        assert_eq!(cat.category_group_id, group.id);
    }
}
