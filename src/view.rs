//! The `ViewModel`: the display-ready aggregate produced by each fetch cycle.
//!
//! Rebuilt from scratch every cycle and emitted as one atomic update; the display never sees
//! partial results. All amounts are major-unit [`Amount`]s: spending and recent-transaction
//! amounts are non-negative magnitudes, category and group balances keep their sign.

use crate::model::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    /// Requested category balances, alphabetical by category name.
    pub items: Vec<CategoryBalance>,
    pub spending: Spending,
    /// Group totals, alphabetical by group name.
    pub group_summaries: Vec<GroupSummary>,
    /// Most recent spending first; ties keep feed order.
    pub recent_transactions: Vec<RecentTransaction>,
    /// How many categories the budget has in total.
    pub total_categories: usize,
    /// How many of the requested category names matched.
    pub matched_categories: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBalance {
    pub name: String,
    pub balance: Amount,
}

/// Running spending totals per time bucket. Today's window is a subset of this week's, so a
/// transaction may contribute to several buckets at once.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spending {
    pub today: Amount,
    pub this_week: Amount,
    pub last_week: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub name: String,
    pub total_available: Amount,
    pub category_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTransaction {
    pub payee: String,
    /// Positive spending magnitude.
    pub amount: Amount,
    pub date: NaiveDate,
    #[serde(default)]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Milliunits;

    #[test]
    fn serializes_with_camel_case_keys() {
        let view = ViewModel {
            items: vec![CategoryBalance {
                name: "Groceries".to_string(),
                balance: Milliunits(45230).amount(),
            }],
            spending: Spending::default(),
            group_summaries: vec![],
            recent_transactions: vec![],
            total_categories: 12,
            matched_categories: 1,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["items"][0]["balance"], "$45.23");
        assert_eq!(json["totalCategories"], 12);
        assert_eq!(json["spending"]["thisWeek"], "$0.00");
    }
}
