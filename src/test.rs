//! Shared test fixtures for building budget snapshots.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::config::WidgetConfig;
use crate::model::{Category, CategoryGroup, ClearedStatus, Milliunits, Transaction};
use chrono::NaiveDate;
use uuid::Uuid;

/// Parses a `YYYY-MM-DD` literal.
pub(crate) fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// A configuration with a token and every other option at its default.
pub(crate) fn config() -> WidgetConfig {
    WidgetConfig::new("test-token")
}

/// A cleared, uncategorized transaction.
pub(crate) fn tx(date: NaiveDate, amount: i64) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        date,
        amount: Milliunits(amount),
        payee_name: None,
        memo: None,
        account_id: Uuid::new_v4(),
        category_id: None,
        transfer_account_id: None,
        transfer_transaction_id: None,
        cleared: ClearedStatus::Cleared,
        deleted: false,
    }
}

/// A cleared transaction assigned to `category`.
pub(crate) fn tx_in(date: NaiveDate, amount: i64, category: &Category) -> Transaction {
    Transaction {
        category_id: Some(category.id),
        ..tx(date, amount)
    }
}

/// A category group populated with `(name, balance)` categories.
pub(crate) fn group_with(name: &str, categories: Vec<(&str, i64)>) -> CategoryGroup {
    let group_id = Uuid::new_v4();
    CategoryGroup {
        id: group_id,
        name: name.to_string(),
        hidden: false,
        deleted: false,
        categories: categories
            .into_iter()
            .map(|(cat_name, balance)| Category {
                id: Uuid::new_v4(),
                category_group_id: group_id,
                name: cat_name.to_string(),
                balance: Milliunits(balance),
                hidden: false,
                deleted: false,
            })
            .collect(),
    }
}

/// A standalone category belonging to `group` (without being pushed into it).
pub(crate) fn category_in(group: &CategoryGroup, name: &str, balance: i64) -> Category {
    Category {
        id: Uuid::new_v4(),
        category_group_id: group.id,
        name: name.to_string(),
        balance: Milliunits(balance),
        hidden: false,
        deleted: false,
    }
}
