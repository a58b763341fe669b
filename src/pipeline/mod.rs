//! The aggregation pipeline: raw category groups and transactions in, `ViewModel` out.
//!
//! Everything here is a pure function of one cycle's [`Snapshot`], the configuration, and
//! the current calendar date. No state survives between cycles, so running the pipeline
//! twice over the same snapshot yields identical output.

mod groups;
mod recent;
mod spending;

use crate::config::WidgetConfig;
use crate::model::{Account, CategoryGroup, CategoryIndex, Transaction};
use crate::view::{CategoryBalance, ViewModel};
use chrono::{Days, NaiveDate};
use spending::Windows;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// One fetch cycle's worth of raw API data. `accounts` is only populated when tracking
/// accounts are excluded from aggregation.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub groups: Vec<CategoryGroup>,
    pub transactions: Vec<Transaction>,
    pub accounts: Vec<Account>,
}

/// Computes the complete view model for one cycle. The result is assembled in full before
/// being returned; callers emit it as a single atomic update.
pub fn build_view_model(snapshot: &Snapshot, config: &WidgetConfig, today: NaiveDate) -> ViewModel {
    let index = CategoryIndex::new(&snapshot.groups);
    let off_budget = off_budget_accounts(&snapshot.accounts, config.exclude_non_budget_accounts);

    let (items, matched_categories) = category_balances(&index, &config.categories);

    let windows = Windows::new(today, &config.spending_window);
    let spending = spending::totals(
        &snapshot.transactions,
        &index,
        &config.balance_exclusions(),
        config,
        &off_budget,
        &windows,
    );

    let group_summaries = groups::summaries(&snapshot.groups, &config.groups);

    let recent_transactions = recent::listing(
        &snapshot.transactions,
        &index,
        &config.recent_exclusions(),
        config,
        &off_budget,
        today,
    );

    ViewModel {
        items,
        spending,
        group_summaries,
        recent_transactions,
        total_categories: index.category_count(),
        matched_categories,
    }
}

/// The earliest date any bucket or the recent listing can need, used to bound the
/// transaction fetch.
pub fn lookback_start(config: &WidgetConfig, today: NaiveDate) -> NaiveDate {
    let windows = Windows::new(today, &config.spending_window);
    let recent_cutoff = today
        .checked_sub_days(Days::new(config.recent_transaction_days as u64))
        .unwrap_or(today);
    windows.last_week_start().min(recent_cutoff)
}

/// Selects the requested category balances. Unmatched requested names are dropped silently,
/// with a diagnostic naming what was available. Output is alphabetical by category name.
fn category_balances(
    index: &CategoryIndex<'_>,
    requested: &[String],
) -> (Vec<CategoryBalance>, usize) {
    let mut items: Vec<CategoryBalance> = Vec::new();
    for name in requested {
        match index.by_name(name) {
            Some(category) => items.push(CategoryBalance {
                name: category.name.clone(),
                balance: category.balance.amount(),
            }),
            None => debug!(requested = %name, "requested category not found in budget"),
        }
    }
    if items.is_empty() && !requested.is_empty() {
        debug!(
            available = %index.names().join(", "),
            "no requested categories matched"
        );
    }
    let matched = items.len();
    items.sort_by(|a, b| a.name.cmp(&b.name));
    (items, matched)
}

fn off_budget_accounts(accounts: &[Account], exclude: bool) -> HashSet<Uuid> {
    if !exclude {
        return HashSet::new();
    }
    accounts
        .iter()
        .filter(|a| !a.on_budget)
        .map(|a| a.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Milliunits;
    use crate::test::{config, group_with, tx_in};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        // A Sunday, so the calendar week starts today.
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    #[test]
    fn builds_the_full_view_model() {
        let groups = vec![
            group_with("Everyday", vec![("Groceries", 45230), ("Fun", 8000)]),
            group_with("Bills", vec![("Rent", -500)]),
        ];
        let groceries = groups[0].categories[0].clone();
        let snapshot = Snapshot {
            transactions: vec![tx_in(today(), -12000, &groceries)],
            groups,
            accounts: vec![],
        };
        let mut cfg = config();
        cfg.categories = vec!["Groceries".to_string(), "Missing".to_string()];

        let view = build_view_model(&snapshot, &cfg, today());

        assert_eq!(view.total_categories, 3);
        assert_eq!(view.matched_categories, 1);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].name, "Groceries");
        assert_eq!(view.items[0].balance.to_string(), "$45.23");
        assert_eq!(view.spending.today, Milliunits(12000).amount());
        assert_eq!(view.spending.this_week, Milliunits(12000).amount());
        // Bills has a negative total and was not requested.
        assert_eq!(view.group_summaries.len(), 1);
        assert_eq!(view.group_summaries[0].name, "Everyday");
        assert_eq!(view.recent_transactions.len(), 1);
    }

    #[test]
    fn unmatched_requested_names_are_not_an_error() {
        let snapshot = Snapshot {
            groups: vec![group_with("G", vec![("A", 100)])],
            ..Default::default()
        };
        let mut cfg = config();
        cfg.categories = vec!["Nope".to_string()];
        let view = build_view_model(&snapshot, &cfg, today());
        assert!(view.items.is_empty());
        assert_eq!(view.matched_categories, 0);
        assert_eq!(view.total_categories, 1);
    }

    #[test]
    fn items_are_sorted_alphabetically_regardless_of_request_order() {
        let snapshot = Snapshot {
            groups: vec![group_with("G", vec![("Zebra", 1), ("Apple", 2), ("Mango", 3)])],
            ..Default::default()
        };
        let mut cfg = config();
        cfg.categories = vec!["Zebra".into(), "Mango".into(), "Apple".into()];
        let view = build_view_model(&snapshot, &cfg, today());
        let names: Vec<&str> = view.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Mango", "Zebra"]);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let groups = vec![group_with(
            "Everyday",
            vec![("Groceries", 45230), ("Fun", 8000)],
        )];
        let groceries = groups[0].categories[0].clone();
        let snapshot = Snapshot {
            transactions: vec![
                tx_in(today(), -12000, &groceries),
                tx_in(today().pred_opt().unwrap(), -3000, &groceries),
            ],
            groups,
            accounts: vec![],
        };
        let mut cfg = config();
        cfg.categories = vec!["Groceries".to_string()];

        let first = build_view_model(&snapshot, &cfg, today());
        let second = build_view_model(&snapshot, &cfg, today());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn lookback_covers_last_week_and_the_recent_window() {
        let mut cfg = config();
        cfg.recent_transaction_days = 30;
        // 30 days back reaches further than the two calendar weeks.
        assert_eq!(
            lookback_start(&cfg, today()),
            today().checked_sub_days(Days::new(30)).unwrap()
        );
        cfg.recent_transaction_days = 3;
        // Now the last-week boundary dominates: today is a Sunday, so the previous week
        // opened seven days ago.
        assert_eq!(
            lookback_start(&cfg, today()),
            today().checked_sub_days(Days::new(7)).unwrap()
        );
    }

    #[test]
    fn off_budget_accounts_are_excluded_everywhere_when_configured() {
        let groups = vec![group_with("Everyday", vec![("Groceries", 1000)])];
        let groceries = groups[0].categories[0].clone();
        let tracking = Account {
            id: Uuid::new_v4(),
            name: "Brokerage".to_string(),
            on_budget: false,
            closed: false,
            deleted: false,
        };
        let mut transaction = tx_in(today(), -9000, &groceries);
        transaction.account_id = tracking.id;
        let snapshot = Snapshot {
            transactions: vec![transaction],
            groups,
            accounts: vec![tracking],
        };

        let mut cfg = config();
        cfg.exclude_non_budget_accounts = true;
        let view = build_view_model(&snapshot, &cfg, today());
        assert!(view.spending.today.is_zero());
        assert!(view.recent_transactions.is_empty());

        cfg.exclude_non_budget_accounts = false;
        let view = build_view_model(&snapshot, &cfg, today());
        assert_eq!(view.spending.today, Milliunits(9000).amount());
        assert_eq!(view.recent_transactions.len(), 1);
    }
}
