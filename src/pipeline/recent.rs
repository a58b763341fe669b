//! The recent-transactions sub-list.
//!
//! Uses its own exclusion policy, independent of the spending buckets' policy. The income
//! heuristic below is text matching, not a ledger flag; false positives and negatives are
//! accepted behavior.

use crate::config::{ExclusionPolicy, WidgetConfig};
use crate::model::{CategoryIndex, Transaction};
use crate::view::RecentTransaction;
use chrono::{Days, NaiveDate};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Payee/memo substrings that indicate income rather than spending, matched
/// case-insensitively.
const INCOME_HINTS: &[&str] = &[
    "deposit",
    "direct deposit",
    "payroll",
    "income",
    "salary",
    "paycheck",
    "refund",
    "credit",
];

/// Produces the recent-transactions sub-list: spending only, transfers and income-looking
/// transactions dropped, the recent exclusion policy applied, sorted most recent first
/// (stable, so ties keep feed order) and truncated to the configured count.
pub(super) fn listing(
    transactions: &[Transaction],
    index: &CategoryIndex<'_>,
    exclusions: &ExclusionPolicy,
    config: &WidgetConfig,
    off_budget: &HashSet<Uuid>,
    today: NaiveDate,
) -> Vec<RecentTransaction> {
    let cutoff = today
        .checked_sub_days(Days::new(config.recent_transaction_days as u64))
        .unwrap_or(today);

    let mut spending: Vec<(&Transaction, crate::model::Milliunits)> = transactions
        .iter()
        .filter_map(|t| {
            includes(t, index, exclusions, config, off_budget, cutoff).map(|m| (t, m))
        })
        .collect();

    // Stable sort: equal dates keep the feed's order.
    spending.sort_by(|a, b| b.0.date.cmp(&a.0.date));
    spending.truncate(config.recent_transaction_count);

    spending
        .into_iter()
        .map(|(t, magnitude)| RecentTransaction {
            payee: t
                .payee_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            amount: magnitude.amount(),
            date: t.date,
            category: t
                .category_id
                .and_then(|id| index.locate(id))
                .map(|(c, _)| c.name.clone()),
        })
        .collect()
}

/// The recent-list predicate. Returns the spending magnitude when the transaction should
/// appear.
fn includes(
    transaction: &Transaction,
    index: &CategoryIndex<'_>,
    exclusions: &ExclusionPolicy,
    config: &WidgetConfig,
    off_budget: &HashSet<Uuid>,
    cutoff: NaiveDate,
) -> Option<crate::model::Milliunits> {
    if transaction.deleted
        || transaction.date < cutoff
        || off_budget.contains(&transaction.account_id)
    {
        return None;
    }
    if !config.show_uncleared && !transaction.cleared.is_cleared() {
        return None;
    }
    let magnitude = transaction.spending(config.spending_sign)?;
    if transaction.is_transfer() {
        return None;
    }
    if looks_like_income(transaction) {
        debug!(
            date = %transaction.date,
            payee = transaction.payee_name.as_deref().unwrap_or(""),
            "excluding income-looking transaction from recent list"
        );
        return None;
    }
    let located = transaction.category_id.and_then(|id| index.locate(id));
    let category_name = located.map(|(c, _)| c.name.as_str());
    let group_name = located.map(|(_, g)| g.name.as_str());
    if exclusions.excludes(category_name, group_name) {
        return None;
    }
    Some(magnitude)
}

fn looks_like_income(transaction: &Transaction) -> bool {
    let matches = |text: &Option<String>| {
        text.as_deref().is_some_and(|t| {
            let lower = t.to_lowercase();
            INCOME_HINTS.iter().any(|hint| lower.contains(hint))
        })
    };
    matches(&transaction.payee_name) || matches(&transaction.memo)
}
