//! Spending aggregation into the today / this-week / last-week buckets.

use crate::config::{ExclusionPolicy, SpendingWindow, WidgetConfig};
use crate::model::{CategoryIndex, Milliunits, Transaction};
use crate::view::Spending;
use chrono::{Datelike, Days, NaiveDate};
use std::collections::HashSet;
use uuid::Uuid;

/// The bucket boundaries for one cycle, derived from the calendar date at the start of the
/// cycle. `week_start` is the most recent Sunday for a calendar week, or `today - (N - 1)`
/// for a rolling N-day window; `last_week_start` opens the immediately preceding window of
/// the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Windows {
    today: NaiveDate,
    week_start: NaiveDate,
    last_week_start: NaiveDate,
}

impl Windows {
    pub(super) fn new(today: NaiveDate, window: &SpendingWindow) -> Self {
        let (week_start, span) = match window {
            SpendingWindow::CalendarWeek => {
                let days_from_sunday = today.weekday().num_days_from_sunday() as u64;
                (back(today, days_from_sunday), 7)
            }
            SpendingWindow::RollingDays(n) => {
                let n = (*n).max(1) as u64;
                (back(today, n - 1), n)
            }
        };
        Self {
            today,
            week_start,
            last_week_start: back(week_start, span),
        }
    }

    pub(super) fn last_week_start(&self) -> NaiveDate {
        self.last_week_start
    }

    fn in_today(&self, date: NaiveDate) -> bool {
        date >= self.today
    }

    fn in_this_week(&self, date: NaiveDate) -> bool {
        date >= self.week_start
    }

    fn in_last_week(&self, date: NaiveDate) -> bool {
        date >= self.last_week_start && date < self.week_start
    }
}

fn back(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(date)
}

/// Sums normalized spending into the time buckets. A transaction passing the exclusion
/// predicate may land in several buckets at once: today's window is a subset of this
/// week's, so the buckets overlap rather than partition.
pub(super) fn totals(
    transactions: &[Transaction],
    index: &CategoryIndex<'_>,
    exclusions: &ExclusionPolicy,
    config: &WidgetConfig,
    off_budget: &HashSet<Uuid>,
    windows: &Windows,
) -> Spending {
    let mut today = Milliunits::ZERO;
    let mut this_week = Milliunits::ZERO;
    let mut last_week = Milliunits::ZERO;

    for transaction in transactions {
        let Some(magnitude) = spendable(transaction, index, exclusions, config, off_budget) else {
            continue;
        };
        if windows.in_today(transaction.date) {
            today += magnitude;
        }
        if windows.in_this_week(transaction.date) {
            this_week += magnitude;
        }
        if windows.in_last_week(transaction.date) {
            last_week += magnitude;
        }
    }

    Spending {
        today: today.amount(),
        this_week: this_week.amount(),
        last_week: last_week.amount(),
    }
}

/// The balance-bucket spending predicate: returns the normalized magnitude if the
/// transaction counts toward the spending buckets, otherwise `None`.
fn spendable(
    transaction: &Transaction,
    index: &CategoryIndex<'_>,
    exclusions: &ExclusionPolicy,
    config: &WidgetConfig,
    off_budget: &HashSet<Uuid>,
) -> Option<Milliunits> {
    if transaction.deleted || off_budget.contains(&transaction.account_id) {
        return None;
    }
    if !config.show_uncleared && !transaction.cleared.is_cleared() {
        return None;
    }
    let magnitude = transaction.spending(config.spending_sign)?;
    let located = transaction.category_id.and_then(|id| index.locate(id));
    let category_name = located.map(|(c, _)| c.name.as_str());
    let group_name = located.map(|(_, g)| g.name.as_str());
    if exclusions.excludes(category_name, group_name) {
        return None;
    }
    Some(magnitude)
}
