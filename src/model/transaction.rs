//! Transaction snapshot types, as returned by the budget API's transaction listing.

use crate::model::Milliunits;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which sign a feed uses for spending. YNAB encodes outflows as negative milliunits; some
/// other feeds encode spending as positive. The pipeline normalizes through
/// [`Transaction::spending`] so that aggregation only ever sees positive magnitudes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignConvention {
    #[default]
    SpendingNegative,
    SpendingPositive,
}

/// The cleared status of a transaction. Reconciled transactions are cleared ones that have
/// additionally been matched against a statement, so they count as cleared for filtering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearedStatus {
    Cleared,
    #[default]
    Uncleared,
    Reconciled,
}

serde_plain::derive_display_from_serialize!(ClearedStatus);
serde_plain::derive_fromstr_from_deserialize!(ClearedStatus);

impl ClearedStatus {
    pub fn is_cleared(self) -> bool {
        !matches!(self, ClearedStatus::Uncleared)
    }
}

/// One transaction from the API, immutable for the duration of a fetch cycle.
///
/// The `date` field carries calendar-date semantics only. It deserializes from the wire's
/// `YYYY-MM-DD` string straight into a `NaiveDate` so no timezone conversion can shift it by
/// a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub amount: Milliunits,
    #[serde(default)]
    pub payee_name: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    pub account_id: Uuid,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    /// Present when this transaction is one side of an inter-account transfer.
    #[serde(default)]
    pub transfer_account_id: Option<Uuid>,
    /// The matching transaction on the other account of a transfer.
    #[serde(default)]
    pub transfer_transaction_id: Option<String>,
    pub cleared: ClearedStatus,
    #[serde(default)]
    pub deleted: bool,
}

impl Transaction {
    /// True when either transfer marker is present. Transfers move money between accounts
    /// and are never spending.
    pub fn is_transfer(&self) -> bool {
        self.transfer_account_id.is_some() || self.transfer_transaction_id.is_some()
    }

    /// Normalizes the amount into a positive spending magnitude, or `None` when this
    /// transaction does not represent spending under the feed's sign convention.
    pub fn spending(&self, sign: SignConvention) -> Option<Milliunits> {
        let is_spending = match sign {
            SignConvention::SpendingNegative => self.amount.0 < 0,
            SignConvention::SpendingPositive => self.amount.0 > 0,
        };
        is_spending.then(|| self.amount.magnitude())
    }
}
