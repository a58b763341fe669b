//! The external budgeting API collaborator, hidden behind the `BudgetApi` trait.
//!
//! The service only ever talks to `Arc<dyn BudgetApi>`, so the whole widget can run
//! top-to-bottom against the in-memory test client without touching the network.

mod test_client;
mod ynab;

pub use test_client::{FailureKind, TestApi};

use crate::error::Result;
use crate::model::{Account, BudgetSummary, CategoryGroup, Transaction};
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

/// Read-only access to the budgeting API. All listings are snapshots; nothing is cached at
/// this layer.
#[async_trait::async_trait]
pub trait BudgetApi: Send + Sync {
    /// Budgets belonging to the token's account, in the API's order.
    async fn budgets(&self) -> Result<Vec<BudgetSummary>>;

    /// Accounts of a budget, needed only when tracking accounts are excluded.
    async fn accounts(&self, budget_id: Uuid) -> Result<Vec<Account>>;

    /// Category groups with nested categories and balances.
    async fn categories(&self, budget_id: Uuid) -> Result<Vec<CategoryGroup>>;

    /// Transactions, optionally limited to on/after `since_date`.
    async fn transactions(
        &self,
        budget_id: Uuid,
        since_date: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>>;
}

/// Whether to use the real YNAB API or the in-memory test client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Live,
    Test,
}

impl Mode {
    /// When `YNAB_MIRROR_IN_TEST_MODE` is set and non-empty the whole widget runs against
    /// seeded in-memory data instead of the YNAB API.
    pub fn from_env() -> Self {
        match std::env::var("YNAB_MIRROR_IN_TEST_MODE") {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Live,
        }
    }
}

/// Creates the API client for `mode`.
pub fn connect(mode: Mode, token: &str) -> Result<Arc<dyn BudgetApi>> {
    match mode {
        Mode::Live => Ok(Arc::new(ynab::YnabClient::new(token)?)),
        Mode::Test => Ok(Arc::new(TestApi::seeded())),
    }
}
