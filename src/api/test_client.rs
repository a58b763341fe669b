//! Implements `BudgetApi` with in-memory data for testing.
//!
//! Note: this is compiled even in the "production" version of the widget so the whole thing
//! can run top-to-bottom without a YNAB account (see `Mode::Test`).

use crate::api::BudgetApi;
use crate::error::{Result, ServiceError};
use crate::model::{
    Account, BudgetSummary, Category, CategoryGroup, ClearedStatus, Milliunits, Transaction,
};
use chrono::{Days, Local, NaiveDate};
use std::sync::Mutex;
use uuid::Uuid;

/// Which taxonomy error the next call(s) should fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unauthorized,
    Forbidden,
    NotFound,
    RateLimited,
    Unknown,
}

impl FailureKind {
    fn to_error(self, budget: Uuid) -> ServiceError {
        match self {
            FailureKind::Unauthorized => ServiceError::Unauthorized,
            FailureKind::Forbidden => ServiceError::Forbidden,
            FailureKind::NotFound => ServiceError::BudgetNotFound(budget),
            FailureKind::RateLimited => ServiceError::RateLimited,
            FailureKind::Unknown => ServiceError::Unknown("injected failure".to_string()),
        }
    }
}

/// Counts of API calls made, for asserting on fetch behavior.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub budgets: usize,
    pub accounts: usize,
    pub categories: usize,
    pub transactions: usize,
}

#[derive(Debug, Default)]
struct State {
    budgets: Vec<BudgetSummary>,
    accounts: Vec<Account>,
    groups: Vec<CategoryGroup>,
    transactions: Vec<Transaction>,
    failure: Option<FailureKind>,
    fail_once: bool,
    calls: Calls,
}

/// An implementation of `BudgetApi` that holds its listings in memory.
#[derive(Debug, Default)]
pub struct TestApi {
    state: Mutex<State>,
}

impl TestApi {
    /// An empty account: no budgets, no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// A demo budget with a few groups and recent, today-relative transactions so that the
    /// standalone binary shows something meaningful in test mode.
    pub fn seeded() -> Self {
        let api = Self::new();
        let budget = BudgetSummary {
            id: Uuid::new_v4(),
            name: "Demo Budget".to_string(),
        };
        let everyday = demo_group(
            "Everyday Expenses",
            &[("Groceries", 45230), ("Dining Out", 12750), ("Fun Money", 8000)],
        );
        let bills = demo_group("Monthly Bills", &[("Rent", 0), ("Utilities", 15500)]);
        let today = Local::now().date_naive();
        let groceries = everyday.categories[0].clone();
        let dining = everyday.categories[1].clone();
        let account = Account {
            id: Uuid::new_v4(),
            name: "Checking".to_string(),
            on_budget: true,
            closed: false,
            deleted: false,
        };
        let transactions = vec![
            demo_tx(today, -12340, "Corner Market", &groceries, account.id),
            demo_tx(
                today.checked_sub_days(Days::new(1)).unwrap_or(today),
                -8250,
                "Taqueria",
                &dining,
                account.id,
            ),
            demo_tx(
                today.checked_sub_days(Days::new(3)).unwrap_or(today),
                -30990,
                "Grocery Depot",
                &groceries,
                account.id,
            ),
        ];
        api.set_budgets(vec![budget]);
        api.set_accounts(vec![account]);
        api.set_groups(vec![everyday, bills]);
        api.set_transactions(transactions);
        api
    }

    pub fn set_budgets(&self, budgets: Vec<BudgetSummary>) {
        self.state.lock().unwrap().budgets = budgets;
    }

    pub fn set_accounts(&self, accounts: Vec<Account>) {
        self.state.lock().unwrap().accounts = accounts;
    }

    pub fn set_groups(&self, groups: Vec<CategoryGroup>) {
        self.state.lock().unwrap().groups = groups;
    }

    pub fn set_transactions(&self, transactions: Vec<Transaction>) {
        self.state.lock().unwrap().transactions = transactions;
    }

    /// Makes every subsequent call fail with `kind` until cleared.
    pub fn fail_with(&self, kind: FailureKind) {
        let mut state = self.state.lock().unwrap();
        state.failure = Some(kind);
        state.fail_once = false;
    }

    /// Makes exactly the next call fail with `kind`.
    pub fn fail_once(&self, kind: FailureKind) {
        let mut state = self.state.lock().unwrap();
        state.failure = Some(kind);
        state.fail_once = true;
    }

    pub fn clear_failure(&self) {
        self.state.lock().unwrap().failure = None;
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls
    }

    fn check_failure(&self, budget: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(kind) = state.failure {
            if state.fail_once {
                state.failure = None;
            }
            return Err(kind.to_error(budget));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl BudgetApi for TestApi {
    async fn budgets(&self) -> Result<Vec<BudgetSummary>> {
        self.state.lock().unwrap().calls.budgets += 1;
        self.check_failure(Uuid::nil())?;
        Ok(self.state.lock().unwrap().budgets.clone())
    }

    async fn accounts(&self, budget_id: Uuid) -> Result<Vec<Account>> {
        self.state.lock().unwrap().calls.accounts += 1;
        self.check_failure(budget_id)?;
        Ok(self.state.lock().unwrap().accounts.clone())
    }

    async fn categories(&self, budget_id: Uuid) -> Result<Vec<CategoryGroup>> {
        self.state.lock().unwrap().calls.categories += 1;
        self.check_failure(budget_id)?;
        Ok(self.state.lock().unwrap().groups.clone())
    }

    async fn transactions(
        &self,
        budget_id: Uuid,
        since_date: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        self.state.lock().unwrap().calls.transactions += 1;
        self.check_failure(budget_id)?;
        let transactions = self.state.lock().unwrap().transactions.clone();
        Ok(match since_date {
            Some(since) => transactions.into_iter().filter(|t| t.date >= since).collect(),
            None => transactions,
        })
    }
}

fn demo_group(name: &str, categories: &[(&str, i64)]) -> CategoryGroup {
    let group_id = Uuid::new_v4();
    CategoryGroup {
        id: group_id,
        name: name.to_string(),
        hidden: false,
        deleted: false,
        categories: categories
            .iter()
            .map(|(cat_name, balance)| Category {
                id: Uuid::new_v4(),
                category_group_id: group_id,
                name: cat_name.to_string(),
                balance: Milliunits(*balance),
                hidden: false,
                deleted: false,
            })
            .collect(),
    }
}

fn demo_tx(
    date: NaiveDate,
    amount: i64,
    payee: &str,
    category: &Category,
    account_id: Uuid,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        date,
        amount: Milliunits(amount),
        payee_name: Some(payee.to_string()),
        memo: None,
        account_id,
        category_id: Some(category.id),
        transfer_account_id: None,
        transfer_transaction_id: None,
        cleared: ClearedStatus::Cleared,
        deleted: false,
    }
}
