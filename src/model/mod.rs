//! Types that represent one fetch cycle's snapshot of the budget, such as `Transaction` and
//! `CategoryGroup`.

mod amount;
mod category;
mod transaction;

pub use amount::{Amount, Milliunits};
pub use category::{Account, BudgetSummary, Category, CategoryGroup, CategoryIndex};
pub use transaction::{ClearedStatus, SignConvention, Transaction};
