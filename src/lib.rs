/*!

A smart-mirror budget widget backed by the YNAB API.

The crate is split into two halves joined by message channels. The [`AggregationService`]
owns all network access: it resolves a budget, polls the API on an interval, reduces the raw
feed to a [`ViewModel`] and emits it. The [`Display`] owns presentation: it holds the last
view model, renders the widget markup, and runs a cosmetic rotation timer over the
recent-transactions sub-list. Neither half reaches into the other.

*/

pub mod api;
pub mod args;
mod config;
mod display;
mod error;
mod message;
pub mod model;
mod pipeline;
mod service;
mod utils;
mod view;

#[cfg(test)]
mod test;

pub use api::{connect, BudgetApi, Mode};
pub use config::{ExclusionPolicy, SpendingWindow, WidgetConfig};
pub use display::Display;
pub use error::{Result, ServiceError};
pub use message::{HostMessage, WidgetMessage};
pub use pipeline::{build_view_model, Snapshot};
pub use service::{AggregationService, ServiceState};
pub use view::{CategoryBalance, GroupSummary, RecentTransaction, Spending, ViewModel};
