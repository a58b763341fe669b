//! The widget configuration message.
//!
//! `WidgetConfig` is the payload of the host's set-config message. It is immutable for a
//! session: a new config message tears the service down and starts over. Field names are the
//! original module's camelCase option names so an existing host config block works unchanged.

use crate::error::{Result, ServiceError};
use crate::model::SignConvention;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_UPDATE_INTERVAL_MS: u64 = 90_000;
const DEFAULT_RECENT_DAYS: u32 = 30;
const DEFAULT_RECENT_COUNT: usize = 10;

/// How the this-week spending bucket is bounded: the most recent Sunday, or a rolling
/// window of N days ending today.
///
/// In JSON this is either the string `"calendarWeek"` or `{"rollingDays": 7}`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpendingWindow {
    #[default]
    CalendarWeek,
    RollingDays(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WidgetConfig {
    /// Personal access token. Required; everything else has a usable default.
    #[serde(default)]
    pub token: String,

    /// Explicit budget to display. When absent, the first budget on the account is used.
    #[serde(default)]
    pub budget_id: Option<Uuid>,

    /// Category names to display balances for. Unmatched names are dropped silently.
    #[serde(default)]
    pub categories: Vec<String>,

    /// Group names to force into the summaries regardless of sign. Empty means "all groups
    /// with a positive total".
    #[serde(default)]
    pub groups: Vec<String>,

    /// Exclusions applied to the spending buckets.
    #[serde(default)]
    pub excluded_categories: Vec<String>,
    #[serde(default)]
    pub excluded_groups: Vec<String>,

    /// Exclusions applied only to the recent-transactions sub-list. Deliberately independent
    /// of the balance exclusions above.
    #[serde(default)]
    pub recent_excluded_categories: Vec<String>,
    #[serde(default)]
    pub recent_excluded_groups: Vec<String>,

    /// When false, uncleared transactions are dropped everywhere.
    #[serde(default = "default_true")]
    pub show_uncleared: bool,

    /// Poll period in milliseconds.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    /// Day window for the recent-transactions sub-list.
    #[serde(default = "default_recent_days")]
    pub recent_transaction_days: u32,

    /// How many recent transactions to surface.
    #[serde(default = "default_recent_count")]
    pub recent_transaction_count: usize,

    /// When true, transactions on tracking-only (off-budget) accounts are excluded from all
    /// aggregation.
    #[serde(default)]
    pub exclude_non_budget_accounts: bool,

    /// The feed's sign convention for spending. YNAB sends outflows as negative.
    #[serde(default)]
    pub spending_sign: SignConvention,

    #[serde(default)]
    pub spending_window: SpendingWindow,
}

fn default_true() -> bool {
    true
}

fn default_update_interval() -> u64 {
    DEFAULT_UPDATE_INTERVAL_MS
}

fn default_recent_days() -> u32 {
    DEFAULT_RECENT_DAYS
}

fn default_recent_count() -> usize {
    DEFAULT_RECENT_COUNT
}

impl WidgetConfig {
    /// A minimal configuration with every optional field at its default.
    pub fn new(token: impl Into<String>) -> Self {
        serde_json::from_value(serde_json::json!({ "token": token.into() }))
            .expect("default config must deserialize")
    }

    /// Loads a configuration from a JSON file, for the standalone binary.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        crate::utils::deserialize(path).await
    }

    /// Fails with `MissingToken` when no token was supplied. No fetch is ever attempted
    /// without a token.
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(ServiceError::MissingToken);
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval)
    }

    /// The exclusion policy for the spending buckets.
    pub fn balance_exclusions(&self) -> ExclusionPolicy {
        ExclusionPolicy::new(&self.excluded_categories, &self.excluded_groups)
    }

    /// The exclusion policy for the recent-transactions sub-list, independent of
    /// [`balance_exclusions`](Self::balance_exclusions).
    pub fn recent_exclusions(&self) -> ExclusionPolicy {
        ExclusionPolicy::new(
            &self.recent_excluded_categories,
            &self.recent_excluded_groups,
        )
    }
}

/// A named set of category and group names to omit.
///
/// The widget carries two of these: one for the spending buckets and one for the
/// recent-transactions sub-list. They never share entries implicitly.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    categories: HashSet<String>,
    groups: HashSet<String>,
}

impl ExclusionPolicy {
    pub fn new(categories: &[String], groups: &[String]) -> Self {
        Self {
            categories: categories.iter().cloned().collect(),
            groups: groups.iter().cloned().collect(),
        }
    }

    /// True when the transaction's category or its owning group is excluded. Uncategorized
    /// transactions have nothing to match on and are never excluded here.
    pub fn excludes(&self, category_name: Option<&str>, group_name: Option<&str>) -> bool {
        category_name.is_some_and(|c| self.categories.contains(c))
            || group_name.is_some_and(|g| self.groups.contains(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_gets_all_defaults() {
        let config: WidgetConfig = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert_eq!(config.token, "abc");
        assert!(config.budget_id.is_none());
        assert!(config.show_uncleared);
        assert_eq!(config.update_interval, 90_000);
        assert_eq!(config.recent_transaction_days, 30);
        assert_eq!(config.recent_transaction_count, 10);
        assert!(!config.exclude_non_budget_accounts);
        assert_eq!(config.spending_window, SpendingWindow::CalendarWeek);
        assert_eq!(config.poll_interval(), Duration::from_millis(90_000));
    }

    #[test]
    fn missing_token_fails_validation() {
        let config: WidgetConfig = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ServiceError::MissingToken)
        ));

        let blank = WidgetConfig::new("   ");
        assert!(matches!(blank.validate(), Err(ServiceError::MissingToken)));

        assert!(WidgetConfig::new("abc").validate().is_ok());
    }

    #[test]
    fn spending_window_variants_parse() {
        let config: WidgetConfig =
            serde_json::from_str(r#"{"token":"t","spendingWindow":"calendarWeek"}"#).unwrap();
        assert_eq!(config.spending_window, SpendingWindow::CalendarWeek);

        let config: WidgetConfig =
            serde_json::from_str(r#"{"token":"t","spendingWindow":{"rollingDays":7}}"#).unwrap();
        assert_eq!(config.spending_window, SpendingWindow::RollingDays(7));
    }

    #[test]
    fn exclusion_policies_are_independent() {
        let config: WidgetConfig = serde_json::from_str(
            r#"{
                "token": "t",
                "excludedCategories": ["Rent"],
                "recentExcludedCategories": ["Coffee"]
            }"#,
        )
        .unwrap();
        let balance = config.balance_exclusions();
        let recent = config.recent_exclusions();
        assert!(balance.excludes(Some("Rent"), None));
        assert!(!balance.excludes(Some("Coffee"), None));
        assert!(recent.excludes(Some("Coffee"), None));
        assert!(!recent.excludes(Some("Rent"), None));
    }

    #[test]
    fn policy_matches_group_names_too() {
        let policy = ExclusionPolicy::new(&[], &["Bills".to_string()]);
        assert!(policy.excludes(Some("Rent"), Some("Bills")));
        assert!(!policy.excludes(Some("Rent"), Some("Everyday")));
        // Uncategorized spending has nothing to match.
        assert!(!policy.excludes(None, None));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let result = serde_json::from_str::<WidgetConfig>(r#"{"token":"t","tokn":"typo"}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn load_reads_a_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"token":"file-token","updateInterval":1000}"#).unwrap();
        let config = WidgetConfig::load(&path).await.unwrap();
        assert_eq!(config.token, "file-token");
        assert_eq!(config.update_interval, 1000);
    }
}
