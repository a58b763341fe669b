//! Implements `BudgetApi` against the real YNAB REST API (`https://api.ynab.com/v1`).

use crate::api::BudgetApi;
use crate::error::{Result, ServiceError};
use crate::model::{Account, BudgetSummary, CategoryGroup, Transaction};
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::trace;
use url::Url;
use uuid::Uuid;

const BASE_URL: &str = "https://api.ynab.com/v1/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A thin reqwest wrapper holding the bearer token for one session.
pub(super) struct YnabClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl YnabClient {
    pub(super) fn new(token: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url = Url::parse(BASE_URL)
            .map_err(|e| ServiceError::Unknown(format!("Bad API base URL: {e}")))?;
        Ok(Self {
            http,
            base_url,
            token: token.to_string(),
        })
    }

    /// Performs a GET, unwraps the `{"data": ...}` envelope, and classifies failures.
    /// `budget` is the id to report when the API answers 404.
    async fn get<T>(&self, path: &str, query: &[(&str, String)], budget: Option<Uuid>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        trace!("GET {path}");
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ServiceError::Unknown(format!("Bad API path '{path}': {e}")))?;
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify(status, budget, &body));
        }
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

#[async_trait::async_trait]
impl BudgetApi for YnabClient {
    async fn budgets(&self) -> Result<Vec<BudgetSummary>> {
        let data: BudgetsData = self.get("budgets", &[], None).await?;
        Ok(data.budgets)
    }

    async fn accounts(&self, budget_id: Uuid) -> Result<Vec<Account>> {
        let data: AccountsData = self
            .get(&format!("budgets/{budget_id}/accounts"), &[], Some(budget_id))
            .await?;
        Ok(data.accounts)
    }

    async fn categories(&self, budget_id: Uuid) -> Result<Vec<CategoryGroup>> {
        let data: CategoriesData = self
            .get(
                &format!("budgets/{budget_id}/categories"),
                &[],
                Some(budget_id),
            )
            .await?;
        Ok(data.category_groups)
    }

    async fn transactions(
        &self,
        budget_id: Uuid,
        since_date: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        let mut query = Vec::new();
        if let Some(date) = since_date {
            query.push(("since_date", date.format("%Y-%m-%d").to_string()));
        }
        let data: TransactionsData = self
            .get(
                &format!("budgets/{budget_id}/transactions"),
                &query,
                Some(budget_id),
            )
            .await?;
        Ok(data.transactions)
    }
}

/// Every successful YNAB response wraps its payload in a `data` object.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct BudgetsData {
    budgets: Vec<BudgetSummary>,
}

#[derive(Debug, Deserialize)]
struct AccountsData {
    accounts: Vec<Account>,
}

#[derive(Debug, Deserialize)]
struct CategoriesData {
    category_groups: Vec<CategoryGroup>,
}

#[derive(Debug, Deserialize)]
struct TransactionsData {
    transactions: Vec<Transaction>,
}

/// The error body YNAB returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Maps an HTTP status (and the API's structured error body, when parseable) onto the
/// service error taxonomy.
fn classify(status: StatusCode, budget: Option<Uuid>, body: &str) -> ServiceError {
    match status {
        StatusCode::UNAUTHORIZED => ServiceError::Unauthorized,
        StatusCode::FORBIDDEN => ServiceError::Forbidden,
        StatusCode::NOT_FOUND => match budget {
            Some(id) => ServiceError::BudgetNotFound(id),
            None => ServiceError::Unknown(format!("Not found: {body}")),
        },
        StatusCode::TOO_MANY_REQUESTS => ServiceError::RateLimited,
        _ => {
            let detail = serde_json::from_str::<ApiErrorBody>(body)
                .ok()
                .and_then(|b| b.error.detail.or(b.error.name))
                .unwrap_or_else(|| body.to_string());
            ServiceError::Unknown(format!("YNAB API error {status}: {detail}"))
        }
    }
}
