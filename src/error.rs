//! The error taxonomy for the aggregation service.
//!
//! Everything the service can fail with is classified into one of these variants so the
//! scheduler can decide what to do: most errors are surfaced to the display as an `Error`
//! message and the next scheduled poll retries naturally, while `RateLimited` triggers a
//! silent deferred retry instead (see `service`).

use uuid::Uuid;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The configuration message arrived without a personal access token.
    #[error("YNAB token is required")]
    MissingToken,

    /// The token is valid but the account owns no budgets.
    #[error("No budgets found in YNAB account")]
    NoBudgetsFound,

    /// The API rejected the token (HTTP 401).
    #[error("YNAB rejected the access token")]
    Unauthorized,

    /// The token does not grant access to the requested resource (HTTP 403).
    #[error("The access token does not have permission for this budget")]
    Forbidden,

    /// The budget id does not exist for this account (HTTP 404).
    #[error("Budget {0} was not found")]
    BudgetNotFound(Uuid),

    /// Too many requests (HTTP 429). Never surfaced to the display; the service schedules
    /// one suppressed retry at the next hour boundary instead.
    #[error("Rate limited by the YNAB API")]
    RateLimited,

    /// A transport-level failure (DNS, TLS, connection reset, body decode).
    #[error("Network error talking to YNAB: {0}")]
    Network(#[from] reqwest::Error),

    /// Anything the taxonomy does not classify, carrying whatever detail the API gave us.
    #[error("{0}")]
    Unknown(String),
}

impl ServiceError {
    /// True for the one variant that must not be surfaced as an `Error` message.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ServiceError::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_the_only_suppressed_variant() {
        assert!(ServiceError::RateLimited.is_rate_limited());
        assert!(!ServiceError::MissingToken.is_rate_limited());
        assert!(!ServiceError::Unknown("x".into()).is_rate_limited());
    }

    #[test]
    fn display_messages_are_human_readable() {
        assert_eq!(
            ServiceError::MissingToken.to_string(),
            "YNAB token is required"
        );
        let id = Uuid::nil();
        assert_eq!(
            ServiceError::BudgetNotFound(id).to_string(),
            format!("Budget {id} was not found")
        );
    }
}
