//! The aggregation service: owns the configuration and the poll timer, talks to the budget
//! API, and emits view models over the outbound channel.
//!
//! Lifecycle: `Uninitialized → Resolving → Polling`, with `Failed` reached on a fatal
//! configuration or resolution error. A new set-config message restarts everything from
//! scratch; cleanup is idempotent from any state. Only one fetch cycle is ever in flight:
//! the run loop awaits each cycle inline, so a tick that fires during a slow cycle simply
//! runs late.

use crate::api::{self, BudgetApi, Mode};
use crate::config::WidgetConfig;
use crate::error::{Result, ServiceError};
use crate::message::{HostMessage, WidgetMessage};
use crate::pipeline::{self, Snapshot};
use crate::view::ViewModel;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Uninitialized,
    Resolving,
    Polling,
    Failed,
}

serde_plain::derive_display_from_serialize!(ServiceState);

/// Everything owned for one configured session. Replaced wholesale when a new config
/// message arrives, dropped on cleanup.
struct Session {
    api: Arc<dyn BudgetApi>,
    config: WidgetConfig,
    budget_id: Uuid,
}

pub struct AggregationService {
    mode: Mode,
    /// When set, used instead of `api::connect` so tests and embedders can supply a
    /// client directly.
    api_override: Option<Arc<dyn BudgetApi>>,
    rx: mpsc::Receiver<HostMessage>,
    tx: mpsc::Sender<WidgetMessage>,
    state: ServiceState,
    session: Option<Session>,
    next_poll: Option<Instant>,
    /// True while a suppressed rate-limit retry is waiting for the next hour boundary.
    retry_pending: bool,
}

impl AggregationService {
    pub fn new(
        mode: Mode,
        rx: mpsc::Receiver<HostMessage>,
        tx: mpsc::Sender<WidgetMessage>,
    ) -> Self {
        Self {
            mode,
            api_override: None,
            rx,
            tx,
            state: ServiceState::Uninitialized,
            session: None,
            next_poll: None,
            retry_pending: false,
        }
    }

    /// Like [`new`](Self::new) but with an explicit API client.
    pub fn with_api(
        api: Arc<dyn BudgetApi>,
        rx: mpsc::Receiver<HostMessage>,
        tx: mpsc::Sender<WidgetMessage>,
    ) -> Self {
        let mut service = Self::new(Mode::Test, rx, tx);
        service.api_override = Some(api);
        service
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Runs until the host channel closes. Cleans up on the way out.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                message = self.rx.recv() => match message {
                    Some(HostMessage::SetConfig(config)) => self.initialize(config).await,
                    Some(HostMessage::Cleanup) => self.cleanup(),
                    None => {
                        self.cleanup();
                        break;
                    }
                },
                _ = wait_for(self.next_poll) => self.poll().await,
            }
        }
    }

    /// Handles a set-config message: tears down any existing session, resolves the budget,
    /// runs one immediate fetch cycle, and starts the poll timer.
    async fn initialize(&mut self, config: WidgetConfig) {
        self.cleanup();

        if let Err(e) = config.validate() {
            self.fail(e).await;
            return;
        }

        let api = match &self.api_override {
            Some(api) => Arc::clone(api),
            None => match api::connect(self.mode, &config.token) {
                Ok(api) => api,
                Err(e) => {
                    self.fail(e).await;
                    return;
                }
            },
        };

        self.transition(ServiceState::Resolving);
        let budget_id = match resolve_budget(api.as_ref(), &config).await {
            Ok(id) => id,
            Err(e) => {
                self.fail(e).await;
                return;
            }
        };
        debug!(%budget_id, "budget resolved");

        self.session = Some(Session {
            api,
            config,
            budget_id,
        });
        self.transition(ServiceState::Polling);
        self.poll().await;
    }

    /// Runs one fetch cycle and re-arms the timer. Failures other than rate limiting are
    /// surfaced as error messages and leave the normal schedule in place; rate limiting
    /// silently defers the next attempt to the top of the next hour.
    async fn poll(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let interval = session.config.poll_interval();

        self.emit(WidgetMessage::Loading).await;
        let today = Local::now().date_naive();
        match fetch_cycle(session.api.as_ref(), session.budget_id, &session.config, today).await {
            Ok(view) => {
                self.retry_pending = false;
                self.next_poll = Some(Instant::now() + interval);
                self.emit(WidgetMessage::Update(view)).await;
            }
            Err(ServiceError::RateLimited) => {
                let wait = until_next_hour(Local::now().naive_local());
                warn!(
                    wait_secs = wait.as_secs(),
                    "rate limited, deferring one retry to the next hour boundary"
                );
                self.retry_pending = true;
                self.next_poll = Some(Instant::now() + wait);
            }
            Err(e) => {
                warn!(error = %e, "fetch cycle failed");
                self.next_poll = Some(Instant::now() + interval);
                self.emit(WidgetMessage::error(e.to_string())).await;
            }
        }
    }

    /// Cancels the timer and releases all held state. Safe to call repeatedly and from any
    /// state.
    fn cleanup(&mut self) {
        self.session = None;
        self.next_poll = None;
        self.retry_pending = false;
        if self.state != ServiceState::Uninitialized {
            self.transition(ServiceState::Uninitialized);
            info!("cleanup completed");
        }
    }

    async fn fail(&mut self, error: ServiceError) {
        warn!(error = %error, "fatal configuration error");
        self.transition(ServiceState::Failed);
        self.emit(WidgetMessage::error(error.to_string())).await;
    }

    fn transition(&mut self, to: ServiceState) {
        debug!(from = %self.state, to = %to, "state transition");
        self.state = to;
    }

    async fn emit(&self, message: WidgetMessage) {
        if self.tx.send(message).await.is_err() {
            warn!("display channel closed, dropping message");
        }
    }
}

/// Sleeps until `at`, or forever when no poll is scheduled.
async fn wait_for(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Resolves the budget to display: an explicit identifier is used directly with no network
/// call, otherwise the first budget on the account wins.
async fn resolve_budget(api: &dyn BudgetApi, config: &WidgetConfig) -> Result<Uuid> {
    if let Some(id) = config.budget_id {
        return Ok(id);
    }
    let budgets = api.budgets().await?;
    match budgets.first() {
        Some(budget) => Ok(budget.id),
        None => Err(ServiceError::NoBudgetsFound),
    }
}

/// One fetch cycle: categories and transactions (and accounts when tracking accounts are
/// excluded) fetched concurrently, all-or-nothing, then aggregated into a view model.
async fn fetch_cycle(
    api: &dyn BudgetApi,
    budget_id: Uuid,
    config: &WidgetConfig,
    today: chrono::NaiveDate,
) -> Result<ViewModel> {
    let since = pipeline::lookback_start(config, today);
    let (groups, transactions, accounts) = tokio::try_join!(
        api.categories(budget_id),
        api.transactions(budget_id, Some(since)),
        async {
            if config.exclude_non_budget_accounts {
                api.accounts(budget_id).await
            } else {
                Ok(Vec::new())
            }
        },
    )?;
    let snapshot = Snapshot {
        groups,
        transactions,
        accounts,
    };
    Ok(pipeline::build_view_model(&snapshot, config, today))
}

/// The delay from `now` until the start of the next hour. A retry deferred at 14:23 runs
/// at 15:00; one deferred exactly at 15:00 runs at 16:00.
fn until_next_hour(now: NaiveDateTime) -> Duration {
    let next = (now + chrono::Duration::hours(1))
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now + chrono::Duration::hours(1));
    (next - now).to_std().unwrap_or(Duration::from_secs(3600))
}
