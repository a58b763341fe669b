//! The display half of the widget: presentation only.
//!
//! Holds the last received view model and renders it to the mirror's markup. A local
//! rotation timer scrolls a three-row window across the recent-transactions sub-list; it is
//! purely cosmetic, works only on the last snapshot, and never triggers a fetch. A failed
//! refresh never clears data that is already on screen.

use crate::message::WidgetMessage;
use crate::view::ViewModel;
use std::fmt::Write as _;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::trace;

/// How many recent-transaction rows are visible at once.
const VISIBLE_ROWS: usize = 3;
/// Row height in pixels, must match the stylesheet.
const ROW_HEIGHT_PX: usize = 20;
const ROTATION_PERIOD: Duration = Duration::from_secs(15);

pub struct Display {
    rx: mpsc::Receiver<WidgetMessage>,
    result: Option<ViewModel>,
    loading: bool,
    error: Option<String>,
    rotation_index: usize,
}

impl Display {
    pub fn new(rx: mpsc::Receiver<WidgetMessage>) -> Self {
        Self {
            rx,
            result: None,
            loading: true,
            error: None,
            rotation_index: 0,
        }
    }

    /// Runs until the service channel closes, pushing fresh markup into `sink` whenever
    /// something visible changed.
    pub async fn run(mut self, mut sink: impl FnMut(String)) {
        let mut rotation = tokio::time::interval(ROTATION_PERIOD);
        rotation.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                message = self.rx.recv() => match message {
                    Some(message) => {
                        self.apply(message);
                        sink(self.render());
                    }
                    None => break,
                },
                _ = rotation.tick() => {
                    if self.rotate() {
                        sink(self.render());
                    }
                }
            }
        }
    }

    /// Applies one message from the service to the held state.
    fn apply(&mut self, message: WidgetMessage) {
        trace!(?message, "display received message");
        match message {
            WidgetMessage::Update(view) => {
                self.result = Some(view);
                self.loading = false;
                self.error = None;
                self.clamp_rotation();
            }
            WidgetMessage::Error { message, .. } => {
                // Keep whatever is already on screen; the last good view model stands.
                self.error = Some(message);
                self.loading = false;
            }
            WidgetMessage::Loading => {
                self.loading = true;
            }
        }
    }

    /// Advances the rotation window by one row, wrapping to the top. Returns whether the
    /// visible window moved.
    fn rotate(&mut self) -> bool {
        let Some(result) = &self.result else {
            return false;
        };
        let count = result.recent_transactions.len();
        if count <= VISIBLE_ROWS {
            return false;
        }
        let max_index = count - VISIBLE_ROWS;
        self.rotation_index = if self.rotation_index >= max_index {
            0
        } else {
            self.rotation_index + 1
        };
        true
    }

    fn clamp_rotation(&mut self) {
        let count = self
            .result
            .as_ref()
            .map(|r| r.recent_transactions.len())
            .unwrap_or(0);
        let max_index = count.saturating_sub(VISIBLE_ROWS);
        self.rotation_index = self.rotation_index.min(max_index);
    }

    /// Renders the widget markup from the held state.
    pub fn render(&self) -> String {
        let Some(result) = &self.result else {
            if let Some(error) = &self.error {
                return format!(r#"<div class="ynab-error">Error: {error}</div>"#);
            }
            return r#"<div class="ynab-loading">Loading YNAB...</div>"#.to_string();
        };

        if result.items.is_empty() && result.group_summaries.is_empty() {
            return r#"<div class="ynab-no-data">No category data available</div>"#.to_string();
        }

        let mut html = String::new();
        self.render_spending(result, &mut html);
        self.render_balances(result, &mut html);

        if let Some(error) = &self.error {
            let _ = write!(html, r#"<div class="ynab-error-subtle">{error}</div>"#);
        }
        if self.loading {
            html.push_str(r#"<div class="ynab-loading-subtle">Updating...</div>"#);
        }
        html
    }

    fn render_spending(&self, result: &ViewModel, html: &mut String) {
        html.push_str(r#"<div class="ynab-section">"#);
        html.push_str(r#"<div class="ynab-section-title">Spending</div>"#);

        let spending = &result.spending;
        if spending.today.is_positive() {
            let _ = write!(
                html,
                r#"<div class="ynab-row"><span class="ynab-name">Today</span><span class="ynab-balance spending">({})</span></div>"#,
                spending.today
            );
        }
        if spending.this_week.is_positive() {
            let _ = write!(
                html,
                r#"<div class="ynab-row"><span class="ynab-name">This Week</span><span class="ynab-balance spending">({})</span></div>"#,
                spending.this_week
            );
        }

        if !result.recent_transactions.is_empty() {
            let _ = write!(
                html,
                r#"<div class="ynab-subsection"><div class="ynab-subsection-title">Recent {}</div>"#,
                result.recent_transactions.len()
            );
            html.push_str(r#"<div class="ynab-transactions-wrapper">"#);
            let offset = self.rotation_index * ROW_HEIGHT_PX;
            let _ = write!(
                html,
                r#"<div class="ynab-transactions-container" style="transform: translateY(-{offset}px);">"#
            );
            for (index, transaction) in result.recent_transactions.iter().enumerate() {
                let _ = write!(
                    html,
                    r#"<div class="ynab-row ynab-sub" data-index="{index}"><span class="ynab-name">{} - {}</span><span class="ynab-balance spending">({})</span></div>"#,
                    transaction.date.format("%-m/%y"),
                    transaction.payee,
                    transaction.amount
                );
            }
            html.push_str("</div></div></div>");
        }

        html.push_str("</div>");
    }

    fn render_balances(&self, result: &ViewModel, html: &mut String) {
        html.push_str(r#"<div class="ynab-section">"#);
        html.push_str(r#"<div class="ynab-section-title">Category Balances</div>"#);

        for item in &result.items {
            let class = if item.balance.is_negative() {
                "ynab-balance negative"
            } else {
                "ynab-balance"
            };
            let _ = write!(
                html,
                r#"<div class="ynab-row"><span class="ynab-name">{}</span><span class="{class}">{}</span></div>"#,
                item.name, item.balance
            );
        }

        for group in &result.group_summaries {
            let _ = write!(
                html,
                r#"<div class="ynab-row ynab-group"><span class="ynab-name">{}</span><span class="ynab-balance">{}</span></div>"#,
                group.name, group.total_available
            );
        }

        html.push_str("</div>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Milliunits;
    use crate::test::date;
    use crate::view::{CategoryBalance, RecentTransaction, Spending};

    fn display() -> Display {
        let (_tx, rx) = mpsc::channel(1);
        Display::new(rx)
    }

    fn sample_view(recent_count: usize) -> ViewModel {
        ViewModel {
            items: vec![
                CategoryBalance {
                    name: "Groceries".to_string(),
                    balance: Milliunits(45230).amount(),
                },
                CategoryBalance {
                    name: "Rent".to_string(),
                    balance: Milliunits(-120_000).amount(),
                },
            ],
            spending: Spending {
                today: Milliunits(12000).amount(),
                this_week: Milliunits(30000).amount(),
                last_week: Milliunits(0).amount(),
            },
            group_summaries: vec![],
            recent_transactions: (0..recent_count)
                .map(|i| RecentTransaction {
                    payee: format!("Payee {i}"),
                    amount: Milliunits(1000).amount(),
                    date: date("2026-08-29"),
                    category: None,
                })
                .collect(),
            total_categories: 2,
            matched_categories: 2,
        }
    }

    #[test]
    fn shows_loading_before_any_data() {
        let d = display();
        assert!(d.render().contains("Loading YNAB"));
    }

    #[test]
    fn error_replaces_the_view_only_before_first_data() {
        let mut d = display();
        d.apply(WidgetMessage::error("token rejected"));
        assert!(d.render().contains("Error: token rejected"));
        assert!(!d.render().contains("ynab-section"));
    }

    #[test]
    fn failed_refresh_leaves_the_last_view_standing() {
        let mut d = display();
        d.apply(WidgetMessage::Update(sample_view(0)));
        d.apply(WidgetMessage::error("network down"));
        let html = d.render();
        // The data is still there, with the error as a secondary indicator.
        assert!(html.contains("Groceries"));
        assert!(html.contains("$45.23"));
        assert!(html.contains("ynab-error-subtle"));
        assert!(!html.contains(r#"class="ynab-error""#));
    }

    #[test]
    fn renders_balances_spending_and_negative_class() {
        let mut d = display();
        d.apply(WidgetMessage::Update(sample_view(0)));
        let html = d.render();
        assert!(html.contains("Category Balances"));
        assert!(html.contains(r#"<span class="ynab-balance">$45.23</span>"#));
        assert!(html.contains(r#"<span class="ynab-balance negative">-$120.00</span>"#));
        assert!(html.contains("($12.00)"));
        assert!(html.contains("($30.00)"));
    }

    #[test]
    fn loading_after_data_is_a_subtle_indicator() {
        let mut d = display();
        d.apply(WidgetMessage::Update(sample_view(0)));
        d.apply(WidgetMessage::Loading);
        let html = d.render();
        assert!(html.contains("ynab-loading-subtle"));
        assert!(html.contains("Groceries"));
        assert!(!html.contains("Loading YNAB"));
    }

    #[test]
    fn rotation_advances_and_wraps() {
        let mut d = display();
        d.apply(WidgetMessage::Update(sample_view(5)));
        // Five rows, three visible: indexes 0, 1, 2, then back to 0.
        assert!(d.rotate());
        assert_eq!(d.rotation_index, 1);
        assert!(d.rotate());
        assert_eq!(d.rotation_index, 2);
        assert!(d.rotate());
        assert_eq!(d.rotation_index, 0);
        assert!(d.render().contains("translateY(-0px)"));
    }

    #[test]
    fn rotation_is_a_no_op_when_everything_fits() {
        let mut d = display();
        d.apply(WidgetMessage::Update(sample_view(3)));
        assert!(!d.rotate());
        assert_eq!(d.rotation_index, 0);
    }

    #[test]
    fn rotation_index_clamps_when_a_shorter_list_arrives() {
        let mut d = display();
        d.apply(WidgetMessage::Update(sample_view(10)));
        for _ in 0..7 {
            d.rotate();
        }
        assert_eq!(d.rotation_index, 7);
        d.apply(WidgetMessage::Update(sample_view(4)));
        assert_eq!(d.rotation_index, 1);
    }

    #[test]
    fn rotation_offset_appears_in_the_markup() {
        let mut d = display();
        d.apply(WidgetMessage::Update(sample_view(5)));
        d.rotate();
        assert!(d.render().contains("translateY(-20px)"));
    }

    #[test]
    fn empty_view_model_reports_no_data() {
        let mut d = display();
        d.apply(WidgetMessage::Update(ViewModel::default()));
        assert!(d.render().contains("No category data available"));
    }
}
