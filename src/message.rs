//! The message contract between the host, the aggregation service, and the display.
//!
//! The two halves of the widget share no memory; everything crosses these channels. The
//! variants mirror the host's socket notifications: set-config and cleanup inbound, loading,
//! update and error outbound.

use crate::config::WidgetConfig;
use crate::view::ViewModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Host → service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "payload")]
pub enum HostMessage {
    /// Replaces the session configuration wholesale and restarts resolution.
    SetConfig(WidgetConfig),
    /// Cancels timers and releases all held state. Idempotent.
    Cleanup,
}

/// Service → display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "payload")]
pub enum WidgetMessage {
    /// A fetch cycle has started. The display shows a busy state but keeps prior data.
    Loading,
    /// A complete, atomic view model.
    Update(ViewModel),
    /// A classified failure, human-readable. The display keeps the last good view model if
    /// it has one.
    Error {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl WidgetMessage {
    pub fn error(message: impl Into<String>) -> Self {
        WidgetMessage::Error {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_config_round_trips_through_json() {
        let msg = HostMessage::SetConfig(WidgetConfig::new("abc"));
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"setConfig""#));
        let back: HostMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn error_carries_message_and_timestamp() {
        let msg = WidgetMessage::error("boom");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["payload"]["message"], "boom");
        assert!(json["payload"]["timestamp"].is_string());
    }

    #[test]
    fn loading_has_no_payload_fields() {
        let json = serde_json::to_value(WidgetMessage::Loading).unwrap();
        assert_eq!(json["type"], "loading");
    }
}
