// parameter-optimizer-rs/src/notify.rs
// Structured notification payload for the external webhook boundary.
// Building the payload is in scope; delivering it is not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RecommendationSnapshot;

const COLOR_ALERT: u32 = 0xFF0000;
const COLOR_OK: u32 = 0x00FF00;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<NotificationField>,
    pub footer: String,
    pub timestamp: DateTime<Utc>,
}

impl NotificationPayload {
    /// Report for one tuning run: red when any high-severity
    /// recommendation exists, green otherwise.
    pub fn tuning_report(snapshot: &RecommendationSnapshot) -> Self {
        let field = |name: &str, value: String| NotificationField {
            name: name.to_string(),
            value,
            inline: true,
        };

        Self {
            title: "Auto-Tune Report".to_string(),
            description: format!(
                "{} recommendation(s) generated, {} safe to apply",
                snapshot.summary.total, snapshot.summary.safe
            ),
            color: if snapshot.summary.high_severity > 0 {
                COLOR_ALERT
            } else {
                COLOR_OK
            },
            fields: vec![
                field("Executions", snapshot.stats.total_executions.to_string()),
                field("Success Rate", snapshot.stats.success_rate.clone()),
                field("Recommendations", snapshot.summary.total.to_string()),
                field("Safe", snapshot.summary.safe.to_string()),
            ],
            footer: "Advisory only, changes are never auto-applied".to_string(),
            timestamp: snapshot.timestamp,
        }
    }
}
