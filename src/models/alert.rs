use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Delay,
    Emergency,
    Pickup,
    Dropoff,
    General,
}

/// A single-recipient notification. There is no broadcast primitive; reaching
/// several parents means one row per recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    /// None for system-wide alerts not tied to a trip.
    pub trip_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: AlertType,
    pub message: String,
    pub is_read: bool,
    pub recipient_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAlert {
    pub trip_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: AlertType,
    pub message: String,
    pub recipient_id: Option<String>,
    pub is_read: Option<bool>,
}
