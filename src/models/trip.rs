use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Scheduled,
    Active,
    Completed,
    Delayed,
    Cancelled,
}

/// A single execution instance of a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub route_id: String,
    pub driver_id: String,
    pub status: TripStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub current_location: Option<String>,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTrip {
    pub route_id: String,
    /// Ignored for driver callers; the handler pins it to the caller's id.
    pub driver_id: Option<String>,
    /// Defaults to `active` (a created trip is a started trip).
    pub status: Option<TripStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub current_location: Option<String>,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrip {
    pub status: Option<TripStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub current_location: Option<String>,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}
