use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub parent_id: String,
    pub route_id: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertStudent {
    pub name: String,
    pub grade: String,
    /// Ignored for parent callers; the handler pins it to the caller's id.
    pub parent_id: Option<String>,
    pub route_id: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub is_active: Option<bool>,
}

/// Students are never deleted; deactivation goes through `is_active`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudent {
    pub name: Option<String>,
    pub grade: Option<String>,
    pub route_id: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub is_active: Option<bool>,
}
