use serde::{Deserialize, Serialize};

/// A single stop on a route. `order` is only used for display sequencing;
/// gaps and duplicates are not rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub location: String,
    pub time: String,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// At most one assigned driver at a time.
    pub driver_id: Option<String>,
    pub bus_number: Option<String>,
    #[serde(default)]
    pub stops: Vec<Stop>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertRoute {
    pub name: String,
    pub description: Option<String>,
    pub driver_id: Option<String>,
    pub bus_number: Option<String>,
    #[serde(default)]
    pub stops: Vec<Stop>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoute {
    pub name: Option<String>,
    pub description: Option<String>,
    pub driver_id: Option<String>,
    pub bus_number: Option<String>,
    pub stops: Option<Vec<Stop>>,
    pub is_active: Option<bool>,
}
