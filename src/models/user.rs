use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account roles. A user's role is fixed at sign-up; there is no update path
/// that can change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Admin,
    Driver,
    Manager,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// Bcrypt hash. Never serialized into any response payload.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Sign-up payload; the password arrives in the clear and is hashed before it
/// reaches the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
}

/// Partial user update. Email, password and role are deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub phone: Option<String>,
}
