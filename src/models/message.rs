use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directed message between two users. Threading is a soft self-reference via
/// `parent_message_id`; a "conversation" is derived at query time from the
/// sender/recipient pair, there is no conversation entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub subject: String,
    pub content: String,
    pub is_read: bool,
    pub parent_message_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertMessage {
    pub recipient_id: String,
    pub subject: String,
    pub content: String,
    pub parent_message_id: Option<String>,
}
