use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A persisted message as returned by the REST collaborator.
///
/// This is the authoritative record; the live connection only carries
/// notification copies of it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub id: i64,
    pub channel_id: i64,
    pub user_id: i64,
    pub content: String,
    #[serde(default)]
    pub edited: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub thread_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sender_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_record_with_optional_fields_missing() {
        let raw = r#"{
            "id": 12,
            "channel_id": 3,
            "user_id": 7,
            "content": "hello",
            "created_at": "2025-01-05T10:00:00Z"
        }"#;

        let message: Message = serde_json::from_str(raw).expect("record should decode");

        assert_eq!(message.id, 12);
        assert!(!message.edited);
        assert!(!message.deleted);
        assert_eq!(message.thread_id, None);
        assert_eq!(message.sender_name, None);
    }
}
