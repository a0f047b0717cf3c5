//! Typed views of payloads the site backend emits.
//!
//! The client passes payloads through as opaque JSON; consumers decode them
//! with `serde_json::from_value` when they want structure.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Live,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdateData {
    pub match_id: String,
    pub team1_score: u32,
    pub team2_score: u32,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_map: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForumAction {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumUpdateData {
    pub thread_id: String,
    pub post_id: String,
    pub user_id: String,
    pub username: String,
    pub content: String,
    pub timestamp: String,
    pub action: ForumAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Mention,
    Reply,
    Like,
    Follow,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub user_id: String,
    pub timestamp: String,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_update_from_backend_json() {
        let data: MatchUpdateData = serde_json::from_value(json!({
            "matchId": "42",
            "team1Score": 2,
            "team2Score": 1,
            "status": "live",
            "currentMap": "Yggsgard: Royal Palace",
            "timestamp": "2025-06-01T18:00:00Z"
        }))
        .unwrap();

        assert_eq!(data.match_id, "42");
        assert_eq!(data.team1_score, 2);
        assert_eq!(data.status, MatchStatus::Live);
        assert_eq!(data.current_map.as_deref(), Some("Yggsgard: Royal Palace"));
    }

    #[test]
    fn test_notification_type_field() {
        let data: NotificationData = serde_json::from_value(json!({
            "id": "n1",
            "type": "mention",
            "title": "You were mentioned",
            "message": "@tenz check this thread",
            "userId": "9",
            "timestamp": "2025-06-01T18:00:00Z",
            "read": false
        }))
        .unwrap();

        assert_eq!(data.kind, NotificationKind::Mention);
        assert_eq!(data.action_url, None);
    }

    #[test]
    fn test_forum_update_rejects_unknown_action() {
        let result = serde_json::from_value::<ForumUpdateData>(json!({
            "threadId": "1",
            "postId": "2",
            "userId": "3",
            "username": "sam",
            "content": "gg",
            "timestamp": "2025-06-01T18:00:00Z",
            "action": "archived"
        }));
        assert!(result.is_err());
    }
}
