#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API response types for the road asset server.
//!
//! Entity bodies are the database model types themselves; this crate holds
//! only the envelopes the API adds around them.

use chrono::{DateTime, Utc};
use road_assets_database_models::Notification;
use serde::{Deserialize, Serialize};

/// Error body returned for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable kind, e.g. `conflict`.
    pub error: String,
    /// Human-readable description.
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Payload pushed to a user's realtime stream when a notification is
/// created for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiNotificationEvent {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub message: Option<String>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for ApiNotificationEvent {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            user_id: notification.user_id,
            title: notification.title.clone(),
            message: notification.message.clone(),
            link: notification.link.clone(),
            created_at: notification.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_shape() {
        let body = serde_json::to_value(ApiError::new("not_found", "asset 3 not found")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": "not_found", "message": "asset 3 not found"})
        );
    }

    #[test]
    fn notification_event_drops_read_state() {
        let notification = Notification {
            id: 11,
            user_id: 4,
            title: "Task assigned".to_string(),
            message: None,
            link: Some("/tasks/9".to_string()),
            is_read: false,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            updated_at: None,
        };
        let event = ApiNotificationEvent::from(&notification);
        assert_eq!(event.user_id, 4);
        let body = serde_json::to_value(&event).unwrap();
        assert!(body.get("is_read").is_none());
        assert_eq!(body["link"], "/tasks/9");
    }
}
