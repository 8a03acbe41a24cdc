//! Per-user notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Validate, ValidationError, optional_text, require_id, require_text};

/// A notification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i32,
    /// Recipient.
    pub user_id: i32,
    pub title: String,
    pub message: Option<String>,
    /// In-app link to the related entity.
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Every writable notification column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub user_id: i32,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

impl Validate for NotificationRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_id("user_id", self.user_id)?;
        require_text("title", &self.title)?;
        optional_text("link", self.link.as_deref())?;
        Ok(())
    }
}
