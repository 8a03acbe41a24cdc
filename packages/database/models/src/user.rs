//! System users. Credentials live with the authentication service.

use chrono::{DateTime, Utc};
use road_assets_models::UserRole;
use serde::{Deserialize, Serialize};

use crate::{Validate, ValidationError, optional_text, require_text};

/// A user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    /// Unique login name.
    pub username: String,
    /// Unique contact address.
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: UserRole,
    /// Organisational unit the user belongs to.
    pub unit: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// Every writable user column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Validate for UserRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("username", &self.username)?;
        if self.username.chars().any(char::is_whitespace) {
            return Err(ValidationError::new("username", "must not contain spaces"));
        }
        if let Some(email) = &self.email {
            let valid = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
            if !valid {
                return Err(ValidationError::new(
                    "email",
                    format!("\"{email}\" is not an email address"),
                ));
            }
        }
        optional_text("full_name", self.full_name.as_deref())?;
        Ok(())
    }
}
