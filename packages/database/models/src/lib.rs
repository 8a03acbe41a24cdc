#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Entity records and write requests for the road asset database.
//!
//! Each entity has a record type (a fully materialized row, including
//! server-assigned `id` and timestamps) and a request type carrying every
//! writable column. Requests are used for both create and full-replace
//! update, and implement [`Validate`] so malformed input is rejected before
//! any store round trip.
//!
//! Field names are `snake_case` and shared with the REST API.

pub mod asset;
pub mod budget;
pub mod category;
pub mod incident;
pub mod maintenance;
pub mod notification;
pub mod task;
pub mod user;

pub use asset::{Asset, AssetRequest};
pub use budget::{Budget, BudgetRequest, Cost, CostRequest};
pub use category::{AssetCategory, AssetCategoryRequest};
pub use incident::{Incident, IncidentHistoryEntry, IncidentHistoryRequest, IncidentRequest};
pub use maintenance::{MaintenanceRecord, MaintenanceRecordRequest};
pub use notification::{Notification, NotificationRequest};
pub use task::{Task, TaskRequest};
pub use user::{User, UserRequest};

/// A request field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error for `field`.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Synchronous input validation run before any store call.
pub trait Validate {
    /// Checks required fields and domain ranges.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Rejects empty or whitespace-only text.
///
/// # Errors
///
/// Returns [`ValidationError`] if `value` is blank.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    Ok(())
}

/// Like [`require_text`], but absent values pass.
///
/// # Errors
///
/// Returns [`ValidationError`] if `value` is present and blank.
pub fn optional_text(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| require_text(field, v))
}

/// Rejects negative or non-finite numbers.
///
/// # Errors
///
/// Returns [`ValidationError`] if `value` is negative, NaN or infinite.
pub fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(ValidationError::new(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(())
}

/// Like [`non_negative`], but absent values pass.
///
/// # Errors
///
/// Returns [`ValidationError`] if `value` is present and invalid.
pub fn optional_non_negative(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| non_negative(field, v))
}

/// Rejects ids that cannot be primary keys (zero or negative).
///
/// # Errors
///
/// Returns [`ValidationError`] if `value` is not positive.
pub fn require_id(field: &'static str, value: i32) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::new(
            field,
            format!("must be a positive id, got {value}"),
        ));
    }
    Ok(())
}

/// Like [`require_id`], but absent values pass.
///
/// # Errors
///
/// Returns [`ValidationError`] if `value` is present and not positive.
pub fn optional_id(field: &'static str, value: Option<i32>) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| require_id(field, v))
}
