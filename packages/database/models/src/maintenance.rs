//! Maintenance history of assets, with an optional attached document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Validate, ValidationError, optional_id, optional_non_negative, optional_text, require_id,
};

/// A maintenance record row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: i32,
    pub asset_id: i32,
    pub task_id: Option<i32>,
    pub performed_on: NaiveDate,
    pub description: Option<String>,
    pub cost: Option<f64>,
    pub performed_by: Option<String>,
    /// Public URL of the attached document held by blob storage.
    pub document_url: Option<String>,
    /// Blob storage id of the attached document.
    pub document_public_id: Option<String>,
    /// Original file name of the attached document.
    pub document_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Every writable maintenance record column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecordRequest {
    pub asset_id: i32,
    #[serde(default)]
    pub task_id: Option<i32>,
    pub performed_on: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub performed_by: Option<String>,
    #[serde(default)]
    pub document_url: Option<String>,
    #[serde(default)]
    pub document_public_id: Option<String>,
    #[serde(default)]
    pub document_name: Option<String>,
}

impl Validate for MaintenanceRecordRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_id("asset_id", self.asset_id)?;
        optional_id("task_id", self.task_id)?;
        optional_non_negative("cost", self.cost)?;
        optional_text("performed_by", self.performed_by.as_deref())?;
        if self.document_public_id.is_some() && self.document_url.is_none() {
            return Err(ValidationError::new(
                "document_url",
                "is required when document_public_id is set",
            ));
        }
        Ok(())
    }
}
