//! Road incidents reported against assets, and their status history.

use chrono::{DateTime, Utc};
use road_assets_geometry::Geometry;
use road_assets_models::{DamageLevel, IncidentSeverity, ProcessingStatus};
use serde::{Deserialize, Serialize};

use crate::{Validate, ValidationError, optional_id, optional_text, require_text};

/// An incident row as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Primary key.
    pub id: i32,
    /// Affected asset, if known.
    pub asset_id: Option<i32>,
    /// Repair task handling this incident.
    pub task_id: Option<i32>,
    /// Short summary.
    pub title: String,
    /// Free-text report.
    pub description: Option<String>,
    /// Where the incident happened, in SRID 3405.
    pub geometry: Geometry,
    pub severity: IncidentSeverity,
    pub damage_level: DamageLevel,
    pub processing_status: ProcessingStatus,
    /// User who reported the incident.
    pub reported_by: Option<i32>,
    /// Public URL of the incident photo held by blob storage.
    pub image_url: Option<String>,
    /// Blob storage id of the incident photo.
    pub image_public_id: Option<String>,
    /// When the row was inserted.
    pub created_at: DateTime<Utc>,
    /// When the row was last replaced.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Every writable incident column, for create and full-replace update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRequest {
    #[serde(default)]
    pub asset_id: Option<i32>,
    #[serde(default)]
    pub task_id: Option<i32>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub geometry: Geometry,
    pub severity: IncidentSeverity,
    pub damage_level: DamageLevel,
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub reported_by: Option<i32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_public_id: Option<String>,
}

impl Validate for IncidentRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        self.geometry
            .validate()
            .map_err(|e| ValidationError::new("geometry", e.to_string()))?;
        optional_id("asset_id", self.asset_id)?;
        optional_id("task_id", self.task_id)?;
        optional_id("reported_by", self.reported_by)?;
        optional_text("image_url", self.image_url.as_deref())?;
        Ok(())
    }
}

/// One recorded change of an incident's processing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentHistoryEntry {
    pub id: i32,
    pub incident_id: i32,
    pub from_status: Option<ProcessingStatus>,
    pub to_status: ProcessingStatus,
    /// Authenticated user who made the change.
    pub changed_by: Option<i32>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A status change to append to an incident's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentHistoryRequest {
    #[serde(default)]
    pub from_status: Option<ProcessingStatus>,
    pub to_status: ProcessingStatus,
    #[serde(default)]
    pub changed_by: Option<i32>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Validate for IncidentHistoryRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        optional_id("changed_by", self.changed_by)?;
        optional_text("note", self.note.as_deref())?;
        if self.from_status == Some(self.to_status) {
            return Err(ValidationError::new(
                "to_status",
                format!("is the same as from_status ({})", self.to_status),
            ));
        }
        Ok(())
    }
}
