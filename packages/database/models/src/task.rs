//! Maintenance and repair tasks.

use chrono::{DateTime, NaiveDate, Utc};
use road_assets_geometry::Geometry;
use road_assets_models::{TaskPriority, TaskStatus};
use serde::{Deserialize, Serialize};

use crate::{Validate, ValidationError, optional_id, optional_text, require_text};

/// A task row as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Primary key.
    pub id: i32,
    /// Short summary of the work.
    pub title: String,
    /// Work classification (resurfacing, drainage, signage, ...).
    pub work_type: Option<String>,
    pub description: Option<String>,
    /// Work site, in SRID 3405.
    pub geometry: Geometry,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    /// Asset the work is carried out on.
    pub asset_id: Option<i32>,
    /// Budget funding the executing unit.
    pub execution_unit_id: Option<i32>,
    /// Supervising user.
    pub supervisor_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    /// Outcome reported on completion.
    pub result: Option<String>,
    /// Closing summary.
    pub summary: Option<String>,
    /// When the row was inserted.
    pub created_at: DateTime<Utc>,
    /// When the row was last replaced.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Every writable task column, for create and full-replace update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub title: String,
    #[serde(default)]
    pub work_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub geometry: Geometry,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default)]
    pub asset_id: Option<i32>,
    #[serde(default)]
    pub execution_unit_id: Option<i32>,
    #[serde(default)]
    pub supervisor_id: Option<i32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Validate for TaskRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        optional_text("work_type", self.work_type.as_deref())?;
        self.geometry
            .validate()
            .map_err(|e| ValidationError::new("geometry", e.to_string()))?;
        optional_id("asset_id", self.asset_id)?;
        optional_id("execution_unit_id", self.execution_unit_id)?;
        optional_id("supervisor_id", self.supervisor_id)?;

        if let (Some(start), Some(due)) = (self.start_date, self.due_date)
            && due < start
        {
            return Err(ValidationError::new(
                "due_date",
                format!("{due} is before start_date {start}"),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TaskRequest {
        TaskRequest {
            title: "Resurface km 12-14".to_string(),
            work_type: Some("resurfacing".to_string()),
            description: None,
            geometry: Geometry::line_string(vec![[105.80, 21.00], [105.82, 21.01]]).unwrap(),
            priority: TaskPriority::Normal,
            status: TaskStatus::Pending,
            asset_id: Some(1),
            execution_unit_id: None,
            supervisor_id: None,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            due_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            result: None,
            summary: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn rejects_due_date_before_start() {
        let mut req = request();
        req.due_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert_eq!(req.validate().unwrap_err().field, "due_date");
    }

    #[test]
    fn rejects_non_positive_supervisor() {
        let mut req = request();
        req.supervisor_id = Some(0);
        assert_eq!(req.validate().unwrap_err().field, "supervisor_id");
    }
}
