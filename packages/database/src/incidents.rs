//! The `incidents` table.

use road_assets_database_models::{Incident, IncidentRequest};
use switchy_database::{DatabaseValue, Row};

use crate::entity::{self, Column, Entity};
use crate::repository::EntityRepository;
use crate::{RepoError, rows};

/// Repository for [`Incident`] rows.
pub type IncidentRepository = EntityRepository<Incident>;

impl Entity for Incident {
    type Request = IncidentRequest;

    const NAME: &'static str = "incident";
    const TABLE: &'static str = "incidents";
    const COLUMNS: &'static [Column] = &[
        Column::plain("asset_id"),
        Column::plain("task_id"),
        Column::plain("title"),
        Column::plain("description"),
        Column::geometry("geometry"),
        Column::plain("severity"),
        Column::plain("damage_level"),
        Column::plain("processing_status"),
        Column::plain("reported_by"),
        Column::plain("image_url"),
        Column::plain("image_public_id"),
    ];

    fn bind(request: &IncidentRequest) -> Vec<DatabaseValue> {
        vec![
            entity::int(request.asset_id),
            entity::int(request.task_id),
            DatabaseValue::String(request.title.clone()),
            entity::text(request.description.as_deref()),
            entity::geometry(&request.geometry),
            entity::vocabulary(Some(request.severity)),
            entity::vocabulary(Some(request.damage_level)),
            entity::vocabulary(Some(request.processing_status)),
            entity::int(request.reported_by),
            entity::text(request.image_url.as_deref()),
            entity::text(request.image_public_id.as_deref()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Self {
            id: rows::id(row)?,
            asset_id: rows::optional_int(row, "asset_id")?,
            task_id: rows::optional_int(row, "task_id")?,
            title: rows::text(row, "title")?,
            description: rows::optional_text(row, "description")?,
            geometry: rows::geometry(row, "geometry")?,
            severity: rows::vocabulary(row, "severity")?,
            damage_level: rows::vocabulary(row, "damage_level")?,
            processing_status: rows::vocabulary(row, "processing_status")?,
            reported_by: rows::optional_int(row, "reported_by")?,
            image_url: rows::optional_text(row, "image_url")?,
            image_public_id: rows::optional_text(row, "image_public_id")?,
            created_at: rows::timestamp(row, "created_at")?,
            updated_at: rows::optional_timestamp(row, "updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use road_assets_geometry::Geometry;
    use road_assets_models::{DamageLevel, IncidentSeverity, ProcessingStatus};

    use super::*;

    fn request() -> IncidentRequest {
        IncidentRequest {
            asset_id: Some(7),
            task_id: None,
            title: "Collapsed guardrail".to_string(),
            description: None,
            geometry: Geometry::point(105.85, 21.02),
            severity: IncidentSeverity::Critical,
            damage_level: DamageLevel::Severe,
            processing_status: ProcessingStatus::InProgress,
            reported_by: Some(4),
            image_url: None,
            image_public_id: None,
        }
    }

    #[test]
    fn binds_one_value_per_column() {
        assert_eq!(Incident::bind(&request()).len(), Incident::COLUMNS.len());
    }

    #[test]
    fn binds_vocabularies_as_snake_case() {
        let values = Incident::bind(&request());
        assert!(matches!(&values[5], DatabaseValue::String(s) if s == "critical"));
        assert!(matches!(&values[6], DatabaseValue::String(s) if s == "severe"));
        assert!(matches!(&values[7], DatabaseValue::String(s) if s == "in_progress"));
        assert!(matches!(values[1], DatabaseValue::Null));
    }

    #[test]
    fn delete_targets_incidents() {
        assert_eq!(
            entity::delete_sql::<Incident>(),
            "DELETE FROM incidents WHERE id = $1"
        );
    }
}
