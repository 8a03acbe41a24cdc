//! The `maintenance_records` table.

use road_assets_database_models::{MaintenanceRecord, MaintenanceRecordRequest};
use switchy_database::{DatabaseValue, Row};

use crate::entity::{self, Column, Entity};
use crate::repository::EntityRepository;
use crate::{RepoError, rows};

/// Repository for [`MaintenanceRecord`] rows.
pub type MaintenanceRecordRepository = EntityRepository<MaintenanceRecord>;

impl Entity for MaintenanceRecord {
    type Request = MaintenanceRecordRequest;

    const NAME: &'static str = "maintenance record";
    const TABLE: &'static str = "maintenance_records";
    const COLUMNS: &'static [Column] = &[
        Column::plain("asset_id"),
        Column::plain("task_id"),
        Column::date("performed_on"),
        Column::plain("description"),
        Column::plain("cost"),
        Column::plain("performed_by"),
        Column::plain("document_url"),
        Column::plain("document_public_id"),
        Column::plain("document_name"),
    ];

    fn bind(request: &MaintenanceRecordRequest) -> Vec<DatabaseValue> {
        vec![
            DatabaseValue::Int32(request.asset_id),
            entity::int(request.task_id),
            entity::date(Some(request.performed_on)),
            entity::text(request.description.as_deref()),
            entity::real(request.cost),
            entity::text(request.performed_by.as_deref()),
            entity::text(request.document_url.as_deref()),
            entity::text(request.document_public_id.as_deref()),
            entity::text(request.document_name.as_deref()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Self {
            id: rows::id(row)?,
            asset_id: rows::int(row, "asset_id")?,
            task_id: rows::optional_int(row, "task_id")?,
            performed_on: rows::date(row, "performed_on")?,
            description: rows::optional_text(row, "description")?,
            cost: rows::optional_real(row, "cost")?,
            performed_by: rows::optional_text(row, "performed_by")?,
            document_url: rows::optional_text(row, "document_url")?,
            document_public_id: rows::optional_text(row, "document_public_id")?,
            document_name: rows::optional_text(row, "document_name")?,
            created_at: rows::timestamp(row, "created_at")?,
            updated_at: rows::optional_timestamp(row, "updated_at")?,
        })
    }
}
