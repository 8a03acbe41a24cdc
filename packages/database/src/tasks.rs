//! The `tasks` table.

use road_assets_database_models::{Task, TaskRequest};
use switchy_database::{DatabaseValue, Row};

use crate::entity::{self, Column, Entity};
use crate::repository::EntityRepository;
use crate::{RepoError, rows};

/// Repository for [`Task`] rows.
pub type TaskRepository = EntityRepository<Task>;

impl Entity for Task {
    type Request = TaskRequest;

    const NAME: &'static str = "task";
    const TABLE: &'static str = "tasks";
    const COLUMNS: &'static [Column] = &[
        Column::plain("title"),
        Column::plain("work_type"),
        Column::plain("description"),
        Column::geometry("geometry"),
        Column::plain("priority"),
        Column::plain("status"),
        Column::plain("asset_id"),
        Column::plain("execution_unit_id"),
        Column::plain("supervisor_id"),
        Column::date("start_date"),
        Column::date("due_date"),
        Column::plain("result"),
        Column::plain("summary"),
    ];

    fn bind(request: &TaskRequest) -> Vec<DatabaseValue> {
        vec![
            DatabaseValue::String(request.title.clone()),
            entity::text(request.work_type.as_deref()),
            entity::text(request.description.as_deref()),
            entity::geometry(&request.geometry),
            entity::vocabulary(Some(request.priority)),
            entity::vocabulary(Some(request.status)),
            entity::int(request.asset_id),
            entity::int(request.execution_unit_id),
            entity::int(request.supervisor_id),
            entity::date(request.start_date),
            entity::date(request.due_date),
            entity::text(request.result.as_deref()),
            entity::text(request.summary.as_deref()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Self {
            id: rows::id(row)?,
            title: rows::text(row, "title")?,
            work_type: rows::optional_text(row, "work_type")?,
            description: rows::optional_text(row, "description")?,
            geometry: rows::geometry(row, "geometry")?,
            priority: rows::vocabulary(row, "priority")?,
            status: rows::vocabulary(row, "status")?,
            asset_id: rows::optional_int(row, "asset_id")?,
            execution_unit_id: rows::optional_int(row, "execution_unit_id")?,
            supervisor_id: rows::optional_int(row, "supervisor_id")?,
            start_date: rows::optional_date(row, "start_date")?,
            due_date: rows::optional_date(row, "due_date")?,
            result: rows::optional_text(row, "result")?,
            summary: rows::optional_text(row, "summary")?,
            created_at: rows::timestamp(row, "created_at")?,
            updated_at: rows::optional_timestamp(row, "updated_at")?,
        })
    }
}
