//! The append-only `incident_history` log.

use std::sync::Arc;

use async_trait::async_trait;
use road_assets_database_models::{IncidentHistoryEntry, IncidentHistoryRequest, Validate as _};
use switchy_database::{Database, DatabaseValue, Row};

use crate::entity;
use crate::translate::{StoreOp, store_error};
use crate::{RepoError, rows};

const SELECT_COLUMNS: &str =
    "id, incident_id, from_status, to_status, changed_by, note, created_at";

/// Read and append access to an incident's status history.
#[async_trait(?Send)]
pub trait HistoryRepository: Send + Sync {
    /// Entries for `incident_id`, newest first.
    async fn list_for_incident(
        &self,
        incident_id: i32,
    ) -> Result<Vec<IncidentHistoryEntry>, RepoError>;

    /// Validates and appends an entry for `incident_id`.
    async fn append(
        &self,
        incident_id: i32,
        request: &IncidentHistoryRequest,
    ) -> Result<IncidentHistoryEntry, RepoError>;
}

/// [`HistoryRepository`] backed by the `incident_history` table.
#[derive(Clone)]
pub struct IncidentHistoryRepository {
    db: Arc<dyn Database>,
}

impl IncidentHistoryRepository {
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

fn entry_from_row(row: &Row) -> Result<IncidentHistoryEntry, RepoError> {
    Ok(IncidentHistoryEntry {
        id: rows::id(row)?,
        incident_id: rows::int(row, "incident_id")?,
        from_status: rows::optional_vocabulary(row, "from_status")?,
        to_status: rows::vocabulary(row, "to_status")?,
        changed_by: rows::optional_int(row, "changed_by")?,
        note: rows::optional_text(row, "note")?,
        created_at: rows::timestamp(row, "created_at")?,
    })
}

#[async_trait(?Send)]
impl HistoryRepository for IncidentHistoryRepository {
    async fn list_for_incident(
        &self,
        incident_id: i32,
    ) -> Result<Vec<IncidentHistoryEntry>, RepoError> {
        let rows = self
            .db
            .query_raw_params(
                &format!(
                    "SELECT {SELECT_COLUMNS} FROM incident_history \
                     WHERE incident_id = $1 ORDER BY created_at DESC, id DESC"
                ),
                &[DatabaseValue::Int32(incident_id)],
            )
            .await
            .map_err(|e| store_error(StoreOp::Read, &e))?;

        rows.iter().map(entry_from_row).collect()
    }

    async fn append(
        &self,
        incident_id: i32,
        request: &IncidentHistoryRequest,
    ) -> Result<IncidentHistoryEntry, RepoError> {
        request.validate()?;

        let rows = self
            .db
            .query_raw_params(
                &format!(
                    "INSERT INTO incident_history \
                     (incident_id, from_status, to_status, changed_by, note) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING {SELECT_COLUMNS}"
                ),
                &[
                    DatabaseValue::Int32(incident_id),
                    entity::vocabulary(request.from_status),
                    entity::vocabulary(Some(request.to_status)),
                    entity::int(request.changed_by),
                    entity::text(request.note.as_deref()),
                ],
            )
            .await
            .map_err(|e| store_error(StoreOp::Insert, &e))?;

        let row = rows
            .first()
            .ok_or_else(|| RepoError::unavailable("insert", "no history row returned"))?;
        let entry = entry_from_row(row)?;

        log::debug!(
            "Incident {incident_id} moved to {} (history entry {})",
            entry.to_status,
            entry.id
        );

        Ok(entry)
    }
}
