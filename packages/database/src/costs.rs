//! The `costs` table and the budget check on its write path.
//!
//! A cost may only be written when the budgets of its fiscal year (the
//! calendar year of `incurred_on`) have at least `amount` remaining between
//! them. The check reads the budgets, then the write runs as a separate
//! statement; the two are not atomic, so concurrent writers can both pass the
//! check against the same remaining amount.

use std::sync::Arc;

use async_trait::async_trait;
use moosicbox_json_utils::database::ToValue as _;
use road_assets_database_models::{Cost, CostRequest, Validate as _};
use switchy_database::{Database, DatabaseValue, Row};

use crate::entity::{self, Column, Entity};
use crate::repository::{EntityRepository, Repository};
use crate::translate::{StoreOp, store_error};
use crate::{ConflictKind, RepoError, rows};

const AVAILABLE_BUDGET_SQL: &str = "SELECT COALESCE(SUM(remaining_amount), 0)::float8 AS available \
     FROM budgets WHERE fiscal_year = $1";

impl Entity for Cost {
    type Request = CostRequest;

    const NAME: &'static str = "cost";
    const TABLE: &'static str = "costs";
    const COLUMNS: &'static [Column] = &[
        Column::plain("task_id"),
        Column::plain("budget_id"),
        Column::plain("description"),
        Column::plain("amount"),
        Column::date("incurred_on"),
    ];

    fn bind(request: &CostRequest) -> Vec<DatabaseValue> {
        vec![
            entity::int(request.task_id),
            entity::int(request.budget_id),
            entity::text(request.description.as_deref()),
            DatabaseValue::Real64(request.amount),
            entity::date(Some(request.incurred_on)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Self {
            id: rows::id(row)?,
            task_id: rows::optional_int(row, "task_id")?,
            budget_id: rows::optional_int(row, "budget_id")?,
            description: rows::optional_text(row, "description")?,
            amount: rows::real(row, "amount")?,
            incurred_on: rows::date(row, "incurred_on")?,
            created_at: rows::timestamp(row, "created_at")?,
            updated_at: rows::optional_timestamp(row, "updated_at")?,
        })
    }
}

/// Rejects a cost of `requested` when `available` cannot cover it.
///
/// # Errors
///
/// Returns [`ConflictKind::InsufficientBudget`] when `available < requested`.
pub fn ensure_budget_covers(
    fiscal_year: i32,
    available: f64,
    requested: f64,
) -> Result<(), RepoError> {
    if available < requested {
        return Err(RepoError::Conflict(ConflictKind::InsufficientBudget {
            fiscal_year,
            available,
            requested,
        }));
    }
    Ok(())
}

/// Repository for [`Cost`] rows that runs the budget check before every
/// insert and update.
#[derive(Clone)]
pub struct CostRepository {
    inner: EntityRepository<Cost>,
}

impl CostRepository {
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            inner: EntityRepository::new(db),
        }
    }

    /// Sum of `remaining_amount` over the budgets of `fiscal_year`, zero
    /// when there are none.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Unavailable`] if the store query fails.
    pub async fn available_budget(&self, fiscal_year: i32) -> Result<f64, RepoError> {
        let rows = self
            .inner
            .database()
            .query_raw_params(AVAILABLE_BUDGET_SQL, &[DatabaseValue::Int32(fiscal_year)])
            .await
            .map_err(|e| store_error(StoreOp::Read, &e))?;

        let Some(row) = rows.first() else {
            return Ok(0.0);
        };

        row.to_value("available")
            .map_err(rows::column_error("available"))
    }

    async fn check_budget(&self, request: &CostRequest) -> Result<(), RepoError> {
        request.validate()?;

        let fiscal_year = request.fiscal_year();
        let available = self.available_budget(fiscal_year).await?;

        log::debug!(
            "Budget check for fiscal year {fiscal_year}: available={available} requested={}",
            request.amount
        );

        ensure_budget_covers(fiscal_year, available, request.amount).inspect_err(|e| {
            log::warn!("Rejected cost: {e}");
        })
    }
}

#[async_trait(?Send)]
impl Repository for CostRepository {
    type Entity = Cost;
    type Request = CostRequest;

    fn entity_name(&self) -> &'static str {
        Cost::NAME
    }

    async fn list(&self) -> Result<Vec<Cost>, RepoError> {
        self.inner.list().await
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Cost>, RepoError> {
        self.inner.get_by_id(id).await
    }

    async fn create(&self, request: &CostRequest) -> Result<Cost, RepoError> {
        self.check_budget(request).await?;
        self.inner.create(request).await
    }

    async fn update(&self, id: i32, request: &CostRequest) -> Result<Option<Cost>, RepoError> {
        request.validate()?;
        if self.inner.get_by_id(id).await?.is_none() {
            log::debug!("No cost with id {id} to update");
            return Ok(None);
        }

        self.check_budget(request).await?;
        self.inner.update(id, request).await
    }

    async fn delete(&self, id: i32) -> Result<bool, RepoError> {
        self.inner.delete(id).await
    }
}
