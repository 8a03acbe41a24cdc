//! The `budgets` table.

use road_assets_database_models::{Budget, BudgetRequest};
use switchy_database::{DatabaseValue, Row};

use crate::entity::{self, Column, Entity};
use crate::repository::EntityRepository;
use crate::{RepoError, rows};

/// Repository for [`Budget`] rows.
pub type BudgetRepository = EntityRepository<Budget>;

impl Entity for Budget {
    type Request = BudgetRequest;

    const NAME: &'static str = "budget";
    const TABLE: &'static str = "budgets";
    const COLUMNS: &'static [Column] = &[
        Column::plain("name"),
        Column::plain("fiscal_year"),
        Column::plain("total_amount"),
        Column::plain("remaining_amount"),
        Column::plain("unit"),
        Column::plain("description"),
    ];

    fn bind(request: &BudgetRequest) -> Vec<DatabaseValue> {
        vec![
            DatabaseValue::String(request.name.clone()),
            DatabaseValue::Int32(request.fiscal_year),
            DatabaseValue::Real64(request.total_amount),
            DatabaseValue::Real64(request.remaining_amount),
            entity::text(request.unit.as_deref()),
            entity::text(request.description.as_deref()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Self {
            id: rows::id(row)?,
            name: rows::text(row, "name")?,
            fiscal_year: rows::int(row, "fiscal_year")?,
            total_amount: rows::real(row, "total_amount")?,
            remaining_amount: rows::real(row, "remaining_amount")?,
            unit: rows::optional_text(row, "unit")?,
            description: rows::optional_text(row, "description")?,
            created_at: rows::timestamp(row, "created_at")?,
            updated_at: rows::optional_timestamp(row, "updated_at")?,
        })
    }
}
