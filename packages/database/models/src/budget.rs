//! Annual budgets and the costs charged against them.

use chrono::{DateTime, Datelike as _, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Validate, ValidationError, non_negative, optional_id, optional_text, require_text,
};

/// Earliest fiscal year accepted on a budget.
pub const MIN_FISCAL_YEAR: i32 = 1900;

/// Latest fiscal year accepted on a budget.
pub const MAX_FISCAL_YEAR: i32 = 9999;

/// A budget row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i32,
    pub name: String,
    pub fiscal_year: i32,
    /// Amount allocated for the year.
    pub total_amount: f64,
    /// Amount still available to spend.
    pub remaining_amount: f64,
    /// Unit the budget is allocated to.
    pub unit: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Every writable budget column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRequest {
    pub name: String,
    pub fiscal_year: i32,
    pub total_amount: f64,
    pub remaining_amount: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for BudgetRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        if !(MIN_FISCAL_YEAR..=MAX_FISCAL_YEAR).contains(&self.fiscal_year) {
            return Err(ValidationError::new(
                "fiscal_year",
                format!(
                    "must be between {MIN_FISCAL_YEAR} and {MAX_FISCAL_YEAR}, got {}",
                    self.fiscal_year
                ),
            ));
        }
        non_negative("total_amount", self.total_amount)?;
        non_negative("remaining_amount", self.remaining_amount)?;
        if self.remaining_amount > self.total_amount {
            return Err(ValidationError::new(
                "remaining_amount",
                format!(
                    "{} exceeds total_amount {}",
                    self.remaining_amount, self.total_amount
                ),
            ));
        }
        optional_text("unit", self.unit.as_deref())?;
        Ok(())
    }
}

/// A cost row: money spent on a task, drawn from a fiscal year's budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub id: i32,
    pub task_id: Option<i32>,
    pub budget_id: Option<i32>,
    pub description: Option<String>,
    pub amount: f64,
    /// Date the cost was incurred; determines the fiscal year.
    pub incurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Every writable cost column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRequest {
    #[serde(default)]
    pub task_id: Option<i32>,
    #[serde(default)]
    pub budget_id: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    pub incurred_on: NaiveDate,
}

impl CostRequest {
    /// Fiscal year the cost is charged to (the calendar year it was incurred).
    #[must_use]
    pub fn fiscal_year(&self) -> i32 {
        self.incurred_on.year()
    }
}

impl Validate for CostRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_negative("amount", self.amount)?;
        if self.amount <= 0.0 {
            return Err(ValidationError::new("amount", "must be greater than zero"));
        }
        optional_id("task_id", self.task_id)?;
        optional_id("budget_id", self.budget_id)?;
        if let Some(description) = &self.description {
            require_text("description", description)?;
        }
        Ok(())
    }
}
