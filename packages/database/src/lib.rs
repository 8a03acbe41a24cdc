#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! `PostGIS` persistence for road assets.
//!
//! Uses `switchy_database` raw parameterized SQL for every statement and
//! `switchy_schema` for embedded SQL migrations. Each entity is owned by one
//! repository; every store failure is funnelled through [`translate`] into a
//! [`RepoError`] before it leaves this crate.

pub mod assets;
pub mod budgets;
pub mod categories;
pub mod costs;
pub mod db;
pub mod entity;
pub mod incident_history;
pub mod incidents;
pub mod maintenance;
pub mod notifications;
pub mod repository;
pub mod tasks;
pub mod translate;
pub mod users;

mod rows;

use std::fmt;

use include_dir::{Dir, include_dir};
use road_assets_database_models::ValidationError;
use switchy_database::Database;
use switchy_schema::discovery::embedded::EmbeddedMigrationSource;
use switchy_schema::runner::MigrationRunner;

pub use assets::AssetRepository;
pub use budgets::BudgetRepository;
pub use categories::AssetCategoryRepository;
pub use costs::CostRepository;
pub use entity::Entity;
pub use incident_history::{HistoryRepository, IncidentHistoryRepository};
pub use incidents::IncidentRepository;
pub use maintenance::MaintenanceRecordRepository;
pub use notifications::NotificationRepository;
pub use repository::{EntityRepository, Repository};
pub use tasks::TaskRepository;
pub use users::UserRepository;

/// Embedded SQL migrations from the `migrations/` directory.
static MIGRATIONS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/../../migrations");

/// Errors raised while setting up the database (connecting, migrating).
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] switchy_schema::MigrationError),
}

/// Domain error kinds produced by every repository operation.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Input rejected before reaching the store.
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// A lookup by id found nothing.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity name, e.g. `asset`.
        entity: &'static str,
        /// The id that was looked up.
        id: i32,
    },

    /// The store rejected the write because of a constraint.
    #[error("Conflict: {0}")]
    Conflict(ConflictKind),

    /// The store could not be reached or failed unexpectedly.
    #[error("Store unavailable during {operation}: {cause}")]
    Unavailable {
        /// What was being attempted.
        operation: String,
        /// Low-level cause, for logs only.
        cause: String,
    },
}

impl RepoError {
    pub(crate) fn unavailable(operation: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self::Unavailable {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

/// Which constraint a conflicting write ran into.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictKind {
    /// A unique constraint already holds the value.
    Unique {
        /// Offending column(s), or the constraint name if the columns are
        /// unknown.
        field: String,
        /// Offending value, if reported.
        value: Option<String>,
    },

    /// A check or not-null constraint rejected a value.
    Check {
        /// Constraint or column name.
        constraint: String,
    },

    /// A foreign key points at a parent row that does not exist.
    MissingReference {
        /// Foreign key column.
        field: String,
        /// The missing parent id, if reported.
        id: Option<String>,
        /// Parent table, if reported.
        table: Option<String>,
    },

    /// The row cannot be deleted while other rows reference it.
    StillReferenced {
        /// The referencing table, if reported.
        table: Option<String>,
    },

    /// The spatial parser rejected the geometry.
    Geometry {
        /// Parser message.
        message: String,
    },

    /// The fiscal year's budgets cannot cover a cost.
    InsufficientBudget {
        fiscal_year: i32,
        available: f64,
        requested: f64,
    },
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unique { field, value } => match value {
                Some(value) => write!(f, "{field} \"{value}\" already exists"),
                None => write!(f, "duplicate value for {field}"),
            },
            Self::Check { constraint } => write!(f, "value rejected by constraint {constraint}"),
            Self::MissingReference { field, id, table } => {
                match id {
                    Some(id) => write!(f, "{field} {id} does not exist")?,
                    None => write!(f, "{field} references a missing row")?,
                }
                if let Some(table) = table {
                    write!(f, " in {table}")?;
                }
                Ok(())
            }
            Self::StillReferenced { table } => match table {
                Some(table) => write!(f, "still referenced by rows in {table}"),
                None => f.write_str("still referenced by other rows"),
            },
            Self::Geometry { message } => write!(f, "invalid geometry: {message}"),
            Self::InsufficientBudget {
                fiscal_year,
                available,
                requested,
            } => write!(
                f,
                "budgets for fiscal year {fiscal_year} have {available} remaining, \
                 cannot cover {requested}"
            ),
        }
    }
}

/// Runs all pending database migrations.
///
/// # Errors
///
/// Returns [`DbError`] if any migration fails to apply.
pub async fn run_migrations(db: &dyn Database) -> Result<(), DbError> {
    let source = EmbeddedMigrationSource::new(&MIGRATIONS_DIR);
    let runner = MigrationRunner::new(Box::new(source));
    runner.run(db).await?;
    log::info!("Database migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use road_assets_geometry::GeometryKind;
    use road_assets_models::{
        AssetStatus, DamageLevel, IncidentSeverity, ProcessingStatus, TaskPriority, TaskStatus,
        UserRole,
    };

    use super::*;

    fn migration_sql() -> String {
        MIGRATIONS_DIR
            .dirs()
            .flat_map(Dir::files)
            .filter(|f| f.path().file_name().is_some_and(|n| n == "up.sql"))
            .filter_map(|f| f.contents_utf8())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn assert_checked<T: AsRef<str>>(sql: &str, values: &[T]) {
        for value in values {
            let quoted = format!("'{}'", value.as_ref());
            assert!(sql.contains(&quoted), "migrations do not allow {quoted}");
        }
    }

    #[test]
    fn check_constraints_cover_every_vocabulary_value() {
        let sql = migration_sql();
        assert_checked(&sql, AssetStatus::all());
        assert_checked(&sql, IncidentSeverity::all());
        assert_checked(&sql, DamageLevel::all());
        assert_checked(&sql, ProcessingStatus::all());
        assert_checked(&sql, TaskStatus::all());
        assert_checked(&sql, TaskPriority::all());
        assert_checked(&sql, UserRole::all());
        assert_checked(&sql, GeometryKind::all());
    }

    #[test]
    fn geometry_columns_use_system_srid() {
        let sql = migration_sql();
        assert_eq!(sql.matches("GEOMETRY(Geometry, 3405)").count(), 3);
    }

    #[test]
    fn audit_defaults_do_not_depend_on_session_time_zone() {
        let sql = migration_sql();
        let created_at = sql.matches("created_at TIMESTAMP").count();
        assert!(created_at > 0);
        assert_eq!(
            sql.matches(&format!("created_at TIMESTAMP NOT NULL DEFAULT {}", entity::UTC_NOW))
                .count(),
            created_at
        );
        assert!(!sql.contains("DEFAULT NOW()"));
    }

    #[test]
    fn missing_reference_names_the_parent_id() {
        let kind = ConflictKind::MissingReference {
            field: "category_id".to_string(),
            id: Some("99".to_string()),
            table: Some("asset_categories".to_string()),
        };
        assert_eq!(
            kind.to_string(),
            "category_id 99 does not exist in asset_categories"
        );
    }

    #[test]
    fn unique_without_detail_falls_back_to_field() {
        let kind = ConflictKind::Unique {
            field: "assets_code_key".to_string(),
            value: None,
        };
        assert_eq!(kind.to_string(), "duplicate value for assets_code_key");
    }

    #[test]
    fn validation_errors_convert() {
        let err: RepoError = ValidationError::new("title", "must not be blank").into();
        assert!(matches!(err, RepoError::ValidationFailed(_)));
        assert_eq!(err.to_string(), "Validation failed: title: must not be blank");
    }
}
