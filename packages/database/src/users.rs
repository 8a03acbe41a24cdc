//! The `users` table.

use road_assets_database_models::{User, UserRequest};
use switchy_database::{DatabaseValue, Row};

use crate::entity::{self, Column, Entity};
use crate::repository::EntityRepository;
use crate::{RepoError, rows};

/// Repository for [`User`] rows.
pub type UserRepository = EntityRepository<User>;

impl Entity for User {
    type Request = UserRequest;

    const NAME: &'static str = "user";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [Column] = &[
        Column::plain("username"),
        Column::plain("email"),
        Column::plain("full_name"),
        Column::plain("role"),
        Column::plain("unit"),
        Column::plain("is_active"),
    ];

    fn bind(request: &UserRequest) -> Vec<DatabaseValue> {
        vec![
            DatabaseValue::String(request.username.clone()),
            entity::text(request.email.as_deref()),
            entity::text(request.full_name.as_deref()),
            entity::vocabulary(Some(request.role)),
            entity::text(request.unit.as_deref()),
            DatabaseValue::Bool(request.is_active),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Self {
            id: rows::id(row)?,
            username: rows::text(row, "username")?,
            email: rows::optional_text(row, "email")?,
            full_name: rows::optional_text(row, "full_name")?,
            role: rows::vocabulary(row, "role")?,
            unit: rows::optional_text(row, "unit")?,
            is_active: rows::boolean(row, "is_active")?,
            created_at: rows::timestamp(row, "created_at")?,
            updated_at: rows::optional_timestamp(row, "updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use road_assets_models::UserRole;

    use super::*;

    #[test]
    fn binds_role_name() {
        let values = User::bind(&UserRequest {
            username: "ngoc.tran".to_string(),
            email: None,
            full_name: None,
            role: UserRole::Technician,
            unit: None,
            is_active: true,
        });
        assert_eq!(values.len(), User::COLUMNS.len());
        assert!(matches!(&values[3], DatabaseValue::String(s) if s == "technician"));
        assert!(matches!(values[5], DatabaseValue::Bool(true)));
    }
}
