//! The `notifications` table.

use road_assets_database_models::{Notification, NotificationRequest};
use switchy_database::{DatabaseValue, Row};

use crate::entity::{self, Column, Entity};
use crate::repository::EntityRepository;
use crate::{RepoError, rows};

/// Repository for [`Notification`] rows.
pub type NotificationRepository = EntityRepository<Notification>;

impl Entity for Notification {
    type Request = NotificationRequest;

    const NAME: &'static str = "notification";
    const TABLE: &'static str = "notifications";
    const COLUMNS: &'static [Column] = &[
        Column::plain("user_id"),
        Column::plain("title"),
        Column::plain("message"),
        Column::plain("link"),
        Column::plain("is_read"),
    ];

    fn bind(request: &NotificationRequest) -> Vec<DatabaseValue> {
        vec![
            DatabaseValue::Int32(request.user_id),
            DatabaseValue::String(request.title.clone()),
            entity::text(request.message.as_deref()),
            entity::text(request.link.as_deref()),
            DatabaseValue::Bool(request.is_read),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Self {
            id: rows::id(row)?,
            user_id: rows::int(row, "user_id")?,
            title: rows::text(row, "title")?,
            message: rows::optional_text(row, "message")?,
            link: rows::optional_text(row, "link")?,
            is_read: rows::boolean(row, "is_read")?,
            created_at: rows::timestamp(row, "created_at")?,
            updated_at: rows::optional_timestamp(row, "updated_at")?,
        })
    }
}
