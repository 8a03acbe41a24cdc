//! The `assets` table.

use road_assets_database_models::{Asset, AssetRequest};
use switchy_database::{DatabaseValue, Row};

use crate::entity::{self, Column, Entity};
use crate::repository::EntityRepository;
use crate::{RepoError, rows};

/// Repository for [`Asset`] rows.
pub type AssetRepository = EntityRepository<Asset>;

impl Entity for Asset {
    type Request = AssetRequest;

    const NAME: &'static str = "asset";
    const TABLE: &'static str = "assets";
    const COLUMNS: &'static [Column] = &[
        Column::plain("category_id"),
        Column::plain("name"),
        Column::plain("code"),
        Column::plain("address"),
        Column::geometry("geometry"),
        Column::json("custom_attributes"),
        Column::date("construction_date"),
        Column::date("operation_date"),
        Column::plain("length_m"),
        Column::plain("area_m2"),
        Column::plain("original_value"),
        Column::plain("current_value"),
        Column::plain("status"),
        Column::plain("managing_unit"),
        Column::plain("image_url"),
        Column::plain("image_public_id"),
    ];

    fn bind(request: &AssetRequest) -> Vec<DatabaseValue> {
        vec![
            DatabaseValue::Int32(request.category_id),
            entity::text(request.name.as_deref()),
            entity::text(request.code.as_deref()),
            entity::text(request.address.as_deref()),
            entity::geometry(&request.geometry),
            entity::json(&request.custom_attributes),
            entity::date(request.construction_date),
            entity::date(request.operation_date),
            entity::real(request.length_m),
            entity::real(request.area_m2),
            entity::real(request.original_value),
            entity::real(request.current_value),
            entity::vocabulary(request.status),
            entity::text(request.managing_unit.as_deref()),
            entity::text(request.image_url.as_deref()),
            entity::text(request.image_public_id.as_deref()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Self {
            id: rows::id(row)?,
            category_id: rows::int(row, "category_id")?,
            name: rows::optional_text(row, "name")?,
            code: rows::optional_text(row, "code")?,
            address: rows::optional_text(row, "address")?,
            geometry: rows::geometry(row, "geometry")?,
            custom_attributes: rows::json(row, "custom_attributes")?,
            construction_date: rows::optional_date(row, "construction_date")?,
            operation_date: rows::optional_date(row, "operation_date")?,
            length_m: rows::optional_real(row, "length_m")?,
            area_m2: rows::optional_real(row, "area_m2")?,
            original_value: rows::optional_real(row, "original_value")?,
            current_value: rows::optional_real(row, "current_value")?,
            status: rows::optional_vocabulary(row, "status")?,
            managing_unit: rows::optional_text(row, "managing_unit")?,
            image_url: rows::optional_text(row, "image_url")?,
            image_public_id: rows::optional_text(row, "image_public_id")?,
            created_at: rows::timestamp(row, "created_at")?,
            updated_at: rows::optional_timestamp(row, "updated_at")?,
        })
    }
}
