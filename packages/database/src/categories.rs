//! The `asset_categories` table.

use road_assets_database_models::{AssetCategory, AssetCategoryRequest};
use switchy_database::{DatabaseValue, Row};

use crate::entity::{self, Column, Entity};
use crate::repository::EntityRepository;
use crate::{RepoError, rows};

/// Repository for [`AssetCategory`] rows.
pub type AssetCategoryRepository = EntityRepository<AssetCategory>;

impl Entity for AssetCategory {
    type Request = AssetCategoryRequest;

    const NAME: &'static str = "asset category";
    const TABLE: &'static str = "asset_categories";
    const COLUMNS: &'static [Column] = &[
        Column::plain("name"),
        Column::plain("code"),
        Column::plain("description"),
        Column::plain("geometry_type"),
    ];

    fn bind(request: &AssetCategoryRequest) -> Vec<DatabaseValue> {
        vec![
            DatabaseValue::String(request.name.clone()),
            entity::text(request.code.as_deref()),
            entity::text(request.description.as_deref()),
            entity::vocabulary(Some(request.geometry_type)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Self {
            id: rows::id(row)?,
            name: rows::text(row, "name")?,
            code: rows::optional_text(row, "code")?,
            description: rows::optional_text(row, "description")?,
            geometry_type: rows::vocabulary(row, "geometry_type")?,
            created_at: rows::timestamp(row, "created_at")?,
            updated_at: rows::optional_timestamp(row, "updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use road_assets_geometry::GeometryKind;

    use super::*;

    #[test]
    fn geometry_type_binds_as_geojson_type_name() {
        let values = AssetCategory::bind(&AssetCategoryRequest {
            name: "Bridges".to_string(),
            code: Some("BR".to_string()),
            description: None,
            geometry_type: GeometryKind::LineString,
        });
        assert_eq!(values.len(), AssetCategory::COLUMNS.len());
        assert!(matches!(&values[3], DatabaseValue::String(s) if s == "LineString"));
    }

    #[test]
    fn lists_in_id_order() {
        assert!(entity::select_sql::<AssetCategory>().ends_with("FROM asset_categories ORDER BY id"));
    }
}
