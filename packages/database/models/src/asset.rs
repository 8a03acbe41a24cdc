//! Road infrastructure assets (segments, bridges, culverts, signs, ...).

use chrono::{DateTime, NaiveDate, Utc};
use road_assets_geometry::Geometry;
use road_assets_models::AssetStatus;
use serde::{Deserialize, Serialize};

use crate::{
    Validate, ValidationError, optional_non_negative, optional_text, require_id,
};

/// An asset row as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Primary key.
    pub id: i32,
    /// Owning asset category.
    pub category_id: i32,
    /// Display name.
    pub name: Option<String>,
    /// Inventory code, unique when present.
    pub code: Option<String>,
    /// Street address or road section description.
    pub address: Option<String>,
    /// Location and shape, in SRID 3405.
    pub geometry: Geometry,
    /// Category-specific attributes; opaque to the persistence layer.
    pub custom_attributes: serde_json::Value,
    /// Date construction finished.
    pub construction_date: Option<NaiveDate>,
    /// Date the asset was put into operation.
    pub operation_date: Option<NaiveDate>,
    /// Length in metres.
    pub length_m: Option<f64>,
    /// Area in square metres.
    pub area_m2: Option<f64>,
    /// Book value at acquisition.
    pub original_value: Option<f64>,
    /// Current book value.
    pub current_value: Option<f64>,
    /// Operational status.
    pub status: Option<AssetStatus>,
    /// Name of the unit responsible for the asset.
    pub managing_unit: Option<String>,
    /// Public URL of the asset photo held by blob storage.
    pub image_url: Option<String>,
    /// Blob storage id of the asset photo.
    pub image_public_id: Option<String>,
    /// When the row was inserted.
    pub created_at: DateTime<Utc>,
    /// When the row was last replaced.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Every writable asset column, for create and full-replace update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRequest {
    pub category_id: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub geometry: Geometry,
    pub custom_attributes: serde_json::Value,
    #[serde(default)]
    pub construction_date: Option<NaiveDate>,
    #[serde(default)]
    pub operation_date: Option<NaiveDate>,
    #[serde(default)]
    pub length_m: Option<f64>,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub original_value: Option<f64>,
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub status: Option<AssetStatus>,
    #[serde(default)]
    pub managing_unit: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_public_id: Option<String>,
}

impl AssetRequest {
    /// Creates a request with only the required fields set.
    #[must_use]
    pub const fn new(
        category_id: i32,
        geometry: Geometry,
        custom_attributes: serde_json::Value,
    ) -> Self {
        Self {
            category_id,
            name: None,
            code: None,
            address: None,
            geometry,
            custom_attributes,
            construction_date: None,
            operation_date: None,
            length_m: None,
            area_m2: None,
            original_value: None,
            current_value: None,
            status: None,
            managing_unit: None,
            image_url: None,
            image_public_id: None,
        }
    }
}

impl Validate for AssetRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_id("category_id", self.category_id)?;
        self.geometry
            .validate()
            .map_err(|e| ValidationError::new("geometry", e.to_string()))?;
        if self.custom_attributes.is_null() {
            return Err(ValidationError::new(
                "custom_attributes",
                "is required (use {} for none)",
            ));
        }
        optional_text("name", self.name.as_deref())?;
        optional_text("code", self.code.as_deref())?;
        optional_non_negative("length_m", self.length_m)?;
        optional_non_negative("area_m2", self.area_m2)?;
        optional_non_negative("original_value", self.original_value)?;
        optional_non_negative("current_value", self.current_value)?;

        if let (Some(built), Some(opened)) = (self.construction_date, self.operation_date)
            && opened < built
        {
            return Err(ValidationError::new(
                "operation_date",
                format!("{opened} is before construction_date {built}"),
            ));
        }

        Ok(())
    }
}
