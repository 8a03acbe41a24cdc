//! Asset categories (road segment, bridge, culvert, traffic sign, ...).

use chrono::{DateTime, Utc};
use road_assets_geometry::GeometryKind;
use serde::{Deserialize, Serialize};

use crate::{Validate, ValidationError, optional_text, require_text};

/// An asset category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCategory {
    pub id: i32,
    /// Unique display name.
    pub name: String,
    /// Unique short code.
    pub code: Option<String>,
    pub description: Option<String>,
    /// Geometry kind assets of this category are drawn with.
    pub geometry_type: GeometryKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Every writable asset category column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub geometry_type: GeometryKind,
}

impl Validate for AssetCategoryRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        optional_text("code", self.code.as_deref())?;
        Ok(())
    }
}
