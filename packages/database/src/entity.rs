//! Table descriptions and the SQL built from them.
//!
//! Every repository-managed table has an integer `id` primary key, a set of
//! writable columns and the `created_at` / `updated_at` audit columns. The
//! [`Entity`] trait describes the writable columns; the functions here turn
//! that description into the five statements a repository issues.
//!
//! Geometry columns are written through
//! `ST_SetSRID(ST_GeomFromGeoJSON($n), 3405)` and read back with
//! `ST_AsGeoJSON`, so the codec only ever sees `GeoJSON` text.

use chrono::NaiveDate;
use road_assets_database_models::Validate;
use road_assets_geometry::{Geometry, SRID};
use switchy_database::{DatabaseValue, Row};

use crate::RepoError;

/// Digits after the decimal point `ST_AsGeoJSON` writes per ordinate.
///
/// Ordinates with magnitude below `1e-15` read back as zero.
pub const GEOJSON_MAX_DECIMAL_DIGITS: u8 = 15;

/// Current instant as a UTC wall-clock `TIMESTAMP`, whatever the session
/// time zone. The migrations use the same expression for `created_at`.
pub const UTC_NOW: &str = "(NOW() AT TIME ZONE 'utc')";

/// How a column is written and read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Bound and selected as-is.
    Plain,
    /// `GEOMETRY` column, exchanged as `GeoJSON` text.
    Geometry,
    /// `JSONB` column, exchanged as JSON text.
    Json,
    /// `DATE` column, exchanged as `YYYY-MM-DD` text.
    Date,
}

/// A writable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    #[must_use]
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Plain,
        }
    }

    #[must_use]
    pub const fn geometry(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Geometry,
        }
    }

    #[must_use]
    pub const fn json(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Json,
        }
    }

    #[must_use]
    pub const fn date(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Date,
        }
    }

    /// Expression selecting this column in its exchange form.
    #[must_use]
    pub fn select_expr(&self) -> String {
        match self.kind {
            ColumnKind::Plain => self.name.to_string(),
            ColumnKind::Geometry => format!(
                "ST_AsGeoJSON({name}, {GEOJSON_MAX_DECIMAL_DIGITS}) AS {name}",
                name = self.name
            ),
            ColumnKind::Json | ColumnKind::Date => format!("{name}::text AS {name}", name = self.name),
        }
    }

    /// Expression converting bind parameter `$index` into the column type.
    #[must_use]
    pub fn write_expr(&self, index: usize) -> String {
        match self.kind {
            ColumnKind::Plain => format!("${index}"),
            ColumnKind::Geometry => format!("ST_SetSRID(ST_GeomFromGeoJSON(${index}::text), {SRID})"),
            ColumnKind::Json => format!("${index}::text::jsonb"),
            ColumnKind::Date => format!("${index}::text::date"),
        }
    }
}

/// A record type stored in one table and managed by a generic repository.
pub trait Entity: Sized + Send + 'static {
    /// Write request used for both create and full-replace update.
    type Request: Validate + Send + Sync + 'static;

    /// Singular name used in messages, e.g. `asset`.
    const NAME: &'static str;

    /// Table name.
    const TABLE: &'static str;

    /// Writable columns, in the order [`Entity::bind`] produces values.
    const COLUMNS: &'static [Column];

    /// Bind values for every column in [`Entity::COLUMNS`].
    fn bind(request: &Self::Request) -> Vec<DatabaseValue>;

    /// Decodes a row selected with [`select_sql`].
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Unavailable`] if a column is missing or cannot
    /// be decoded.
    fn from_row(row: &Row) -> Result<Self, RepoError>;
}

fn select_list<E: Entity>() -> String {
    let mut columns = vec!["id".to_string()];
    columns.extend(E::COLUMNS.iter().map(Column::select_expr));
    columns.push("created_at".to_string());
    columns.push("updated_at".to_string());
    columns.join(", ")
}

/// `SELECT` of every row, ordered by id.
#[must_use]
pub fn select_sql<E: Entity>() -> String {
    format!("SELECT {} FROM {} ORDER BY id", select_list::<E>(), E::TABLE)
}

/// `SELECT` of the row with id `$1`.
#[must_use]
pub fn select_by_id_sql<E: Entity>() -> String {
    format!("SELECT {} FROM {} WHERE id = $1", select_list::<E>(), E::TABLE)
}

/// `INSERT` of every writable column, returning the generated id.
#[must_use]
pub fn insert_sql<E: Entity>() -> String {
    let names: Vec<&str> = E::COLUMNS.iter().map(|c| c.name).collect();
    let values: Vec<String> = E::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| c.write_expr(i + 1))
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
        E::TABLE,
        names.join(", "),
        values.join(", ")
    )
}

/// Full-row `UPDATE` of every writable column; the id is the last
/// parameter.
#[must_use]
pub fn update_sql<E: Entity>() -> String {
    let assignments: Vec<String> = E::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = {}", c.name, c.write_expr(i + 1)))
        .collect();

    format!(
        "UPDATE {} SET {}, updated_at = {UTC_NOW} WHERE id = ${}",
        E::TABLE,
        assignments.join(", "),
        E::COLUMNS.len() + 1
    )
}

/// `DELETE` of the row with id `$1`.
#[must_use]
pub fn delete_sql<E: Entity>() -> String {
    format!("DELETE FROM {} WHERE id = $1", E::TABLE)
}

/// Binds optional text.
#[must_use]
pub fn text(value: Option<&str>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.to_string()))
}

/// Binds an optional integer.
#[must_use]
pub fn int(value: Option<i32>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, DatabaseValue::Int32)
}

/// Binds an optional double.
#[must_use]
pub fn real(value: Option<f64>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, DatabaseValue::Real64)
}

/// Binds an optional date for a [`ColumnKind::Date`] column.
#[must_use]
pub fn date(value: Option<NaiveDate>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |d| {
        DatabaseValue::String(d.format("%Y-%m-%d").to_string())
    })
}

/// Binds an optional vocabulary value as its `snake_case` name.
#[must_use]
pub fn vocabulary<T: AsRef<str>>(value: Option<T>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.as_ref().to_string()))
}

/// Binds a geometry for a [`ColumnKind::Geometry`] column.
#[must_use]
pub fn geometry(value: &Geometry) -> DatabaseValue {
    DatabaseValue::String(road_assets_geometry::encode(value))
}

/// Binds a JSON document for a [`ColumnKind::Json`] column.
#[must_use]
pub fn json(value: &serde_json::Value) -> DatabaseValue {
    DatabaseValue::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_columns_are_tagged_with_srid_on_write() {
        assert_eq!(
            Column::geometry("geometry").write_expr(4),
            "ST_SetSRID(ST_GeomFromGeoJSON($4::text), 3405)"
        );
    }

    #[test]
    fn geometry_columns_are_read_as_geojson() {
        assert_eq!(
            Column::geometry("geometry").select_expr(),
            "ST_AsGeoJSON(geometry, 15) AS geometry"
        );
    }

    #[test]
    fn json_and_date_columns_exchange_text() {
        assert_eq!(Column::json("attrs").write_expr(1), "$1::text::jsonb");
        assert_eq!(Column::json("attrs").select_expr(), "attrs::text AS attrs");
        assert_eq!(Column::date("due").write_expr(2), "$2::text::date");
        assert_eq!(Column::plain("name").select_expr(), "name");
    }

    #[test]
    fn binds_dates_as_iso_text() {
        assert!(matches!(
            date(NaiveDate::from_ymd_opt(2024, 3, 9)),
            DatabaseValue::String(ref s) if s == "2024-03-09"
        ));
        assert!(matches!(date(None), DatabaseValue::Null));
    }

    #[test]
    fn update_stamps_updated_at_in_utc() {
        assert_eq!(
            update_sql::<road_assets_database_models::AssetCategory>(),
            "UPDATE asset_categories SET name = $1, code = $2, description = $3, \
             geometry_type = $4, updated_at = (NOW() AT TIME ZONE 'utc') WHERE id = $5"
        );
    }
}
