//! Column decoders shared by the entity row mappers.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use moosicbox_json_utils::database::ToValue as _;
use road_assets_geometry::Geometry;
use switchy_database::Row;

use crate::RepoError;

/// Wraps a decode failure for `column` as [`RepoError::Unavailable`].
pub fn column_error<E: Display>(column: &'static str) -> impl FnOnce(E) -> RepoError {
    move |e| RepoError::unavailable("decode", format!("column {column}: {e}"))
}

pub fn id(row: &Row) -> Result<i32, RepoError> {
    row.to_value("id").map_err(column_error("id"))
}

pub fn int(row: &Row, column: &'static str) -> Result<i32, RepoError> {
    row.to_value(column).map_err(column_error(column))
}

pub fn optional_int(row: &Row, column: &'static str) -> Result<Option<i32>, RepoError> {
    row.to_value(column).map_err(column_error(column))
}

pub fn real(row: &Row, column: &'static str) -> Result<f64, RepoError> {
    row.to_value(column).map_err(column_error(column))
}

pub fn optional_real(row: &Row, column: &'static str) -> Result<Option<f64>, RepoError> {
    row.to_value(column).map_err(column_error(column))
}

pub fn boolean(row: &Row, column: &'static str) -> Result<bool, RepoError> {
    row.to_value(column).map_err(column_error(column))
}

pub fn text(row: &Row, column: &'static str) -> Result<String, RepoError> {
    row.to_value(column).map_err(column_error(column))
}

pub fn optional_text(row: &Row, column: &'static str) -> Result<Option<String>, RepoError> {
    row.to_value(column).map_err(column_error(column))
}

/// Decodes a geometry column selected with `ST_AsGeoJSON`.
pub fn geometry(row: &Row, column: &'static str) -> Result<Geometry, RepoError> {
    let geojson = text(row, column)?;
    road_assets_geometry::decode(&geojson).map_err(column_error(column))
}

/// Decodes a `JSONB` column selected as text.
pub fn json(row: &Row, column: &'static str) -> Result<serde_json::Value, RepoError> {
    let raw = text(row, column)?;
    serde_json::from_str(&raw).map_err(column_error(column))
}

pub fn date(row: &Row, column: &'static str) -> Result<NaiveDate, RepoError> {
    parse_date(column, &text(row, column)?)
}

pub fn optional_date(row: &Row, column: &'static str) -> Result<Option<NaiveDate>, RepoError> {
    optional_text(row, column)?
        .map(|raw| parse_date(column, &raw))
        .transpose()
}

fn parse_date(column: &'static str, raw: &str) -> Result<NaiveDate, RepoError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(column_error(column))
}

/// Decodes a `TIMESTAMP` column holding UTC wall time.
pub fn timestamp(row: &Row, column: &'static str) -> Result<DateTime<Utc>, RepoError> {
    let naive: NaiveDateTime = row.to_value(column).map_err(column_error(column))?;
    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}

pub fn optional_timestamp(
    row: &Row,
    column: &'static str,
) -> Result<Option<DateTime<Utc>>, RepoError> {
    let naive: Option<NaiveDateTime> = row.to_value(column).map_err(column_error(column))?;
    Ok(naive.map(|n| DateTime::from_naive_utc_and_offset(n, Utc)))
}

/// Decodes a vocabulary column stored as its `snake_case` name.
pub fn vocabulary<T>(row: &Row, column: &'static str) -> Result<T, RepoError>
where
    T: FromStr,
    T::Err: Display,
{
    text(row, column)?.parse().map_err(column_error(column))
}

pub fn optional_vocabulary<T>(row: &Row, column: &'static str) -> Result<Option<T>, RepoError>
where
    T: FromStr,
    T::Err: Display,
{
    optional_text(row, column)?
        .map(|raw| raw.parse().map_err(column_error(column)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_postgres_date_text() {
        assert_eq!(
            parse_date("due_date", "2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn bad_date_is_unavailable_naming_column() {
        let err = parse_date("due_date", "29/02/2024").unwrap_err();
        let RepoError::Unavailable { operation, cause } = err else {
            panic!("expected unavailable");
        };
        assert_eq!(operation, "decode");
        assert!(cause.starts_with("column due_date:"));
    }
}
