#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! GeoJSON geometry codec for road assets.
//!
//! Converts between the textual `GeoJSON` geometry form used on the wire and
//! in `PostGIS` (`ST_GeomFromGeoJSON` / `ST_AsGeoJSON`) and the in-memory
//! [`Geometry`] value. Only `Point`, `LineString` and `Polygon` are
//! supported; every position is a `[x, y]` pair of `f64`.
//!
//! Tagging the geometry with [`SRID`] on write is the job of the storage
//! layer, not of this codec.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// Spatial reference identifier every stored geometry is tagged with
/// (VN-2000 / UTM zone 48N).
pub const SRID: i32 = 3405;

/// A single `[x, y]` coordinate pair.
pub type Position = [f64; 2];

/// Errors produced while decoding or validating a geometry.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    /// The input was not well-formed JSON.
    #[error("geometry is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON value was not an object with a string `type` member.
    #[error("geometry has no \"type\" member")]
    MissingType,

    /// The `type` member names a geometry kind this codec does not handle.
    #[error("unsupported geometry type \"{0}\": expected Point, LineString or Polygon")]
    UnsupportedType(String),

    /// The `coordinates` member does not match the declared `type`.
    #[error("invalid {kind} coordinates: {message}")]
    Coordinates {
        /// Declared geometry kind.
        kind: GeometryKind,
        /// Description of the structural mismatch.
        message: String,
    },
}

/// The geometry kinds accepted by the codec.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum GeometryKind {
    /// A single position.
    Point,
    /// An open or closed path of two or more positions.
    LineString,
    /// One exterior ring followed by optional interior rings.
    Polygon,
}

impl GeometryKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Point, Self::LineString, Self::Polygon]
    }
}

/// An in-memory `GeoJSON` geometry.
///
/// Values produced by [`decode`] or by the checked constructors always
/// satisfy the shape rules of their kind, so [`encode`] cannot fail on them.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A single position.
    Point(Position),
    /// At least two positions.
    LineString(Vec<Position>),
    /// Rings of at least four positions, each closed (first == last).
    Polygon(Vec<Vec<Position>>),
}

impl Geometry {
    /// Creates a point geometry.
    #[must_use]
    pub const fn point(x: f64, y: f64) -> Self {
        Self::Point([x, y])
    }

    /// Creates a line string, checking it has at least two positions.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Coordinates`] if fewer than two positions are
    /// given.
    pub fn line_string(positions: Vec<Position>) -> Result<Self, GeometryError> {
        let geometry = Self::LineString(positions);
        geometry.validate()?;
        Ok(geometry)
    }

    /// Creates a polygon, checking every ring is closed and long enough.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Coordinates`] if there are no rings or any
    /// ring is open or shorter than four positions.
    pub fn polygon(rings: Vec<Vec<Position>>) -> Result<Self, GeometryError> {
        let geometry = Self::Polygon(rings);
        geometry.validate()?;
        Ok(geometry)
    }

    /// Returns the kind of this geometry.
    #[must_use]
    pub const fn kind(&self) -> GeometryKind {
        match self {
            Self::Point(_) => GeometryKind::Point,
            Self::LineString(_) => GeometryKind::LineString,
            Self::Polygon(_) => GeometryKind::Polygon,
        }
    }

    /// Checks the shape rules for this geometry's kind.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Coordinates`] describing the first violation.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Self::Point(_) => Ok(()),
            Self::LineString(positions) => {
                if positions.len() < 2 {
                    return Err(coordinates_error(
                        GeometryKind::LineString,
                        format!("expected at least 2 positions, got {}", positions.len()),
                    ));
                }
                Ok(())
            }
            Self::Polygon(rings) => {
                if rings.is_empty() {
                    return Err(coordinates_error(
                        GeometryKind::Polygon,
                        "expected at least one ring".to_string(),
                    ));
                }
                for (index, ring) in rings.iter().enumerate() {
                    if ring.len() < 4 {
                        return Err(coordinates_error(
                            GeometryKind::Polygon,
                            format!(
                                "ring {index} has {} positions, expected at least 4",
                                ring.len()
                            ),
                        ));
                    }
                    if ring.first() != ring.last() {
                        return Err(coordinates_error(
                            GeometryKind::Polygon,
                            format!("ring {index} is not closed"),
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    fn to_geojson(&self) -> geojson::Geometry {
        let value = match self {
            Self::Point(position) => geojson::Value::Point(position.to_vec()),
            Self::LineString(positions) => {
                geojson::Value::LineString(positions.iter().map(|p| p.to_vec()).collect())
            }
            Self::Polygon(rings) => geojson::Value::Polygon(
                rings
                    .iter()
                    .map(|ring| ring.iter().map(|p| p.to_vec()).collect())
                    .collect(),
            ),
        };
        geojson::Geometry::new(value)
    }

    fn from_geojson(kind: GeometryKind, geometry: geojson::Geometry) -> Result<Self, GeometryError> {
        let decoded = match geometry.value {
            geojson::Value::Point(position) => {
                Self::Point(to_position(GeometryKind::Point, &position)?)
            }
            geojson::Value::LineString(positions) => Self::LineString(
                positions
                    .iter()
                    .map(|p| to_position(GeometryKind::LineString, p))
                    .collect::<Result<_, _>>()?,
            ),
            geojson::Value::Polygon(rings) => Self::Polygon(
                rings
                    .iter()
                    .map(|ring| {
                        ring.iter()
                            .map(|p| to_position(GeometryKind::Polygon, p))
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .collect::<Result<_, _>>()?,
            ),
            _ => {
                return Err(coordinates_error(
                    kind,
                    "coordinates do not match the declared type".to_string(),
                ));
            }
        };
        if decoded.kind() != kind {
            return Err(coordinates_error(
                kind,
                format!("coordinates decoded as {}", decoded.kind()),
            ));
        }
        decoded.validate()?;
        Ok(decoded)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

fn coordinates_error(kind: GeometryKind, message: String) -> GeometryError {
    GeometryError::Coordinates { kind, message }
}

fn to_position(kind: GeometryKind, ordinates: &[f64]) -> Result<Position, GeometryError> {
    match ordinates {
        [x, y] => Ok([*x, *y]),
        _ => Err(coordinates_error(
            kind,
            format!("position must have 2 ordinates, got {}", ordinates.len()),
        )),
    }
}

/// Decodes a textual `GeoJSON` geometry.
///
/// # Errors
///
/// * [`GeometryError::Json`] if `text` is not well-formed JSON
/// * [`GeometryError::MissingType`] if there is no string `type` member
/// * [`GeometryError::UnsupportedType`] for any kind other than `Point`,
///   `LineString` or `Polygon`
/// * [`GeometryError::Coordinates`] if `coordinates` does not match `type`
pub fn decode(text: &str) -> Result<Geometry, GeometryError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    from_json_value(value)
}

/// Decodes an already-parsed JSON value as a `GeoJSON` geometry.
///
/// # Errors
///
/// Same as [`decode`], minus the JSON syntax case.
pub fn from_json_value(value: serde_json::Value) -> Result<Geometry, GeometryError> {
    let type_name = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or(GeometryError::MissingType)?;

    let kind: GeometryKind = type_name
        .parse()
        .map_err(|_| GeometryError::UnsupportedType(type_name.to_string()))?;

    let parsed: geojson::Geometry =
        serde_json::from_value(value).map_err(|e| coordinates_error(kind, e.to_string()))?;

    let geometry = Geometry::from_geojson(kind, parsed)?;

    log::trace!("Decoded {kind} geometry");
    Ok(geometry)
}

/// Encodes a geometry into its textual `GeoJSON` form.
#[must_use]
pub fn encode(geometry: &Geometry) -> String {
    geojson::GeoJson::Geometry(geometry.to_geojson()).to_string()
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_geojson().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        from_json_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec<Position>> {
        vec![vec![
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 10.0],
            [0.0, 10.0],
            [0.0, 0.0],
        ]]
    }

    #[test]
    fn round_trips_every_kind() {
        let geometries = [
            Geometry::point(105.8, 21.0),
            Geometry::line_string(vec![[105.8, 21.0], [105.81, 21.005], [105.83, 21.01]])
                .unwrap(),
            Geometry::polygon(square()).unwrap(),
        ];

        for geometry in geometries {
            let text = encode(&geometry);
            assert_eq!(decode(&text).unwrap(), geometry, "round trip of {text}");
        }
    }

    #[test]
    fn round_trip_keeps_full_double_precision() {
        let geometry = Geometry::point(587_123.123_456_789_1, 2_323_456.987_654_321);
        assert_eq!(decode(&encode(&geometry)).unwrap(), geometry);
    }

    #[test]
    fn encodes_point_as_geojson_object() {
        let value: serde_json::Value =
            serde_json::from_str(&encode(&Geometry::point(105.8, 21.0))).unwrap();
        assert_eq!(value["type"], "Point");
        assert_eq!(value["coordinates"], serde_json::json!([105.8, 21.0]));
    }

    #[test]
    fn rejects_point_with_three_ordinates() {
        let err = decode(r#"{"type":"Point","coordinates":[1,2,3]}"#).unwrap_err();
        assert!(
            matches!(
                err,
                GeometryError::Coordinates {
                    kind: GeometryKind::Point,
                    ..
                }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn rejects_unknown_type() {
        let err = decode(r#"{"type":"Circle","coordinates":[1,2]}"#).unwrap_err();
        assert!(matches!(err, GeometryError::UnsupportedType(ref t) if t == "Circle"));
    }

    #[test]
    fn rejects_multi_geometries() {
        let err = decode(r#"{"type":"MultiPoint","coordinates":[[1,2]]}"#).unwrap_err();
        assert!(matches!(err, GeometryError::UnsupportedType(_)));
    }

    #[test]
    fn rejects_missing_type() {
        assert!(matches!(
            decode(r#"{"coordinates":[1,2]}"#),
            Err(GeometryError::MissingType)
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            decode(r#"{"type":"Point","#),
            Err(GeometryError::Json(_))
        ));
    }

    #[test]
    fn rejects_ragged_polygon() {
        let err = decode(r#"{"type":"Polygon","coordinates":[[0,0],[1,0],[1,1],[0,0]]}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            GeometryError::Coordinates {
                kind: GeometryKind::Polygon,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unclosed_ring() {
        let err = decode(r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1]]]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("not closed"), "{err}");
    }

    #[test]
    fn rejects_single_position_line_string() {
        assert!(decode(r#"{"type":"LineString","coordinates":[[0,0]]}"#).is_err());
        assert!(Geometry::line_string(vec![[0.0, 0.0]]).is_err());
    }

    #[test]
    fn deserializes_inside_request_bodies() {
        #[derive(Deserialize)]
        struct Body {
            geometry: Geometry,
        }

        let body: Body =
            serde_json::from_str(r#"{"geometry":{"type":"Point","coordinates":[105.8,21.0]}}"#)
                .unwrap();
        assert_eq!(body.geometry, Geometry::point(105.8, 21.0));

        let bad = serde_json::from_str::<Body>(r#"{"geometry":{"type":"Point","coordinates":[1]}}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn kind_names_match_geojson_types() {
        for kind in GeometryKind::all() {
            let parsed: GeometryKind = kind.as_ref().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
        assert_eq!(GeometryKind::LineString.to_string(), "LineString");
    }
}
