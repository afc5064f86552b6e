//! Geographic model: coordinates, GeoJSON geometry, and the domain records.
//!
//! Zones and objects arrive from the backend with their geometry still as raw
//! JSON. Parsing happens in the sync pass via [`Geometry::from_value`], which
//! is deliberately tolerant: anything absent, malformed, or empty yields
//! `None` and the entity is left off the map.

#[cfg(test)]
#[path = "geo_test.rs"]
mod geo_test;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};

/// Identifier of a zone (master plan).
pub type ZoneId = i64;

/// Identifier of a plan object.
pub type ObjectId = i64;

/// A WGS84 position. Serialized as a GeoJSON position `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    #[must_use]
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Midpoint in coordinate space (not along the great circle).
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            lng: (self.lng + other.lng) / 2.0,
            lat: (self.lat + other.lat) / 2.0,
        }
    }

    /// This position shifted by a coordinate delta.
    #[must_use]
    pub fn offset(self, d_lng: f64, d_lat: f64) -> Self {
        Self { lng: self.lng + d_lng, lat: self.lat + d_lat }
    }
}

impl Serialize for LngLat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.lng)?;
        tup.serialize_element(&self.lat)?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for LngLat {
    /// Accepts `[lng, lat]` and longer positions; extra ordinates are dropped.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<f64>::deserialize(deserializer)?;
        match raw.as_slice() {
            [lng, lat, ..] => Ok(Self { lng: *lng, lat: *lat }),
            _ => Err(de::Error::invalid_length(raw.len(), &"a position with at least 2 ordinates")),
        }
    }
}

/// An ordered outline of positions.
pub type Ring = Vec<LngLat>;

/// Axis-aligned bounding box in coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LngLat,
    pub north_east: LngLat,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a LngLat>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self { south_west: first, north_east: first };
        for p in iter {
            bounds.extend(*p);
        }
        Some(bounds)
    }

    /// Grow the box to include `p`.
    pub fn extend(&mut self, p: LngLat) {
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
    }

    #[must_use]
    pub fn center(&self) -> LngLat {
        self.south_west.midpoint(self.north_east)
    }
}

/// GeoJSON geometry, serialized as `{"type": ..., "coordinates": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(LngLat),
    LineString(Vec<LngLat>),
    MultiLineString(Vec<Vec<LngLat>>),
    /// Exterior ring first, then holes.
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    /// Parse an opaque GeoJSON value. Returns `None` for absent, malformed,
    /// unsupported (e.g. `GeometryCollection`), or empty geometry.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        match serde_json::from_value::<Self>(value.clone()) {
            Ok(geometry) if !geometry.is_empty() => Some(geometry),
            Ok(_) | Err(_) => None,
        }
    }

    /// Whether the geometry has nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Point(_) => false,
            Self::LineString(path) => path.is_empty(),
            Self::MultiLineString(paths) => paths.iter().all(Vec::is_empty),
            Self::Polygon(rings) => rings.first().map_or(true, Vec::is_empty),
            Self::MultiPolygon(polys) => polys
                .iter()
                .all(|rings| rings.first().map_or(true, Vec::is_empty)),
        }
    }

    /// GeoJSON type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::LineString(_) => "LineString",
            Self::MultiLineString(_) => "MultiLineString",
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// A single position standing in for the geometry when testing
    /// containment: the point itself, or the first exterior vertex of a
    /// (multi)polygon. Lines have no representative point.
    #[must_use]
    pub fn representative_point(&self) -> Option<LngLat> {
        match self {
            Self::Point(p) => Some(*p),
            Self::Polygon(rings) => rings.first()?.first().copied(),
            Self::MultiPolygon(polys) => polys.first()?.first()?.first().copied(),
            Self::LineString(_) | Self::MultiLineString(_) => None,
        }
    }
}

/// A zone (master plan) as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    #[serde(default)]
    pub name: String,
    /// Raw GeoJSON geometry, possibly absent or malformed.
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
    /// Area in square meters, derived server-side from the geometry.
    #[serde(default)]
    pub area_m2: Option<f64>,
}

/// A plan object (building, parcel, infrastructure) as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanObject {
    pub id: ObjectId,
    #[serde(default)]
    pub name: Option<String>,
    /// Raw GeoJSON geometry, possibly absent or malformed.
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
    #[serde(default)]
    pub area_m2: Option<f64>,
    /// Remaining domain attributes, passed through untouched.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}
