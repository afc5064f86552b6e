//! Rendered shape model and ring helpers.
//!
//! A [`Shape`] is the engine's own copy of a vector layer's coordinates. The
//! render surface draws it; the engine mutates it during editing and converts
//! it back into GeoJSON on save. Polygon rings are held open: the closing
//! duplicate vertex of a GeoJSON ring is dropped on the way in and re-added by
//! [`shape_to_geometry`].

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use crate::geo::{Bounds, Geometry, LngLat, Ring};

/// Geometry of one rendered layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A point marker.
    Marker { position: LngLat },
    /// A closed polygon: exterior ring first, then holes. Rings are open.
    Polygon { rings: Vec<Ring> },
    /// Several polygons drawn as one layer.
    MultiPolygon { polygons: Vec<Vec<Ring>> },
    /// One or more open paths.
    Polyline { paths: Vec<Ring> },
}

impl Shape {
    /// Build the shape a map widget would create for `geometry`.
    #[must_use]
    pub fn from_geometry(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point(p) => Self::Marker { position: *p },
            Geometry::LineString(path) => Self::Polyline { paths: vec![path.clone()] },
            Geometry::MultiLineString(paths) => Self::Polyline { paths: paths.clone() },
            Geometry::Polygon(rings) => Self::Polygon { rings: rings.iter().map(|r| open_ring(r)).collect() },
            Geometry::MultiPolygon(polys) => Self::MultiPolygon {
                polygons: polys
                    .iter()
                    .map(|rings| rings.iter().map(|r| open_ring(r)).collect())
                    .collect(),
            },
        }
    }

    /// Whether the shape is a vector outline that edit handles can attach to.
    #[must_use]
    pub fn is_path(&self) -> bool {
        !matches!(self, Self::Marker { .. })
    }

    /// Every vertex of the shape, in drawing order.
    #[must_use]
    pub fn points(&self) -> Vec<LngLat> {
        match self {
            Self::Marker { position } => vec![*position],
            Self::Polygon { rings } | Self::Polyline { paths: rings } => rings.iter().flatten().copied().collect(),
            Self::MultiPolygon { polygons } => polygons.iter().flatten().flatten().copied().collect(),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points().iter())
    }
}

/// Drop the closing vertex of a ring that repeats its first vertex.
fn open_ring(ring: &[LngLat]) -> Ring {
    match ring {
        [first, .., last] if first == last => ring[..ring.len() - 1].to_vec(),
        _ => ring.to_vec(),
    }
}

/// Append the first vertex to a ring that is not already closed.
fn close_ring(ring: &[LngLat]) -> Ring {
    let mut out = ring.to_vec();
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if ring.len() > 1 && first != last {
            out.push(*first);
        }
    }
    out
}

/// The outer ring of a polygon or the first path of a polyline. Empty for
/// markers and for shapes without coordinates.
#[must_use]
pub fn ring_of(shape: &Shape) -> &[LngLat] {
    match shape {
        Shape::Marker { .. } => &[],
        Shape::Polygon { rings } | Shape::Polyline { paths: rings } => rings.first().map_or(&[][..], Vec::as_slice),
        Shape::MultiPolygon { polygons } => polygons
            .first()
            .and_then(|rings| rings.first())
            .map_or(&[][..], Vec::as_slice),
    }
}

/// Replace the outer ring. Closed shapes become a single-ring polygon (holes
/// and further members are dropped); polylines become a single open path.
/// Markers are left untouched.
pub fn set_ring(shape: &mut Shape, ring: Ring) {
    match shape {
        Shape::Marker { .. } => {}
        Shape::Polygon { .. } | Shape::MultiPolygon { .. } => *shape = Shape::Polygon { rings: vec![ring] },
        Shape::Polyline { paths } => *paths = vec![ring],
    }
}

/// Translate every vertex of `start` by the delta between two pointer positions.
#[must_use]
pub fn translate_ring(start: &[LngLat], from: LngLat, to: LngLat) -> Ring {
    let d_lng = to.lng - from.lng;
    let d_lat = to.lat - from.lat;
    start.iter().map(|p| p.offset(d_lng, d_lat)).collect()
}

/// Convert the shape's current coordinates back into GeoJSON.
///
/// Markers become `Point`, polygons `Polygon`/`MultiPolygon` with closed rings,
/// and polylines `LineString` (one path) or `MultiLineString` (otherwise).
/// Returns `None` when a polygon has no coordinates left to serialize.
#[must_use]
pub fn shape_to_geometry(shape: &Shape) -> Option<Geometry> {
    match shape {
        Shape::Marker { position } => Some(Geometry::Point(*position)),
        Shape::Polygon { rings } => {
            if rings.iter().all(Vec::is_empty) {
                return None;
            }
            Some(Geometry::Polygon(rings.iter().map(|r| close_ring(r)).collect()))
        }
        Shape::MultiPolygon { polygons } => Some(Geometry::MultiPolygon(
            polygons
                .iter()
                .map(|rings| rings.iter().map(|r| close_ring(r)).collect())
                .collect(),
        )),
        Shape::Polyline { paths } => match paths.as_slice() {
            [single] => Some(Geometry::LineString(single.clone())),
            _ => Some(Geometry::MultiLineString(paths.clone())),
        },
    }
}
