#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geo::{Geometry, LngLat, ZoneId};

/// Ray-casting test: true if `point` lies inside `ring`.
///
/// The ring may be open or closed. Points exactly on an edge may report
/// either result.
#[must_use]
pub fn point_in_ring(point: LngLat, ring: &[LngLat]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].lng, ring[i].lat);
        let (xj, yj) = (ring[j].lng, ring[j].lat);
        // The straddle check excludes horizontal edges, so `yj - yi` is never zero here.
        if (yi > point.lat) != (yj > point.lat) && point.lng < (xj - xi) * (point.lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// True if `point` lies inside a `Polygon` or any member of a `MultiPolygon`.
///
/// Only exterior rings are tested: a point inside a hole still counts as
/// inside. Non-areal geometries never contain a point.
#[must_use]
pub fn point_in_geometry(point: LngLat, geometry: &Geometry) -> bool {
    match geometry {
        Geometry::Polygon(rings) => rings.first().is_some_and(|ring| point_in_ring(point, ring)),
        Geometry::MultiPolygon(polys) => polys
            .iter()
            .any(|rings| rings.first().is_some_and(|ring| point_in_ring(point, ring))),
        Geometry::Point(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => false,
    }
}

/// The first zone, in input order, whose geometry contains `point`.
#[must_use]
pub fn zone_containing(point: LngLat, zones: &[(ZoneId, Geometry)]) -> Option<ZoneId> {
    zones
        .iter()
        .find(|(_, geometry)| point_in_geometry(point, geometry))
        .map(|(id, _)| *id)
}
