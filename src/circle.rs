//! Circle approximation for radius-based zone placement.
//!
//! Radii are converted to degrees at the center latitude, so the result is a
//! planar approximation rather than a geodesic circle. That is accurate enough
//! for zone-sized areas and degrades near the poles and for very large radii.

#[cfg(test)]
#[path = "circle_test.rs"]
mod circle_test;

use std::f64::consts::PI;

use crate::consts::{EARTH_RADIUS_M, METERS_PER_DEGREE_LAT, MIN_LNG_COSINE};
use crate::geo::{Geometry, LngLat, Ring};

/// Convert a radius in meters to `(lat_degrees, lng_degrees)` at `center_lat`.
///
/// When `cos(latitude)` falls to [`MIN_LNG_COSINE`] or below the longitudinal
/// radius degenerates to 0.
#[must_use]
pub fn meters_to_degrees(radius_m: f64, center_lat: f64) -> (f64, f64) {
    let lng_scale = center_lat.to_radians().cos();
    let lat_deg = radius_m / METERS_PER_DEGREE_LAT;
    let lng_deg = if lng_scale > MIN_LNG_COSINE { radius_m / (METERS_PER_DEGREE_LAT * lng_scale) } else { 0.0 };
    (lat_deg, lng_deg)
}

/// Closed ring of `point_count + 1` positions approximating a circle. A zero
/// point count yields an empty ring.
#[must_use]
pub fn circle_ring(center: LngLat, radius_m: f64, point_count: usize) -> Ring {
    if point_count == 0 {
        return Ring::new();
    }
    let (radius_lat, radius_lng) = meters_to_degrees(radius_m, center.lat);
    let n = point_count;
    #[allow(clippy::cast_precision_loss)]
    let step = 2.0 * PI / n as f64;
    let mut ring: Ring = (0..n)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let angle = step * i as f64;
            LngLat::new(center.lng + radius_lng * angle.cos(), center.lat + radius_lat * angle.sin())
        })
        .collect();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

/// GeoJSON polygon approximating a circle around `center`.
#[must_use]
pub fn circle_to_polygon(center: LngLat, radius_m: f64, point_count: usize) -> Geometry {
    Geometry::Polygon(vec![circle_ring(center, radius_m, point_count)])
}

/// Great-circle (haversine) distance in meters.
#[must_use]
pub fn distance_m(a: LngLat, b: LngLat) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}
