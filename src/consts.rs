//! Shared numeric constants for the engine.

// ── Geodesy ─────────────────────────────────────────────────────

/// Meters per degree of latitude (WGS84 approximation).
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Lower bound on `cos(latitude)` before longitudinal scaling collapses to zero.
pub const MIN_LNG_COSINE: f64 = 0.01;

/// Mean earth radius in meters, used for pointer distance.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ── Placement ───────────────────────────────────────────────────

/// Number of corners a corners-mode placement needs.
pub const PLACEMENT_CORNERS: usize = 4;

/// Default vertex count for circle approximation.
pub const CIRCLE_POINTS: usize = 32;

// ── Layers ──────────────────────────────────────────────────────

/// Pane that edit handles are placed in, layered above the data pane.
pub const EDIT_MARKERS_PANE: &str = "editMarkersPane";

/// Stacking order of [`EDIT_MARKERS_PANE`].
pub const EDIT_PANE_Z_INDEX: i32 = 1000;
