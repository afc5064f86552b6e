//! Placement drafts: the transient state of a new zone being defined on the map.
//!
//! A draft progresses through a few clicks until [`is_placement_complete`]
//! holds, then [`placement_to_polygon`] turns it into a committed geometry and
//! the draft is discarded.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use serde::{Deserialize, Serialize};

use crate::circle::circle_to_polygon;
use crate::consts::{CIRCLE_POINTS, PLACEMENT_CORNERS};
use crate::geo::{Geometry, LngLat};

/// How the new zone is being defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMode {
    /// Center click, then radius click.
    Radius,
    /// Four corner clicks.
    Corners,
}

/// An in-progress zone placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PlacementDraft {
    Radius {
        center: Option<LngLat>,
        #[serde(rename = "radiusM")]
        radius_m: f64,
        /// Set by the second click. Hovering alone never fixes the radius.
        #[serde(rename = "radiusFixed", default)]
        radius_fixed: bool,
    },
    Corners {
        points: Vec<LngLat>,
    },
}

impl PlacementDraft {
    /// A fresh draft with nothing placed yet.
    #[must_use]
    pub fn new(mode: PlacementMode, default_radius_m: f64) -> Self {
        match mode {
            PlacementMode::Radius => Self::Radius { center: None, radius_m: default_radius_m, radius_fixed: false },
            PlacementMode::Corners => Self::Corners { points: Vec::new() },
        }
    }

    #[must_use]
    pub fn mode(&self) -> PlacementMode {
        match self {
            Self::Radius { .. } => PlacementMode::Radius,
            Self::Corners { .. } => PlacementMode::Corners,
        }
    }
}

/// Radius drafts are complete once the center is set and the radius has been
/// fixed by a click; corners drafts once exactly [`PLACEMENT_CORNERS`] points
/// are placed.
#[must_use]
pub fn is_placement_complete(draft: &PlacementDraft) -> bool {
    match draft {
        PlacementDraft::Radius { center, radius_fixed, .. } => center.is_some() && *radius_fixed,
        PlacementDraft::Corners { points } => points.len() == PLACEMENT_CORNERS,
    }
}

/// Polygon for the draft, using the default circle resolution.
///
/// Radius drafts only need a center. Corners drafts need exactly
/// [`PLACEMENT_CORNERS`] points; the ring is closed by repeating the first.
#[must_use]
pub fn placement_to_polygon(draft: &PlacementDraft) -> Option<Geometry> {
    placement_to_polygon_with(draft, CIRCLE_POINTS)
}

/// [`placement_to_polygon`] with an explicit circle vertex count.
#[must_use]
pub fn placement_to_polygon_with(draft: &PlacementDraft, circle_points: usize) -> Option<Geometry> {
    match draft {
        PlacementDraft::Radius { center, radius_m, .. } => {
            center.map(|c| circle_to_polygon(c, *radius_m, circle_points))
        }
        PlacementDraft::Corners { points } => {
            if points.len() != PLACEMENT_CORNERS {
                return None;
            }
            let mut ring = points.clone();
            ring.push(points[0]);
            Some(Geometry::Polygon(vec![ring]))
        }
    }
}
