//! Fly-to resolution: turns a target reference into a viewport plan.
//!
//! The engine does not animate the map. It hands the host a [`FlyToPlan`] and
//! the host feeds it to its widget's `flyToBounds` equivalent.

use crate::config::FlyConfig;
use crate::geo::Bounds;
use crate::surface::{LayerKind, LayerMeta};
use crate::sync::DataSync;

/// Viewport animation the host should run.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyToPlan {
    pub target: LayerMeta,
    pub bounds: Bounds,
    pub padding_px: [u32; 2],
    pub max_zoom: u8,
    pub duration_ms: u32,
}

/// Resolve `target` against the rendered layers. Returns `None` when the
/// target is not on the map (no geometry, filtered, or objects hidden).
#[must_use]
pub fn resolve_fly_to(target: LayerMeta, sync: &DataSync, config: &FlyConfig) -> Option<FlyToPlan> {
    let layer = sync.find(target)?;
    let bounds = layer.shape.bounds()?;
    let framing = match target.kind {
        LayerKind::Zone => config.zone,
        LayerKind::Object => config.object,
    };
    Some(FlyToPlan {
        target,
        bounds,
        padding_px: framing.padding_px,
        max_zoom: framing.max_zoom,
        duration_ms: config.duration_ms,
    })
}
