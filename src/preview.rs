//! Placement preview: pointer handling and drawing for a draft zone.
//!
//! The preview reacts only to the draft and raw pointer positions; it never
//! looks at the committed dataset.

#[cfg(test)]
#[path = "preview_test.rs"]
mod preview_test;

use crate::circle::{circle_to_polygon, distance_m};
use crate::config::{PlacementConfig, StyleConfig};
use crate::consts::PLACEMENT_CORNERS;
use crate::geo::{Geometry, LngLat};
use crate::placement::{PlacementDraft, PlacementMode, is_placement_complete, placement_to_polygon_with};
use crate::shape::Shape;
use crate::style::ZoneStyle;
use crate::surface::{CenterHandle, Cursor, PreviewLine, PreviewScene, RenderSurface};
use crate::theme::Palette;

#[derive(Debug, Clone)]
pub struct PlacementPreview {
    draft: PlacementDraft,
    pointer: Option<LngLat>,
    config: PlacementConfig,
}

impl PlacementPreview {
    #[must_use]
    pub fn new(mode: PlacementMode, config: &PlacementConfig) -> Self {
        Self { draft: PlacementDraft::new(mode, config.default_radius_m), pointer: None, config: config.clone() }
    }

    #[must_use]
    pub fn draft(&self) -> &PlacementDraft {
        &self.draft
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        is_placement_complete(&self.draft)
    }

    fn clamped_radius(&self, center: LngLat, at: LngLat) -> f64 {
        distance_m(center, at).round().clamp(self.config.min_radius_m, self.config.max_radius_m)
    }

    /// Track the pointer. Returns whether the preview needs a redraw.
    pub fn on_pointer_move(&mut self, at: LngLat) -> bool {
        self.pointer = Some(at);
        let next_radius = match &self.draft {
            PlacementDraft::Radius { center: Some(center), radius_fixed: false, .. } => {
                self.clamped_radius(*center, at)
            }
            PlacementDraft::Radius { .. } => return false,
            PlacementDraft::Corners { points } => return !points.is_empty() && points.len() < PLACEMENT_CORNERS,
        };
        match &mut self.draft {
            PlacementDraft::Radius { radius_m, .. } if (*radius_m - next_radius).abs() > f64::EPSILON => {
                *radius_m = next_radius;
                true
            }
            PlacementDraft::Radius { .. } | PlacementDraft::Corners { .. } => false,
        }
    }

    /// Apply a map click. Radius: the first click sets the center, the second
    /// fixes the radius at the click's distance. Corners: append a point until
    /// the corner count is reached. Returns whether the draft changed.
    pub fn on_click(&mut self, at: LngLat) -> bool {
        self.pointer = Some(at);
        let fixed_radius = match &self.draft {
            PlacementDraft::Radius { center: Some(center), radius_fixed: false, .. } => {
                Some(self.clamped_radius(*center, at))
            }
            PlacementDraft::Radius { .. } | PlacementDraft::Corners { .. } => None,
        };
        match &mut self.draft {
            PlacementDraft::Radius { center, radius_m, radius_fixed } => {
                if center.is_none() {
                    *center = Some(at);
                    return true;
                }
                match fixed_radius {
                    Some(r) => {
                        *radius_m = r;
                        *radius_fixed = true;
                        true
                    }
                    None => false,
                }
            }
            PlacementDraft::Corners { points } => {
                if points.len() >= PLACEMENT_CORNERS {
                    return false;
                }
                points.push(at);
                true
            }
        }
    }

    fn radius_adjustable(&self) -> bool {
        matches!(self.draft, PlacementDraft::Radius { center: Some(_), radius_fixed: false, .. })
    }

    /// Resting cursor for the current sub-state.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        if self.radius_adjustable() { Cursor::Grab } else { Cursor::Pointer }
    }

    /// Cursor while a button is held over the map.
    #[must_use]
    pub fn pressed_cursor(&self) -> Cursor {
        if self.radius_adjustable() { Cursor::Grabbing } else { self.cursor() }
    }

    /// Everything the preview layer should show for the current draft.
    #[must_use]
    pub fn scene(&self, palette: &Palette, style: &StyleConfig) -> PreviewScene {
        let fill = ZoneStyle {
            color: palette.primary.clone(),
            weight: style.zone_weight_selected,
            fill_color: palette.primary.clone(),
            fill_opacity: style.zone_fill_opacity_selected,
            dash_array: None,
        };
        match &self.draft {
            PlacementDraft::Radius { center: None, .. } => PreviewScene::default(),
            PlacementDraft::Radius { center: Some(center), radius_m, .. } => {
                let circle = circle_to_polygon(*center, *radius_m, self.config.circle_points);
                PreviewScene {
                    polygon: Some((Shape::from_geometry(&circle), fill)),
                    center: Some(CenterHandle {
                        position: *center,
                        radius_px: style.center_handle_radius,
                        fill: palette.background.clone(),
                        color: palette.primary.clone(),
                        weight: style.center_handle_weight,
                    }),
                    line: None,
                }
            }
            PlacementDraft::Corners { points } => {
                let polygon = (points.len() >= 2).then(|| (Shape::Polygon { rings: vec![points.clone()] }, fill));
                let line = match (points.last(), self.pointer) {
                    (Some(&last), Some(pointer)) if points.len() < PLACEMENT_CORNERS => Some(PreviewLine {
                        from: last,
                        to: pointer,
                        color: palette.primary.clone(),
                        weight: style.preview_line_weight,
                        dash_array: style.preview_line_dash.clone(),
                    }),
                    _ => None,
                };
                PreviewScene { polygon, center: None, line }
            }
        }
    }

    pub fn draw(&self, palette: &Palette, style: &StyleConfig, surface: &mut dyn RenderSurface) {
        surface.draw_preview(&self.scene(palette, style));
    }

    /// Committed polygon, once the draft is complete.
    #[must_use]
    pub fn commit(&self) -> Option<Geometry> {
        if !self.is_complete() {
            return None;
        }
        placement_to_polygon_with(&self.draft, self.config.circle_points)
    }
}
