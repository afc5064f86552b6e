//! The retained-mode render surface the engine draws into.
//!
//! The engine never talks to a map widget directly. The host implements
//! [`RenderSurface`] on top of its widget (vector layers, marker panes, a
//! preview layer) and routes widget events on the returned [`LayerId`]s and
//! [`HandleId`]s back into [`crate::engine::EngineCore`].

use serde::{Deserialize, Serialize};

use crate::geo::LngLat;
use crate::shape::Shape;
use crate::style::{MarkerStyle, ObjectStyle, ZoneStyle};

/// Which kind of domain entity a layer represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LayerKind {
    #[serde(rename = "masterPlan")]
    Zone,
    #[serde(rename = "object")]
    Object,
}

/// Tag on every rendered layer; always resolves back to the entity it draws.
/// Also used as the edit and fly-to target reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerMeta {
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub id: i64,
}

impl LayerMeta {
    #[must_use]
    pub fn zone(id: i64) -> Self {
        Self { kind: LayerKind::Zone, id }
    }

    #[must_use]
    pub fn object(id: i64) -> Self {
        Self { kind: LayerKind::Object, id }
    }
}

/// Surface-issued id of a rendered data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// Surface-issued id of an edit handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

/// Role of an edit handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// Sits on a ring vertex; dragging moves the vertex.
    Vertex,
    /// Sits on an edge midpoint; clicking or dragging inserts a vertex.
    Midpoint,
}

/// Everything the surface needs to place one draggable handle.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleSpec {
    pub kind: HandleKind,
    pub position: LngLat,
    /// Fixed pixel size, `(width, height)`; handles do not scale with zoom.
    pub size: (u32, u32),
    /// Pane the handle lives in, stacked above the data layers.
    pub pane: &'static str,
    /// Stacking order the host gives the pane when it creates it.
    pub pane_z_index: i32,
}

/// Styled line of the placement preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLine {
    pub from: LngLat,
    pub to: LngLat,
    pub color: String,
    pub weight: f64,
    pub dash_array: String,
}

/// Round handle marking the center of a radius placement.
#[derive(Debug, Clone, PartialEq)]
pub struct CenterHandle {
    pub position: LngLat,
    pub radius_px: f64,
    pub fill: String,
    pub color: String,
    pub weight: f64,
}

/// Cursor the host should show over the map container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    /// The widget's own cursor.
    #[default]
    Default,
    /// A click places something.
    Pointer,
    /// Something can be dragged.
    Grab,
    /// Something is being dragged.
    Grabbing,
}

impl Cursor {
    /// CSS `cursor` value; empty for the widget default.
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Pointer => "pointer",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
        }
    }
}

/// Full content of the placement preview layer. Each present element replaces
/// the previous one; absent elements are removed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreviewScene {
    /// Circle (radius mode) or corners polygon, with its style.
    pub polygon: Option<(Shape, ZoneStyle)>,
    pub center: Option<CenterHandle>,
    pub line: Option<PreviewLine>,
}

/// Retained-mode drawing interface over the host's map widget.
pub trait RenderSurface {
    /// Remove every data layer (zones and objects).
    fn clear(&mut self);

    /// Draw a zone outline. Clicks on the layer are routed back by id.
    fn add_zone(&mut self, meta: LayerMeta, shape: &Shape, style: &ZoneStyle) -> LayerId;

    /// Draw a point object marker. Clicks on the layer are routed back by id.
    fn add_point(&mut self, meta: LayerMeta, shape: &Shape, style: &MarkerStyle) -> LayerId;

    /// Re-draw a layer after its coordinates changed.
    fn redraw(&mut self, layer: LayerId, shape: &Shape);

    /// Change an object layer's style without touching its geometry.
    fn restyle(&mut self, layer: LayerId, style: &ObjectStyle);

    fn add_handle(&mut self, spec: &HandleSpec) -> HandleId;

    fn move_handle(&mut self, handle: HandleId, position: LngLat);

    fn remove_handle(&mut self, handle: HandleId);

    /// Enable or disable pointer events on the data layers.
    fn set_data_pointer_events(&mut self, enabled: bool);

    /// Replace the placement preview layer's content.
    fn draw_preview(&mut self, scene: &PreviewScene);

    fn clear_preview(&mut self);
}
