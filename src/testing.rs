//! Test doubles and fixtures: an in-memory render surface, an in-memory
//! geometry store, and dataset builders.

use std::cell::RefCell;
use std::collections::BTreeMap;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde_json::json;

use crate::error::StoreError;
use crate::geo::{Geometry, LngLat, ObjectId, PlanObject, Zone, ZoneId};
use crate::session::GeometryStore;
use crate::shape::Shape;
use crate::style::{MarkerStyle, ObjectStyle, ZoneStyle};
use crate::surface::{HandleId, HandleKind, HandleSpec, LayerId, LayerMeta, PreviewScene, RenderSurface};

/// One drawn data layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnLayer {
    pub meta: LayerMeta,
    pub shape: Shape,
    pub zone_style: Option<ZoneStyle>,
    pub marker_style: Option<MarkerStyle>,
    pub restyled: Option<ObjectStyle>,
}

/// Records every surface call and keeps the current drawing state.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: u64,
    pub layers: BTreeMap<LayerId, DrawnLayer>,
    pub handles: BTreeMap<HandleId, HandleSpec>,
    pub preview: Option<PreviewScene>,
    pub data_pointer_events: Option<bool>,

    pub clears: usize,
    pub zones_added: usize,
    pub points_added: usize,
    pub redraws: usize,
    pub restyles: usize,
    pub handles_added: usize,
    pub handles_removed: usize,
    pub preview_draws: usize,
    pub preview_clears: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Layer drawn for `meta`, if any.
    pub fn layer_for(&self, meta: LayerMeta) -> Option<(LayerId, &DrawnLayer)> {
        self.layers.iter().find(|(_, l)| l.meta == meta).map(|(id, l)| (*id, l))
    }

    pub fn handles_of(&self, kind: HandleKind) -> Vec<(HandleId, LngLat)> {
        self.handles.iter().filter(|(_, h)| h.kind == kind).map(|(id, h)| (*id, h.position)).collect()
    }

    /// Total number of layer-producing calls (rebuild side effects).
    pub fn draw_calls(&self) -> usize {
        self.clears + self.zones_added + self.points_added
    }
}

impl RenderSurface for RecordingSurface {
    fn clear(&mut self) {
        self.clears += 1;
        self.layers.clear();
    }

    fn add_zone(&mut self, meta: LayerMeta, shape: &Shape, style: &ZoneStyle) -> LayerId {
        self.zones_added += 1;
        let id = LayerId(self.issue());
        self.layers.insert(
            id,
            DrawnLayer { meta, shape: shape.clone(), zone_style: Some(style.clone()), marker_style: None, restyled: None },
        );
        id
    }

    fn add_point(&mut self, meta: LayerMeta, shape: &Shape, style: &MarkerStyle) -> LayerId {
        self.points_added += 1;
        let id = LayerId(self.issue());
        self.layers.insert(
            id,
            DrawnLayer { meta, shape: shape.clone(), zone_style: None, marker_style: Some(style.clone()), restyled: None },
        );
        id
    }

    fn redraw(&mut self, layer: LayerId, shape: &Shape) {
        self.redraws += 1;
        if let Some(drawn) = self.layers.get_mut(&layer) {
            drawn.shape = shape.clone();
        }
    }

    fn restyle(&mut self, layer: LayerId, style: &ObjectStyle) {
        self.restyles += 1;
        if let Some(drawn) = self.layers.get_mut(&layer) {
            drawn.restyled = Some(style.clone());
        }
    }

    fn add_handle(&mut self, spec: &HandleSpec) -> HandleId {
        self.handles_added += 1;
        let id = HandleId(self.issue());
        self.handles.insert(id, spec.clone());
        id
    }

    fn move_handle(&mut self, handle: HandleId, position: LngLat) {
        if let Some(spec) = self.handles.get_mut(&handle) {
            spec.position = position;
        }
    }

    fn remove_handle(&mut self, handle: HandleId) {
        self.handles_removed += 1;
        self.handles.remove(&handle);
    }

    fn set_data_pointer_events(&mut self, enabled: bool) {
        self.data_pointer_events = Some(enabled);
    }

    fn draw_preview(&mut self, scene: &PreviewScene) {
        self.preview_draws += 1;
        self.preview = Some(scene.clone());
    }

    fn clear_preview(&mut self) {
        self.preview_clears += 1;
        self.preview = None;
    }
}

/// Geometry store that records every update and fails the zones listed in
/// `failing`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub calls: RefCell<Vec<(ZoneId, Geometry)>>,
    pub failing: Vec<ZoneId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(ids: &[ZoneId]) -> Self {
        Self { calls: RefCell::new(Vec::new()), failing: ids.to_vec() }
    }

    pub fn calls(&self) -> Vec<(ZoneId, Geometry)> {
        self.calls.borrow().clone()
    }
}

impl GeometryStore for MemoryStore {
    fn update_zone_geometry(&self, id: ZoneId, geometry: Geometry) -> LocalBoxFuture<'_, Result<(), StoreError>> {
        self.calls.borrow_mut().push((id, geometry));
        let fail = self.failing.contains(&id);
        async move {
            if fail {
                Err(StoreError::Rejected { status: 500, message: format!("zone {id} refused") })
            } else {
                Ok(())
            }
        }
        .boxed_local()
    }
}

// =============================================================
// Fixtures
// =============================================================

/// Axis-aligned square with its south-west corner at `(x, y)`.
pub fn square(x: f64, y: f64, size: f64) -> serde_json::Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[x, y], [x, y + size], [x + size, y + size], [x + size, y], [x, y]]],
    })
}

pub fn zone(id: ZoneId, geometry: serde_json::Value) -> Zone {
    Zone { id, name: format!("zone {id}"), geometry: Some(geometry), area_m2: None }
}

pub fn point_object(id: ObjectId, lng: f64, lat: f64) -> PlanObject {
    PlanObject {
        id,
        name: Some(format!("object {id}")),
        geometry: Some(json!({ "type": "Point", "coordinates": [lng, lat] })),
        area_m2: None,
        attributes: serde_json::Map::new(),
    }
}

pub fn ll(lng: f64, lat: f64) -> LngLat {
    LngLat::new(lng, lat)
}
