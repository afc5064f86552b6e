//! Edit handles for one shape: draggable vertices and insert-at-midpoint handles.
//!
//! The overlay keeps its own list of vertex positions; that list is the source
//! of truth for the shape's outer ring while an edit is in progress. Every
//! mutation writes the list back with [`set_ring`] and asks the surface to
//! redraw the shape.
//!
//! Edges are taken as closed (`i -> i+1 mod n`) even for open polylines, so a
//! midpoint handle always sits between the last and the first vertex too.
//!
//! Plain vertex drags do not move the midpoint handles. Midpoints are only
//! regenerated when a midpoint drag ends or a midpoint is clicked (which
//! rebuilds the whole overlay); until then they may sit at stale positions.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use crate::consts::{EDIT_MARKERS_PANE, EDIT_PANE_Z_INDEX};
use crate::geo::LngLat;
use crate::shape::{Shape, ring_of, set_ring};
use crate::surface::{HandleId, HandleKind, HandleSpec, LayerId, RenderSurface};

#[derive(Debug, Clone, Copy)]
struct VertexHandle {
    handle: HandleId,
    position: LngLat,
}

#[derive(Debug, Clone, Copy)]
struct MidpointHandle {
    handle: HandleId,
    position: LngLat,
    /// Ring index the new vertex is inserted at (`edge start + 1`).
    insert_index: usize,
}

/// Live handle set for one edited shape.
#[derive(Debug)]
pub struct EditOverlay {
    layer: LayerId,
    handle_size: (u32, u32),
    vertices: Vec<VertexHandle>,
    midpoints: Vec<MidpointHandle>,
    /// Midpoint handle being dragged and the vertex index it materialized.
    pulled: Option<(HandleId, usize)>,
}

impl EditOverlay {
    /// Create handles for `shape`'s outer ring. Returns `None` when the shape
    /// has no ring to edit.
    pub fn build(layer: LayerId, shape: &Shape, handle_size: (u32, u32), surface: &mut dyn RenderSurface) -> Option<Self> {
        let ring = ring_of(shape);
        if ring.is_empty() {
            return None;
        }
        let mut overlay = Self { layer, handle_size, vertices: Vec::new(), midpoints: Vec::new(), pulled: None };
        for &position in ring {
            let handle = surface.add_handle(&overlay.spec(HandleKind::Vertex, position));
            overlay.vertices.push(VertexHandle { handle, position });
        }
        overlay.refresh_midpoints(shape, surface);
        Some(overlay)
    }

    /// Remove every handle from the surface.
    pub fn teardown(self, surface: &mut dyn RenderSurface) {
        for v in &self.vertices {
            surface.remove_handle(v.handle);
        }
        for m in &self.midpoints {
            surface.remove_handle(m.handle);
        }
    }

    /// Layer this overlay edits.
    #[must_use]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    #[must_use]
    pub fn owns(&self, handle: HandleId) -> bool {
        self.vertex_index(handle).is_some() || self.midpoint_index(handle).is_some()
    }

    #[must_use]
    pub fn vertex_handles(&self) -> Vec<HandleId> {
        self.vertices.iter().map(|v| v.handle).collect()
    }

    #[must_use]
    pub fn midpoint_handles(&self) -> Vec<HandleId> {
        self.midpoints.iter().map(|m| m.handle).collect()
    }

    /// Current position of each midpoint handle, in edge order.
    #[must_use]
    pub fn midpoint_positions(&self) -> Vec<LngLat> {
        self.midpoints.iter().map(|m| m.position).collect()
    }

    // --- Handle events ---

    /// A drag began on `handle`. Midpoint handles pull out a new vertex at their
    /// position, which then follows the drag.
    pub fn on_drag_start(&mut self, handle: HandleId, shape: &mut Shape, surface: &mut dyn RenderSurface) -> bool {
        if self.vertex_index(handle).is_some() {
            return true;
        }
        let Some(mi) = self.midpoint_index(handle) else {
            return false;
        };
        let mid = self.midpoints[mi];
        let index = mid.insert_index.min(self.vertices.len());
        let vertex = surface.add_handle(&self.spec(HandleKind::Vertex, mid.position));
        self.vertices.insert(index, VertexHandle { handle: vertex, position: mid.position });
        self.pulled = Some((handle, index));
        self.write_ring(shape, surface);
        true
    }

    /// `handle` moved to `position` during a drag.
    pub fn on_drag(&mut self, handle: HandleId, position: LngLat, shape: &mut Shape, surface: &mut dyn RenderSurface) -> bool {
        if let Some(vi) = self.vertex_index(handle) {
            self.vertices[vi].position = position;
            self.write_ring(shape, surface);
            return true;
        }
        let Some(mi) = self.midpoint_index(handle) else {
            return false;
        };
        self.midpoints[mi].position = position;
        if let Some((pulling, index)) = self.pulled {
            if pulling == handle {
                if let Some(v) = self.vertices.get_mut(index) {
                    v.position = position;
                    surface.move_handle(v.handle, position);
                }
                self.write_ring(shape, surface);
            }
        }
        true
    }

    /// A drag on `handle` finished. Ending a midpoint drag regenerates every
    /// midpoint from the new edge list.
    pub fn on_drag_end(&mut self, handle: HandleId, shape: &Shape, surface: &mut dyn RenderSurface) -> bool {
        if self.vertex_index(handle).is_some() {
            return true;
        }
        if self.midpoint_index(handle).is_none() {
            return false;
        }
        self.pulled = None;
        self.refresh_midpoints(shape, surface);
        true
    }

    /// A click on a midpoint inserts a vertex there and rebuilds the overlay.
    pub fn on_click(&mut self, handle: HandleId, shape: &mut Shape, surface: &mut dyn RenderSurface) -> bool {
        let Some(mi) = self.midpoint_index(handle) else {
            return self.vertex_index(handle).is_some();
        };
        let mid = self.midpoints[mi];
        let mut ring = ring_of(shape).to_vec();
        let index = mid.insert_index.min(ring.len());
        ring.insert(index, mid.position);
        set_ring(shape, ring);
        surface.redraw(self.layer, shape);
        self.regenerate(shape, surface);
        true
    }

    /// Drop every handle and rebuild from the shape's current ring.
    pub fn regenerate(&mut self, shape: &Shape, surface: &mut dyn RenderSurface) {
        let (layer, handle_size) = (self.layer, self.handle_size);
        let old = std::mem::replace(
            self,
            Self { layer, handle_size, vertices: Vec::new(), midpoints: Vec::new(), pulled: None },
        );
        old.teardown(surface);
        if let Some(rebuilt) = Self::build(layer, shape, handle_size, surface) {
            *self = rebuilt;
        }
    }

    // --- Internals ---

    fn spec(&self, kind: HandleKind, position: LngLat) -> HandleSpec {
        HandleSpec { kind, position, size: self.handle_size, pane: EDIT_MARKERS_PANE, pane_z_index: EDIT_PANE_Z_INDEX }
    }

    fn vertex_index(&self, handle: HandleId) -> Option<usize> {
        self.vertices.iter().position(|v| v.handle == handle)
    }

    fn midpoint_index(&self, handle: HandleId) -> Option<usize> {
        self.midpoints.iter().position(|m| m.handle == handle)
    }

    /// Push the vertex list into the shape and redraw it.
    fn write_ring(&self, shape: &mut Shape, surface: &mut dyn RenderSurface) {
        set_ring(shape, self.vertices.iter().map(|v| v.position).collect());
        surface.redraw(self.layer, shape);
    }

    fn refresh_midpoints(&mut self, shape: &Shape, surface: &mut dyn RenderSurface) {
        for m in self.midpoints.drain(..) {
            surface.remove_handle(m.handle);
        }
        let ring = ring_of(shape);
        let n = ring.len();
        for i in 0..n {
            let position = ring[i].midpoint(ring[(i + 1) % n]);
            let handle = surface.add_handle(&self.spec(HandleKind::Midpoint, position));
            self.midpoints.push(MidpointHandle { handle, position, insert_index: i + 1 });
        }
    }
}
