//! Edit-session controller: which shapes carry edit handles, their pre-edit
//! snapshots, and the save/cancel transitions.
//!
//! ```text
//! Off --enter(target)--> On(target | all) --save ok--> Off
//!                              |  ^ save failed (stays On)
//!                              +--cancel-------------------> Off
//! ```
//!
//! Snapshots are keyed by [`LayerMeta`], never by layer id, so they survive a
//! full rebuild of the surface. Overlays do not: they are torn down with the
//! layers and re-attached once the rebuilt shapes carry their live rings again.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::BTreeMap;

use futures::future::{LocalBoxFuture, join_all};

use crate::error::{SaveError, StoreError, ZoneFailure};
use crate::geo::{Geometry, LngLat, Ring, Zone, ZoneId};
use crate::overlay::EditOverlay;
use crate::shape::{ring_of, set_ring, shape_to_geometry, translate_ring};
use crate::surface::{HandleId, LayerId, LayerKind, LayerMeta, RenderSurface};
use crate::sync::DataSync;

/// Persistence callback for zone geometry, injected by the host.
pub trait GeometryStore {
    /// Replace the stored geometry of zone `id`.
    fn update_zone_geometry(&self, id: ZoneId, geometry: Geometry) -> LocalBoxFuture<'_, Result<(), StoreError>>;
}

/// Reference to the entity an edit (or fly-to) is aimed at.
pub type EditTarget = LayerMeta;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Off,
    /// Editing one zone, or every rendered zone when `None`.
    On(Option<EditTarget>),
}

/// Geometry updates a save sends, one per rendered zone.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePlan {
    pub updates: Vec<(ZoneId, Geometry)>,
}

/// Outcome of a fully successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub saved: Vec<ZoneId>,
}

#[derive(Debug)]
struct EditableShape {
    overlay: Option<EditOverlay>,
    /// Outer ring as it was before the first edit.
    original: Ring,
}

/// Whole-shape drag in progress.
#[derive(Debug, Clone)]
struct ShapeDrag {
    meta: LayerMeta,
    start: LngLat,
    start_ring: Ring,
}

#[derive(Debug)]
pub struct EditSession {
    mode: EditMode,
    saving: bool,
    shapes: BTreeMap<LayerMeta, EditableShape>,
    drag: Option<ShapeDrag>,
    handle_size: (u32, u32),
}

impl EditSession {
    #[must_use]
    pub fn new(handle_size: (u32, u32)) -> Self {
        Self { mode: EditMode::Off, saving: false, shapes: BTreeMap::new(), drag: None, handle_size }
    }

    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        matches!(self.mode, EditMode::On(_))
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    #[must_use]
    pub fn target(&self) -> Option<EditTarget> {
        match self.mode {
            EditMode::On(target) => target,
            EditMode::Off => None,
        }
    }

    /// Whether any shape currently shows edit handles.
    #[must_use]
    pub fn has_overlays(&self) -> bool {
        self.shapes.values().any(|s| s.overlay.is_some())
    }

    /// Shapes with a pre-edit snapshot, in key order.
    #[must_use]
    pub fn edited(&self) -> Vec<LayerMeta> {
        self.shapes.keys().copied().collect()
    }

    /// Pre-edit outer ring of `meta`, if it has been edited.
    #[must_use]
    pub fn original_ring(&self, meta: LayerMeta) -> Option<&[LngLat]> {
        self.shapes.get(&meta).map(|s| s.original.as_slice())
    }

    // --- Transitions ---

    /// Enter edit mode for `target`, or for every rendered zone when `None`.
    /// Object targets and zones without a rendered outline are ignored.
    /// Returns whether the request was applied.
    ///
    /// Re-targeting an open session moves the handles; snapshots of shapes
    /// edited earlier are kept so cancel still restores them.
    pub fn enter(&mut self, target: Option<EditTarget>, sync: &DataSync, surface: &mut dyn RenderSurface) -> bool {
        if self.saving {
            return false;
        }
        if target.is_some_and(|t| t.kind != LayerKind::Zone) {
            log::debug!("ignoring edit request for a non-zone target");
            return false;
        }
        if let Some(t) = target
            && !sync.find(t).is_some_and(|layer| layer.shape.is_path())
        {
            log::debug!("ignoring edit request for zone {}: no outline on the map", t.id);
            return false;
        }
        self.end_drag();
        self.detach_overlays(surface);
        self.mode = EditMode::On(target);
        let metas: Vec<LayerMeta> = match target {
            Some(meta) => vec![meta],
            None => sync.layers().iter().filter(|l| l.meta.kind == LayerKind::Zone).map(|l| l.meta).collect(),
        };
        self.attach(&metas, sync, surface);
        log::debug!("edit session on: {} shape(s)", metas.len());
        true
    }

    /// Restore every edited shape to its snapshot and close the session.
    /// The caller invalidates the render cache. Returns `false` when there was
    /// nothing to cancel or a save is in flight.
    pub fn cancel(&mut self, sync: &mut DataSync, surface: &mut dyn RenderSurface) -> bool {
        if !self.is_editing() || self.saving {
            return false;
        }
        self.end_drag();
        for (meta, shape) in std::mem::take(&mut self.shapes) {
            if let Some(overlay) = shape.overlay {
                overlay.teardown(surface);
            }
            sync.restore_ring(meta, shape.original, surface);
        }
        self.mode = EditMode::Off;
        log::debug!("edit session cancelled");
        true
    }

    /// Close the session because its target left the dataset. Handles and
    /// snapshots are discarded without touching geometry.
    pub fn force_off(&mut self, surface: &mut dyn RenderSurface) {
        self.end_drag();
        self.close(surface);
        self.saving = false;
        log::debug!("edit target disappeared, edit session off");
    }

    /// Whether the session targets a zone that is no longer in `zones`.
    #[must_use]
    pub fn target_missing(&self, zones: &[Zone]) -> bool {
        self.target().is_some_and(|t| !zones.iter().any(|z| z.id == t.id))
    }

    // --- Rebuild support ---

    /// Current rings of every edited shape, read before the surface is cleared.
    #[must_use]
    pub fn capture_live_rings(&self, sync: &DataSync) -> Vec<(LayerMeta, Ring)> {
        self.shapes
            .keys()
            .filter_map(|&meta| sync.find(meta).map(|layer| (meta, ring_of(&layer.shape).to_vec())))
            .collect()
    }

    /// Tear down every overlay and return the shapes that had one.
    pub fn detach_overlays(&mut self, surface: &mut dyn RenderSurface) -> Vec<LayerMeta> {
        let mut detached = Vec::new();
        for (meta, shape) in &mut self.shapes {
            if let Some(overlay) = shape.overlay.take() {
                overlay.teardown(surface);
                detached.push(*meta);
            }
        }
        detached
    }

    /// Build overlays for `metas` on the currently rendered layers, snapshotting
    /// shapes that are edited for the first time.
    pub fn attach(&mut self, metas: &[LayerMeta], sync: &DataSync, surface: &mut dyn RenderSurface) {
        for &meta in metas {
            let Some(layer) = sync.find(meta) else {
                continue;
            };
            if !layer.shape.is_path() {
                continue;
            }
            let overlay = EditOverlay::build(layer.id, &layer.shape, self.handle_size, surface);
            let entry = self
                .shapes
                .entry(meta)
                .or_insert_with(|| EditableShape { overlay: None, original: ring_of(&layer.shape).to_vec() });
            entry.overlay = overlay;
        }
    }

    /// Drop any whole-shape drag and return the shape it was moving. Its
    /// handles stay detached until the caller re-attaches them.
    pub fn end_drag(&mut self) -> Option<LayerMeta> {
        self.drag.take().map(|drag| drag.meta)
    }

    // --- Handle events ---

    fn overlay_for(&mut self, handle: HandleId) -> Option<&mut EditOverlay> {
        if self.saving {
            return None;
        }
        self.shapes.values_mut().filter_map(|s| s.overlay.as_mut()).find(|o| o.owns(handle))
    }

    pub fn on_handle_drag_start(&mut self, handle: HandleId, sync: &mut DataSync, surface: &mut dyn RenderSurface) -> bool {
        let Some(overlay) = self.overlay_for(handle) else {
            return false;
        };
        let Some(layer) = sync.layer_mut(overlay.layer()) else {
            return false;
        };
        overlay.on_drag_start(handle, &mut layer.shape, surface)
    }

    pub fn on_handle_drag(
        &mut self,
        handle: HandleId,
        position: LngLat,
        sync: &mut DataSync,
        surface: &mut dyn RenderSurface,
    ) -> bool {
        let Some(overlay) = self.overlay_for(handle) else {
            return false;
        };
        let Some(layer) = sync.layer_mut(overlay.layer()) else {
            return false;
        };
        overlay.on_drag(handle, position, &mut layer.shape, surface)
    }

    pub fn on_handle_drag_end(&mut self, handle: HandleId, sync: &DataSync, surface: &mut dyn RenderSurface) -> bool {
        let Some(overlay) = self.overlay_for(handle) else {
            return false;
        };
        let Some(layer) = sync.layer(overlay.layer()) else {
            return false;
        };
        overlay.on_drag_end(handle, &layer.shape, surface)
    }

    pub fn on_handle_click(&mut self, handle: HandleId, sync: &mut DataSync, surface: &mut dyn RenderSurface) -> bool {
        let Some(overlay) = self.overlay_for(handle) else {
            return false;
        };
        let Some(layer) = sync.layer_mut(overlay.layer()) else {
            return false;
        };
        overlay.on_click(handle, &mut layer.shape, surface)
    }

    // --- Whole-shape drag ---

    /// Start dragging the edited shape on `layer`. Its handles are hidden
    /// until the drag ends.
    pub fn begin_shape_drag(
        &mut self,
        layer: LayerId,
        at: LngLat,
        sync: &DataSync,
        surface: &mut dyn RenderSurface,
    ) -> bool {
        if self.saving || self.drag.is_some() {
            return false;
        }
        let Some(rendered) = sync.layer(layer) else {
            return false;
        };
        let Some(shape) = self.shapes.get_mut(&rendered.meta) else {
            return false;
        };
        let Some(overlay) = shape.overlay.take() else {
            return false;
        };
        overlay.teardown(surface);
        self.drag = Some(ShapeDrag { meta: rendered.meta, start: at, start_ring: ring_of(&rendered.shape).to_vec() });
        true
    }

    #[must_use]
    pub fn is_dragging_shape(&self) -> bool {
        self.drag.is_some()
    }

    /// Translate the dragged shape so the grab point follows the pointer.
    /// Pointer moves are ignored while a save is in flight.
    pub fn drag_shape_to(&mut self, at: LngLat, sync: &mut DataSync, surface: &mut dyn RenderSurface) -> bool {
        let Some(drag) = self.drag.as_ref().filter(|_| !self.saving) else {
            return false;
        };
        let Some(layer) = sync.find_mut(drag.meta) else {
            return false;
        };
        set_ring(&mut layer.shape, translate_ring(&drag.start_ring, drag.start, at));
        surface.redraw(layer.id, &layer.shape);
        true
    }

    /// Finish the shape drag and rebuild its handles at the new position.
    pub fn end_shape_drag(&mut self, sync: &DataSync, surface: &mut dyn RenderSurface) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        self.attach(&[drag.meta], sync, surface);
        true
    }

    // --- Save ---

    /// Mark the session as saving and collect one update per rendered zone.
    ///
    /// # Errors
    ///
    /// [`SaveError::NotEditing`] when the session is off,
    /// [`SaveError::InProgress`] while a previous save is unfinished.
    pub fn begin_save(&mut self, sync: &DataSync) -> Result<SavePlan, SaveError> {
        if !self.is_editing() {
            return Err(SaveError::NotEditing);
        }
        if self.saving {
            return Err(SaveError::InProgress);
        }
        let updates: Vec<(ZoneId, Geometry)> = sync
            .layers()
            .iter()
            .filter(|l| l.meta.kind == LayerKind::Zone)
            .filter_map(|l| shape_to_geometry(&l.shape).map(|g| (l.meta.id, g)))
            .collect();
        self.saving = true;
        log::debug!("saving {} zone geometries", updates.len());
        Ok(SavePlan { updates })
    }

    /// Apply the store's answers to a plan from [`Self::begin_save`]. Results
    /// pair with the plan's updates by position; a missing result counts as a
    /// failed update.
    ///
    /// # Errors
    ///
    /// [`SaveError::Failed`] when any update failed. The session stays open
    /// with its handles and snapshots so the user can retry or cancel.
    pub fn finish_save(
        &mut self,
        plan: SavePlan,
        results: Vec<Result<(), StoreError>>,
        surface: &mut dyn RenderSurface,
    ) -> Result<SaveReport, SaveError> {
        self.saving = false;
        let mut results = results.into_iter();
        let mut failed = Vec::new();
        let mut succeeded = Vec::new();
        for (id, _) in plan.updates {
            match results.next() {
                Some(Ok(())) => succeeded.push(id),
                Some(Err(error)) => {
                    log::warn!("zone {id} geometry update failed: {error}");
                    failed.push(ZoneFailure { id, error });
                }
                None => {
                    let error = StoreError::Transport("no result for update".to_owned());
                    log::warn!("zone {id} geometry update failed: {error}");
                    failed.push(ZoneFailure { id, error });
                }
            }
        }
        if !failed.is_empty() {
            return Err(SaveError::Failed { failed, succeeded });
        }
        self.close(surface);
        log::debug!("edit session saved: {} zone(s)", succeeded.len());
        Ok(SaveReport { saved: succeeded })
    }

    fn close(&mut self, surface: &mut dyn RenderSurface) {
        for shape in std::mem::take(&mut self.shapes).into_values() {
            if let Some(overlay) = shape.overlay {
                overlay.teardown(surface);
            }
        }
        self.mode = EditMode::Off;
    }
}

/// Issue every update of `plan` concurrently and wait for all of them.
pub async fn send_updates<G>(store: &G, plan: &SavePlan) -> Vec<Result<(), StoreError>>
where
    G: GeometryStore + ?Sized,
{
    join_all(plan.updates.iter().map(|(id, geometry)| store.update_zone_geometry(*id, geometry.clone()))).await
}
