use crate::config::EngineConfig;
use crate::error::{SaveError, StoreError};
use crate::flyto::{FlyToPlan, resolve_fly_to};
use crate::geo::{Geometry, LngLat, ObjectId, PlanObject, Zone, ZoneId};
use crate::hit::zone_containing;
use crate::intent::Intake;
use crate::placement::{PlacementDraft, PlacementMode};
use crate::preview::PlacementPreview;
use crate::session::{EditSession, EditTarget, GeometryStore, SavePlan, SaveReport, send_updates};
use crate::shape::shape_to_geometry;
use crate::surface::{Cursor, HandleId, LayerId, LayerKind, RenderSurface};
use crate::sync::{DataSync, Dataset, Signature, SyncInput, SyncOutcome, SyncState};
use crate::theme::{Palette, ThemeResolver};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from engine calls for the host to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A zone was clicked, or contains a clicked object.
    SetActiveZone(ZoneId),
    SelectObject(ObjectId),
    /// Edit mode turned on or off; the host toggles its edit styling.
    EditModeChanged(bool),
    /// The placement draft was created, changed, or discarded.
    PlacementChanged,
    /// A completed placement, ready to be created as a new zone.
    PlacementCommitted(Geometry),
    SetCursor(Cursor),
    /// Enable or disable panning of the map widget.
    SetMapDragging(bool),
}

/// Core engine state: everything that does not depend on the browser.
///
/// Setters only record the host's latest state. [`Self::refresh`] is the one
/// reconciliation pass that brings the surface in line with it, so a host
/// calls it after each batch of setter calls.
pub struct EngineCore<S, T> {
    surface: S,
    theme: T,
    config: EngineConfig,

    zones: Vec<Zone>,
    objects: Vec<PlanObject>,
    active_zone: Option<ZoneId>,
    selected_object: Option<ObjectId>,
    objects_in_zone: Vec<ObjectId>,
    objects_visible: bool,
    zoom: f64,
    edit_intent: bool,

    sync: DataSync,
    session: EditSession,
    preview: Option<PlacementPreview>,
    edit_requests: Intake<EditTarget>,
    fly_requests: Intake<EditTarget>,
    cursor: Cursor,
}

impl<S: RenderSurface, T: ThemeResolver> EngineCore<S, T> {
    #[must_use]
    pub fn new(surface: S, theme: T, config: EngineConfig) -> Self {
        let [w, h] = config.style.edit_handle_size;
        Self {
            surface,
            theme,
            zones: Vec::new(),
            objects: Vec::new(),
            active_zone: None,
            selected_object: None,
            objects_in_zone: Vec::new(),
            objects_visible: true,
            zoom: 0.0,
            edit_intent: false,
            sync: DataSync::new(),
            session: EditSession::new((w, h)),
            preview: None,
            edit_requests: Intake::new(),
            fly_requests: Intake::new(),
            cursor: Cursor::Default,
            config,
        }
    }

    // --- Data inputs ---

    pub fn set_zones(&mut self, zones: Vec<Zone>) {
        self.zones = zones;
    }

    pub fn set_objects(&mut self, objects: Vec<PlanObject>) {
        self.objects = objects;
    }

    pub fn set_active_zone(&mut self, id: Option<ZoneId>) {
        self.active_zone = id;
    }

    pub fn set_selected_object(&mut self, id: Option<ObjectId>) {
        self.selected_object = id;
    }

    /// Objects the backend lists as members of the active zone.
    pub fn set_objects_in_zone(&mut self, ids: Vec<ObjectId>) {
        self.objects_in_zone = ids;
    }

    pub fn set_objects_visible(&mut self, visible: bool) {
        self.objects_visible = visible;
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    /// While set, the next zone click opens that zone for editing.
    pub fn set_edit_intent(&mut self, intent: bool) {
        self.edit_intent = intent;
    }

    // --- Reconciliation ---

    /// Bring the surface in line with the current inputs.
    ///
    /// Runs, in order: the deleted-target guard, the signature check (skip, or
    /// rebuild preserving every in-progress ring and re-attaching handles), the
    /// selection restyle, and the pending geometry-edit request.
    pub fn refresh(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.session.is_editing() && self.session.target_missing(&self.zones) {
            let dragging = self.session.is_dragging_shape();
            self.session.force_off(&mut self.surface);
            self.sync.invalidate();
            if dragging {
                actions.push(Action::SetMapDragging(true));
                self.set_cursor(Cursor::Default, &mut actions);
            }
            actions.push(Action::EditModeChanged(false));
        }

        let palette = Palette::resolve(&self.theme, &self.config.style);
        let input = SyncInput {
            zones: &self.zones,
            objects: &self.objects,
            active_zone: self.active_zone,
            selected_object: self.selected_object,
            objects_in_zone: &self.objects_in_zone,
            objects_visible: self.objects_visible,
            zoom: self.zoom,
        };
        let dataset = Dataset::prepare(&input);
        let signature = Signature::compute(&dataset, &input, &palette);

        let mut drag_ended = false;
        let outcome = if self.sync.is_current(&signature) {
            SyncOutcome::Skipped
        } else {
            let live = self.session.capture_live_rings(&self.sync);
            let mut attached = self.session.detach_overlays(&mut self.surface);
            if let Some(dragged) = self.session.end_drag() {
                attached.push(dragged);
                drag_ended = true;
                actions.push(Action::SetMapDragging(true));
            }
            let outcome =
                self.sync.rebuild(dataset, &input, signature, &palette, &self.config.style, &mut self.surface);
            for (meta, ring) in live {
                self.sync.restore_ring(meta, ring, &mut self.surface);
            }
            self.session.attach(&attached, &self.sync, &mut self.surface);
            outcome
        };
        if outcome == SyncOutcome::Skipped {
            log::trace!("sync pass skipped: signature unchanged");
        }

        self.sync.restyle_objects(&input, &palette, &self.config.style, &mut self.surface);
        if drag_ended {
            self.set_cursor(Cursor::Default, &mut actions);
        }

        if let Some(target) = self.edit_requests.consume() {
            self.open_session(Some(target), &mut actions);
        }
        actions
    }

    #[must_use]
    pub fn sync_state(&self) -> SyncState {
        if self.session.has_overlays() { SyncState::EditingOverlay } else { self.sync.state() }
    }

    // --- Layer events ---

    /// A data layer was clicked.
    ///
    /// Zones become active (and open for editing while the edit intent is
    /// set). Objects become selected, and the zone containing them, if any,
    /// becomes active.
    pub fn on_layer_click(&mut self, layer: LayerId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.preview.is_some() {
            return actions;
        }
        let Some(rendered) = self.sync.layer(layer) else {
            return actions;
        };
        let meta = rendered.meta;
        match meta.kind {
            LayerKind::Zone => {
                self.active_zone = Some(meta.id);
                actions.push(Action::SetActiveZone(meta.id));
                if self.edit_intent {
                    self.edit_intent = false;
                    self.edit_requests.request(meta);
                }
            }
            LayerKind::Object => {
                let point = shape_to_geometry(&rendered.shape).and_then(|g| g.representative_point());
                if let Some(zone) = point.and_then(|p| zone_containing(p, self.sync.zone_geometries())) {
                    self.active_zone = Some(zone);
                    actions.push(Action::SetActiveZone(zone));
                }
                self.selected_object = Some(meta.id);
                actions.push(Action::SelectObject(meta.id));
            }
        }
        actions
    }

    // --- Handle events ---

    pub fn on_handle_click(&mut self, handle: HandleId) -> bool {
        self.session.on_handle_click(handle, &mut self.sync, &mut self.surface)
    }

    pub fn on_handle_drag_start(&mut self, handle: HandleId) -> bool {
        self.session.on_handle_drag_start(handle, &mut self.sync, &mut self.surface)
    }

    pub fn on_handle_drag(&mut self, handle: HandleId, position: LngLat) -> bool {
        self.session.on_handle_drag(handle, position, &mut self.sync, &mut self.surface)
    }

    pub fn on_handle_drag_end(&mut self, handle: HandleId) -> bool {
        self.session.on_handle_drag_end(handle, &self.sync, &mut self.surface)
    }

    // --- Pointer events ---

    /// A button went down on the map, over `layer` if it hit a data layer.
    pub fn on_pointer_down(&mut self, at: LngLat, layer: Option<LayerId>) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(preview) = &self.preview {
            let cursor = preview.pressed_cursor();
            self.set_cursor(cursor, &mut actions);
            return actions;
        }
        let Some(layer) = layer else {
            return actions;
        };
        if self.session.begin_shape_drag(layer, at, &self.sync, &mut self.surface) {
            actions.push(Action::SetMapDragging(false));
            self.set_cursor(Cursor::Grabbing, &mut actions);
        }
        actions
    }

    pub fn on_pointer_move(&mut self, at: LngLat) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(preview) = &mut self.preview {
            let before = preview.draft().clone();
            if preview.on_pointer_move(at) {
                preview.draw(&Palette::resolve(&self.theme, &self.config.style), &self.config.style, &mut self.surface);
            }
            if *preview.draft() != before {
                actions.push(Action::PlacementChanged);
            }
            return actions;
        }
        self.session.drag_shape_to(at, &mut self.sync, &mut self.surface);
        actions
    }

    pub fn on_pointer_up(&mut self, _at: LngLat) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(preview) = &self.preview {
            let cursor = preview.cursor();
            self.set_cursor(cursor, &mut actions);
            return actions;
        }
        if self.session.end_shape_drag(&self.sync, &mut self.surface) {
            actions.push(Action::SetMapDragging(true));
            self.set_cursor(Cursor::Default, &mut actions);
        }
        actions
    }

    /// A click on the map background (data layers are click-through while
    /// placing).
    pub fn on_map_click(&mut self, at: LngLat) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(preview) = &mut self.preview else {
            return actions;
        };
        if preview.on_click(at) {
            preview.draw(&Palette::resolve(&self.theme, &self.config.style), &self.config.style, &mut self.surface);
            actions.push(Action::PlacementChanged);
        }
        let cursor = preview.cursor();
        self.set_cursor(cursor, &mut actions);
        actions
    }

    // --- Edit session ---

    /// Queue an edit of `target`; the next [`Self::refresh`] opens it.
    pub fn request_geometry_edit(&mut self, target: EditTarget) {
        self.edit_requests.request(target);
    }

    /// Put edit handles on every rendered zone.
    pub fn open_edit_mode(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.open_session(None, &mut actions);
        actions
    }

    fn open_session(&mut self, target: Option<EditTarget>, actions: &mut Vec<Action>) {
        if self.preview.is_some() {
            actions.extend(self.cancel_placement());
        }
        let was_editing = self.session.is_editing();
        if self.session.enter(target, &self.sync, &mut self.surface) && !was_editing {
            actions.push(Action::EditModeChanged(true));
        }
    }

    /// Discard every edit since the session opened.
    pub fn cancel_edit(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let dragging = self.session.is_dragging_shape();
        if self.session.cancel(&mut self.sync, &mut self.surface) {
            self.sync.invalidate();
            if dragging {
                actions.push(Action::SetMapDragging(true));
                self.set_cursor(Cursor::Default, &mut actions);
            }
            actions.push(Action::EditModeChanged(false));
        }
        actions
    }

    /// First half of a save: collect the updates and mark the session saving.
    /// Handle events are ignored until [`Self::finish_save`].
    ///
    /// # Errors
    ///
    /// See [`EditSession::begin_save`].
    pub fn begin_save(&mut self) -> Result<SavePlan, SaveError> {
        self.session.begin_save(&self.sync)
    }

    /// Second half of a save. On success the session is closed.
    ///
    /// # Errors
    ///
    /// See [`EditSession::finish_save`].
    pub fn finish_save(
        &mut self,
        plan: SavePlan,
        results: Vec<Result<(), StoreError>>,
    ) -> Result<SaveReport, SaveError> {
        self.session.finish_save(plan, results, &mut self.surface)
    }

    /// Send every zone's geometry to `store` concurrently and close the
    /// session once all updates succeeded.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::begin_save`] and [`Self::finish_save`].
    pub async fn save<G>(&mut self, store: &G) -> Result<SaveReport, SaveError>
    where
        G: GeometryStore + ?Sized,
    {
        let plan = self.begin_save()?;
        let results = send_updates(store, &plan).await;
        self.finish_save(plan, results)
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.session.is_editing()
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.session.is_saving()
    }

    #[must_use]
    pub fn edit_target(&self) -> Option<EditTarget> {
        self.session.target()
    }

    // --- Placement ---

    /// Start placing a new zone. An open edit session is cancelled first.
    pub fn start_placement(&mut self, mode: PlacementMode) -> Vec<Action> {
        let mut actions = self.cancel_edit();
        let preview = PlacementPreview::new(mode, &self.config.placement);
        preview.draw(&Palette::resolve(&self.theme, &self.config.style), &self.config.style, &mut self.surface);
        let cursor = preview.cursor();
        self.preview = Some(preview);
        self.sync.set_pointer_suppressed(true, &mut self.surface);
        actions.push(Action::PlacementChanged);
        self.set_cursor(cursor, &mut actions);
        log::debug!("placement started: {mode:?}");
        actions
    }

    pub fn cancel_placement(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.preview.take().is_some() {
            self.end_placement(&mut actions);
            log::debug!("placement cancelled");
        }
        actions
    }

    /// Commit a complete draft. Incomplete drafts are left untouched.
    pub fn confirm_placement(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(geometry) = self.preview.as_ref().and_then(PlacementPreview::commit) else {
            return actions;
        };
        self.preview = None;
        actions.push(Action::PlacementCommitted(geometry));
        self.end_placement(&mut actions);
        log::debug!("placement confirmed");
        actions
    }

    fn end_placement(&mut self, actions: &mut Vec<Action>) {
        self.surface.clear_preview();
        self.sync.set_pointer_suppressed(false, &mut self.surface);
        actions.push(Action::PlacementChanged);
        self.set_cursor(Cursor::Default, actions);
    }

    #[must_use]
    pub fn placement(&self) -> Option<&PlacementDraft> {
        self.preview.as_ref().map(PlacementPreview::draft)
    }

    #[must_use]
    pub fn placement_complete(&self) -> bool {
        self.preview.as_ref().is_some_and(PlacementPreview::is_complete)
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn set_cursor(&mut self, cursor: Cursor, actions: &mut Vec<Action>) {
        if self.cursor != cursor {
            self.cursor = cursor;
            actions.push(Action::SetCursor(cursor));
        }
    }

    // --- Fly-to ---

    pub fn request_fly_to(&mut self, target: EditTarget) {
        self.fly_requests.request(target);
    }

    /// Consume the pending fly-to request. A target that is not on the map
    /// is dropped.
    pub fn take_fly_to(&mut self) -> Option<FlyToPlan> {
        let target = self.fly_requests.consume()?;
        resolve_fly_to(target, &self.sync, &self.config.fly)
    }

    // --- Queries ---

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn sync(&self) -> &DataSync {
        &self.sync
    }

    #[must_use]
    pub fn session(&self) -> &EditSession {
        &self.session
    }
}
