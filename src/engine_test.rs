#![allow(clippy::float_cmp)]

use futures::executor::block_on;

use super::*;
use crate::shape::ring_of;
use crate::surface::{HandleKind, LayerMeta};
use crate::testing::{MemoryStore, RecordingSurface, ll, point_object, square, zone};
use crate::theme::StaticTheme;

// =============================================================
// Helpers
// =============================================================

type Engine = EngineCore<RecordingSurface, StaticTheme>;

fn zones() -> Vec<Zone> {
    vec![zone(1, square(0.0, 0.0, 10.0)), zone(2, square(20.0, 0.0, 10.0))]
}

fn objects() -> Vec<PlanObject> {
    vec![point_object(10, 5.0, 5.0), point_object(11, 50.0, 50.0)]
}

/// Engine with two zones and two markers, already refreshed once.
fn engine() -> Engine {
    let mut engine = EngineCore::new(RecordingSurface::new(), StaticTheme::new(), EngineConfig::default());
    engine.set_zones(zones());
    engine.set_objects(objects());
    engine.set_zoom(17.0);
    engine.refresh();
    engine
}

fn layer(engine: &Engine, meta: LayerMeta) -> LayerId {
    engine.sync().find(meta).unwrap().id
}

fn zone_ring(engine: &Engine, id: ZoneId) -> Vec<LngLat> {
    ring_of(&engine.sync().find(LayerMeta::zone(id)).unwrap().shape).to_vec()
}

fn original_square() -> Vec<LngLat> {
    vec![ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 10.0), ll(10.0, 0.0)]
}

/// Open zone 1 for editing through the request intake.
fn edit_zone_one(engine: &mut Engine) {
    engine.request_geometry_edit(LayerMeta::zone(1));
    assert_eq!(engine.refresh(), vec![Action::EditModeChanged(true)]);
}

fn drag_first_vertex(engine: &mut Engine, to: LngLat) {
    let (handle, _) = engine.surface().handles_of(HandleKind::Vertex)[0];
    assert!(engine.on_handle_drag_start(handle));
    assert!(engine.on_handle_drag(handle, to));
    assert!(engine.on_handle_drag_end(handle));
}

// =============================================================
// refresh
// =============================================================

#[test]
fn first_refresh_renders_dataset() {
    let engine = engine();
    assert_eq!(engine.sync_state(), SyncState::Rendered);
    assert_eq!(engine.surface().zones_added, 2);
    assert_eq!(engine.surface().points_added, 2);
}

#[test]
fn unchanged_inputs_do_not_rebuild() {
    let mut engine = engine();
    engine.set_zones(zones());
    engine.set_objects(objects());
    assert!(engine.refresh().is_empty());
    engine.refresh();
    assert_eq!(engine.surface().clears, 1);
    assert_eq!(engine.sync().rebuilds(), 1);
}

#[test]
fn changed_zone_rebuilds() {
    let mut engine = engine();
    engine.set_zones(vec![zone(1, square(0.0, 0.0, 12.0))]);
    engine.refresh();
    assert_eq!(engine.surface().clears, 2);
    assert!(engine.sync().find(LayerMeta::zone(2)).is_none());
}

#[test]
fn selection_restyles_in_place() {
    let mut engine = engine();
    engine.set_selected_object(Some(10));
    engine.refresh();
    assert_eq!(engine.surface().clears, 1);
    assert_eq!(engine.surface().restyles, 2);
}

#[test]
fn sync_state_follows_lifecycle() {
    let mut engine = EngineCore::new(RecordingSurface::new(), StaticTheme::new(), EngineConfig::default());
    assert_eq!(engine.sync_state(), SyncState::Idle);
    engine.set_zones(zones());
    engine.refresh();
    assert_eq!(engine.sync_state(), SyncState::Rendered);
    edit_zone_one(&mut engine);
    assert_eq!(engine.sync_state(), SyncState::EditingOverlay);
}

// =============================================================
// Layer clicks
// =============================================================

#[test]
fn zone_click_activates_zone() {
    let mut engine = engine();
    let id = layer(&engine, LayerMeta::zone(2));
    assert_eq!(engine.on_layer_click(id), vec![Action::SetActiveZone(2)]);
    assert_eq!(engine.refresh(), Vec::new());
    assert!(!engine.is_editing());
}

#[test]
fn zone_click_with_edit_intent_opens_editing() {
    let mut engine = engine();
    engine.set_edit_intent(true);
    let id = layer(&engine, LayerMeta::zone(1));
    assert_eq!(engine.on_layer_click(id), vec![Action::SetActiveZone(1)]);
    assert!(!engine.is_editing());

    assert_eq!(engine.refresh(), vec![Action::EditModeChanged(true)]);
    assert_eq!(engine.edit_target(), Some(LayerMeta::zone(1)));
    assert_eq!(engine.surface().handles_of(HandleKind::Vertex).len(), 4);
}

#[test]
fn edit_intent_is_consumed_by_one_click() {
    let mut engine = engine();
    engine.set_edit_intent(true);
    let one = layer(&engine, LayerMeta::zone(1));
    engine.on_layer_click(one);
    engine.refresh();
    let two = layer(&engine, LayerMeta::zone(2));
    engine.on_layer_click(two);
    engine.refresh();
    assert_eq!(engine.edit_target(), Some(LayerMeta::zone(1)));
}

#[test]
fn marker_click_selects_and_activates_containing_zone() {
    let mut engine = engine();
    let id = layer(&engine, LayerMeta::object(10));
    assert_eq!(engine.on_layer_click(id), vec![Action::SetActiveZone(1), Action::SelectObject(10)]);
}

#[test]
fn marker_outside_every_zone_only_selects() {
    let mut engine = engine();
    let id = layer(&engine, LayerMeta::object(11));
    assert_eq!(engine.on_layer_click(id), vec![Action::SelectObject(11)]);
}

#[test]
fn layer_clicks_ignored_while_placing() {
    let mut engine = engine();
    engine.start_placement(PlacementMode::Corners);
    let id = layer(&engine, LayerMeta::zone(1));
    assert!(engine.on_layer_click(id).is_empty());
}

#[test]
fn unknown_layer_click_is_ignored() {
    let mut engine = engine();
    assert!(engine.on_layer_click(LayerId(999)).is_empty());
}

// =============================================================
// Editing across rebuilds
// =============================================================

#[test]
fn rebuild_during_edit_keeps_live_ring_and_handles() {
    let mut engine = engine();
    edit_zone_one(&mut engine);
    drag_first_vertex(&mut engine, ll(-3.0, -3.0));

    let mut more = objects();
    more.push(point_object(12, 25.0, 5.0));
    engine.set_objects(more);
    assert!(engine.refresh().is_empty());

    assert_eq!(engine.surface().clears, 2);
    assert_eq!(zone_ring(&engine, 1)[0], ll(-3.0, -3.0));
    let vertices = engine.surface().handles_of(HandleKind::Vertex);
    assert_eq!(vertices.len(), 4);
    assert_eq!(vertices[0].1, ll(-3.0, -3.0));
    assert_eq!(engine.surface().handles.len(), 8);
    assert!(engine.is_editing());
}

#[test]
fn deleted_target_turns_editing_off() {
    let mut engine = engine();
    engine.request_geometry_edit(LayerMeta::zone(2));
    engine.refresh();
    engine.set_zones(vec![zone(1, square(0.0, 0.0, 10.0))]);
    assert_eq!(engine.refresh(), vec![Action::EditModeChanged(false)]);
    assert!(!engine.is_editing());
    assert!(engine.surface().handles.is_empty());
    assert!(engine.sync().find(LayerMeta::zone(2)).is_none());
}

#[test]
fn cancel_edit_restores_and_invalidates() {
    let mut engine = engine();
    edit_zone_one(&mut engine);
    drag_first_vertex(&mut engine, ll(-3.0, -3.0));

    assert_eq!(engine.cancel_edit(), vec![Action::EditModeChanged(false)]);
    assert_eq!(zone_ring(&engine, 1), original_square());
    assert!(engine.surface().handles.is_empty());
    assert_eq!(engine.sync_state(), SyncState::Idle);

    engine.refresh();
    assert_eq!(engine.surface().clears, 2);
    assert_eq!(zone_ring(&engine, 1), original_square());
}

#[test]
fn cancel_without_session_does_nothing() {
    let mut engine = engine();
    assert!(engine.cancel_edit().is_empty());
}

#[test]
fn open_edit_mode_covers_all_zones() {
    let mut engine = engine();
    assert_eq!(engine.open_edit_mode(), vec![Action::EditModeChanged(true)]);
    assert_eq!(engine.edit_target(), None);
    assert_eq!(engine.surface().handles.len(), 16);
    assert!(engine.open_edit_mode().is_empty(), "already on");
}

#[test]
fn edit_request_for_zone_without_geometry_is_dropped() {
    let mut engine = engine();
    let mut with_empty = zones();
    with_empty.push(Zone { id: 3, name: "empty".to_owned(), geometry: None, area_m2: None });
    engine.set_zones(with_empty);
    engine.refresh();

    engine.request_geometry_edit(LayerMeta::zone(3));
    assert!(engine.refresh().is_empty());
    assert!(!engine.is_editing());
    assert!(engine.refresh().is_empty(), "request consumed");
    assert!(!engine.is_editing());
    assert!(engine.surface().handles.is_empty());
}

#[test]
fn edit_request_for_point_zone_is_dropped() {
    let mut engine = engine();
    let mut with_point = zones();
    with_point.push(zone(3, serde_json::json!({"type": "Point", "coordinates": [40.0, 5.0]})));
    engine.set_zones(with_point);
    engine.refresh();

    engine.request_geometry_edit(LayerMeta::zone(3));
    assert!(engine.refresh().is_empty());
    assert!(!engine.is_editing());
}

#[test]
fn edit_request_for_unknown_zone_is_dropped() {
    let mut engine = engine();
    engine.request_geometry_edit(LayerMeta::zone(99));
    assert!(engine.refresh().is_empty());
    assert!(!engine.is_editing());
    assert!(engine.begin_save().is_err());
}

#[test]
fn object_edit_request_is_ignored() {
    let mut engine = engine();
    engine.request_geometry_edit(LayerMeta::object(10));
    assert!(engine.refresh().is_empty());
    assert!(!engine.is_editing());
}

// =============================================================
// Whole-shape drag
// =============================================================

#[test]
fn shape_drag_moves_zone_and_toggles_map_dragging() {
    let mut engine = engine();
    edit_zone_one(&mut engine);
    let id = layer(&engine, LayerMeta::zone(1));

    assert_eq!(
        engine.on_pointer_down(ll(5.0, 5.0), Some(id)),
        vec![Action::SetMapDragging(false), Action::SetCursor(Cursor::Grabbing)]
    );
    assert!(engine.on_pointer_move(ll(6.0, 4.0)).is_empty());
    assert_eq!(zone_ring(&engine, 1)[0], ll(1.0, -1.0));
    assert_eq!(
        engine.on_pointer_up(ll(6.0, 4.0)),
        vec![Action::SetMapDragging(true), Action::SetCursor(Cursor::Default)]
    );
    assert_eq!(engine.surface().handles_of(HandleKind::Vertex)[0].1, ll(1.0, -1.0));
}

#[test]
fn pointer_down_outside_edited_shape_does_nothing() {
    let mut engine = engine();
    edit_zone_one(&mut engine);
    let other = layer(&engine, LayerMeta::zone(2));
    assert!(engine.on_pointer_down(ll(25.0, 5.0), Some(other)).is_empty());
    assert!(engine.on_pointer_down(ll(25.0, 5.0), None).is_empty());
}

#[test]
fn rebuild_mid_drag_releases_map_and_reattaches() {
    let mut engine = engine();
    edit_zone_one(&mut engine);
    let id = layer(&engine, LayerMeta::zone(1));
    engine.on_pointer_down(ll(5.0, 5.0), Some(id));
    engine.on_pointer_move(ll(7.0, 5.0));

    engine.set_zones(vec![zone(1, square(0.0, 0.0, 10.0)), zone(3, square(40.0, 0.0, 5.0))]);
    assert_eq!(engine.refresh(), vec![Action::SetMapDragging(true), Action::SetCursor(Cursor::Default)]);
    assert_eq!(zone_ring(&engine, 1)[0], ll(2.0, 0.0));
    assert_eq!(engine.surface().handles_of(HandleKind::Vertex).len(), 4);
    assert!(engine.on_pointer_up(ll(7.0, 5.0)).is_empty());
}

// =============================================================
// Save
// =============================================================

#[test]
fn save_sends_one_update_per_zone_and_closes() {
    let mut engine = engine();
    edit_zone_one(&mut engine);
    drag_first_vertex(&mut engine, ll(-3.0, -3.0));

    let store = MemoryStore::new();
    let report = block_on(engine.save(&store)).unwrap();
    assert_eq!(report.saved, vec![1, 2]);
    let calls = store.calls();
    assert_eq!(calls.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(!engine.is_editing());
    assert!(!engine.is_saving());
    assert!(engine.surface().handles.is_empty());
}

#[test]
fn failed_save_keeps_editing() {
    let mut engine = engine();
    edit_zone_one(&mut engine);
    let store = MemoryStore::failing(&[1]);
    let err = block_on(engine.save(&store)).unwrap_err();
    assert!(matches!(err, SaveError::Failed { ref succeeded, .. } if succeeded == &vec![2]));
    assert!(engine.is_editing());
    assert_eq!(engine.surface().handles.len(), 8);
}

#[test]
fn save_without_session_fails() {
    let mut engine = engine();
    let store = MemoryStore::new();
    assert_eq!(block_on(engine.save(&store)), Err(SaveError::NotEditing));
    assert!(store.calls().is_empty());
}

#[test]
fn handles_are_inert_while_saving() {
    let mut engine = engine();
    edit_zone_one(&mut engine);
    let (handle, _) = engine.surface().handles_of(HandleKind::Vertex)[0];
    let plan = engine.begin_save().unwrap();
    assert!(engine.is_saving());
    assert!(!engine.on_handle_drag(handle, ll(-9.0, -9.0)));
    assert!(engine.cancel_edit().is_empty());
    let results = plan.updates.iter().map(|_| Ok(())).collect();
    assert!(engine.finish_save(plan, results).is_ok());
    assert_eq!(zone_ring(&engine, 1), original_square());
}

// =============================================================
// Placement
// =============================================================

#[test]
fn corner_placement_lifecycle() {
    let mut engine = engine();
    assert_eq!(
        engine.start_placement(PlacementMode::Corners),
        vec![Action::PlacementChanged, Action::SetCursor(Cursor::Pointer)]
    );
    assert_eq!(engine.surface().data_pointer_events, Some(false));
    assert_eq!(engine.placement(), Some(&PlacementDraft::Corners { points: Vec::new() }));

    for p in [ll(0.0, 0.0), ll(0.0, 1.0), ll(1.0, 1.0), ll(1.0, 0.0)] {
        assert!(!engine.placement_complete());
        assert_eq!(engine.on_map_click(p), vec![Action::PlacementChanged]);
    }
    assert!(engine.placement_complete());

    let actions = engine.confirm_placement();
    assert_eq!(actions.len(), 3);
    assert!(matches!(&actions[0], Action::PlacementCommitted(Geometry::Polygon(rings)) if rings[0].len() == 5));
    assert_eq!(actions[1..], [Action::PlacementChanged, Action::SetCursor(Cursor::Default)]);
    assert_eq!(engine.placement(), None);
    assert_eq!(engine.surface().data_pointer_events, Some(true));
    assert_eq!(engine.surface().preview, None);
}

#[test]
fn radius_placement_cursor_sequence() {
    let mut engine = engine();
    engine.start_placement(PlacementMode::Radius);
    assert_eq!(
        engine.on_map_click(ll(0.0, 0.0)),
        vec![Action::PlacementChanged, Action::SetCursor(Cursor::Grab)]
    );
    assert_eq!(engine.on_pointer_down(ll(0.0, 0.0), None), vec![Action::SetCursor(Cursor::Grabbing)]);
    assert_eq!(engine.on_pointer_move(ll(0.0, 0.001)), vec![Action::PlacementChanged]);
    assert_eq!(engine.on_pointer_up(ll(0.0, 0.001)), vec![Action::SetCursor(Cursor::Grab)]);
    assert!(engine.confirm_placement().is_empty(), "radius not fixed yet");
    assert_eq!(
        engine.on_map_click(ll(0.0, 0.001)),
        vec![Action::PlacementChanged, Action::SetCursor(Cursor::Pointer)]
    );
    assert!(engine.placement_complete());
    assert!(engine.surface().preview.as_ref().is_some_and(|scene| scene.center.is_some()));
}

#[test]
fn cancel_placement_clears_preview() {
    let mut engine = engine();
    engine.start_placement(PlacementMode::Corners);
    engine.on_map_click(ll(0.0, 0.0));
    assert_eq!(engine.cancel_placement(), vec![Action::PlacementChanged, Action::SetCursor(Cursor::Default)]);
    assert_eq!(engine.surface().preview, None);
    assert_eq!(engine.surface().data_pointer_events, Some(true));
    assert!(engine.cancel_placement().is_empty());
}

#[test]
fn starting_placement_cancels_edit() {
    let mut engine = engine();
    edit_zone_one(&mut engine);
    drag_first_vertex(&mut engine, ll(-3.0, -3.0));
    assert_eq!(
        engine.start_placement(PlacementMode::Corners),
        vec![Action::EditModeChanged(false), Action::PlacementChanged, Action::SetCursor(Cursor::Pointer)]
    );
    assert!(!engine.is_editing());
    assert_eq!(zone_ring(&engine, 1), original_square());
}

#[test]
fn opening_edit_cancels_placement() {
    let mut engine = engine();
    engine.start_placement(PlacementMode::Corners);
    assert_eq!(
        engine.open_edit_mode(),
        vec![Action::PlacementChanged, Action::SetCursor(Cursor::Default), Action::EditModeChanged(true)]
    );
    assert_eq!(engine.placement(), None);
}

#[test]
fn map_click_without_placement_does_nothing() {
    let mut engine = engine();
    assert!(engine.on_map_click(ll(1.0, 1.0)).is_empty());
}

// =============================================================
// Fly-to
// =============================================================

#[test]
fn fly_to_zone_frames_its_bounds() {
    let mut engine = engine();
    engine.request_fly_to(LayerMeta::zone(1));
    let plan = engine.take_fly_to().unwrap();
    assert_eq!(plan.target, LayerMeta::zone(1));
    assert_eq!(plan.bounds.south_west, ll(0.0, 0.0));
    assert_eq!(plan.bounds.north_east, ll(10.0, 10.0));
    assert_eq!(plan.max_zoom, 15);
    assert_eq!(plan.duration_ms, 600);
    assert_eq!(engine.take_fly_to(), None, "consumed once");
}

#[test]
fn fly_to_object_uses_closer_zoom() {
    let mut engine = engine();
    engine.request_fly_to(LayerMeta::object(10));
    let plan = engine.take_fly_to().unwrap();
    assert_eq!(plan.max_zoom, 17);
    assert_eq!(plan.bounds.center(), ll(5.0, 5.0));
}

#[test]
fn fly_to_unrendered_target_is_dropped() {
    let mut engine = engine();
    engine.request_fly_to(LayerMeta::zone(99));
    assert_eq!(engine.take_fly_to(), None);

    engine.set_objects_visible(false);
    engine.refresh();
    engine.request_fly_to(LayerMeta::object(10));
    assert_eq!(engine.take_fly_to(), None);
}
