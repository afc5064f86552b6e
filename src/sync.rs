//! Data synchronization: keeps the render surface in step with the dataset.
//!
//! Every pass computes a [`Signature`] over the render-relevant inputs. When
//! it matches the signature of what is already drawn, the pass is skipped
//! entirely: stable geometry is never torn down and rebuilt just because the
//! host handed over a new-but-equal copy of its data. Otherwise the surface is
//! cleared and every zone and point object is drawn again.
//!
//! Selection feedback goes through a separate, lighter pass
//! ([`DataSync::restyle_objects`]) that swaps icons and stroke weights in place.
//!
//! The edit-session parts of a rebuild (capturing and restoring in-progress
//! rings, tearing down and re-attaching overlays) are sequenced by
//! [`crate::engine::EngineCore::refresh`].

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use serde::Serialize;

use crate::config::StyleConfig;
use crate::geo::{Geometry, ObjectId, PlanObject, Ring, Zone, ZoneId};
use crate::shape::{Shape, set_ring};
use crate::style::{ObjectStyle, marker_style, path_style, zone_style};
use crate::surface::{LayerId, LayerKind, LayerMeta, RenderSurface};
use crate::theme::Palette;

/// Render-relevant inputs of one pass, borrowed from the host's state.
#[derive(Debug, Clone, Copy)]
pub struct SyncInput<'a> {
    pub zones: &'a [Zone],
    pub objects: &'a [PlanObject],
    pub active_zone: Option<ZoneId>,
    pub selected_object: Option<ObjectId>,
    /// Objects the backend lists as members of the active zone.
    pub objects_in_zone: &'a [ObjectId],
    pub objects_visible: bool,
    pub zoom: f64,
}

impl SyncInput<'_> {
    /// Whether `id` is drawn as belonging to the active zone.
    #[must_use]
    pub fn in_active_zone(&self, id: ObjectId) -> bool {
        self.active_zone.is_some() && self.objects_in_zone.contains(&id)
    }
}

/// Entities whose geometry parsed; everything else is left off the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub zones: Vec<(ZoneId, Geometry)>,
    pub objects: Vec<(ObjectId, Geometry)>,
}

impl Dataset {
    /// Parse the input's geometry, skipping absent or malformed entries.
    #[must_use]
    pub fn prepare(input: &SyncInput<'_>) -> Self {
        let zones = input
            .zones
            .iter()
            .filter_map(|z| parse_geometry(LayerMeta::zone(z.id), z.geometry.as_ref()).map(|g| (z.id, g)))
            .collect();
        let objects = input
            .objects
            .iter()
            .filter_map(|o| parse_geometry(LayerMeta::object(o.id), o.geometry.as_ref()).map(|g| (o.id, g)))
            .collect();
        Self { zones, objects }
    }
}

fn parse_geometry(meta: LayerMeta, raw: Option<&serde_json::Value>) -> Option<Geometry> {
    let raw = raw?;
    let geometry = Geometry::from_value(raw);
    if geometry.is_none() {
        log::debug!("skipping {:?} {}: unusable geometry", meta.kind, meta.id);
    }
    geometry
}

#[derive(Serialize)]
struct SignatureFields<'a> {
    zones: &'a [(ZoneId, Geometry)],
    objects: &'a [(ObjectId, Geometry)],
    active: Option<ZoneId>,
    in_zone: &'a [ObjectId],
    primary: &'a str,
    muted: &'a str,
    zone_selected: &'a str,
    zone_muted: &'a str,
    objects_visible: bool,
}

/// Deterministic fingerprint of everything a full rebuild depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Option<String>);

impl Signature {
    #[must_use]
    pub fn compute(dataset: &Dataset, input: &SyncInput<'_>, palette: &Palette) -> Self {
        let fields = SignatureFields {
            zones: &dataset.zones,
            objects: &dataset.objects,
            active: input.active_zone,
            in_zone: input.objects_in_zone,
            primary: &palette.primary,
            muted: &palette.muted,
            zone_selected: &palette.zone_selected,
            zone_muted: &palette.zone_muted,
            objects_visible: input.objects_visible,
        };
        match serde_json::to_string(&fields) {
            Ok(key) => Self(Some(key)),
            Err(err) => {
                log::warn!("dataset signature unavailable, forcing rebuild: {err}");
                Self(None)
            }
        }
    }

    /// Whether two signatures describe the same render. An unavailable
    /// signature never matches anything.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        matches!((&self.0, &other.0), (Some(a), Some(b)) if a == b)
    }
}

/// Inputs of the selection restyle pass.
#[derive(Debug, Clone, PartialEq)]
struct RestyleKey {
    selected: Option<ObjectId>,
    active: Option<ZoneId>,
    in_zone: Vec<ObjectId>,
    palette: Palette,
    zoom: f64,
}

impl RestyleKey {
    fn new(input: &SyncInput<'_>, palette: &Palette) -> Self {
        Self {
            selected: input.selected_object,
            active: input.active_zone,
            in_zone: input.objects_in_zone.to_vec(),
            palette: palette.clone(),
            zoom: input.zoom,
        }
    }
}

/// Where the synchronization layer stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing drawn yet, or the cache was invalidated and torn down.
    Idle,
    /// The dataset is drawn and tagged with a signature.
    Rendered,
    /// Rendered, with edit handles on top.
    EditingOverlay,
}

/// Result of one sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The signature matched; the surface was not touched.
    Skipped,
    /// The surface was cleared and redrawn.
    Rebuilt { zones: usize, objects: usize },
}

/// A rendered layer and the engine's copy of its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLayer {
    pub id: LayerId,
    pub meta: LayerMeta,
    pub shape: Shape,
}

/// Owner of the rendered layers and the cached signature.
#[derive(Debug, Default)]
pub struct DataSync {
    layers: Vec<RenderedLayer>,
    zone_geometries: Vec<(ZoneId, Geometry)>,
    signature: Option<Signature>,
    restyle_key: Option<RestyleKey>,
    rebuilds: u64,
    pointer_suppressed: bool,
}

impl DataSync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `signature` describes what is already on the surface.
    #[must_use]
    pub fn is_current(&self, signature: &Signature) -> bool {
        self.signature.as_ref().is_some_and(|cached| cached.matches(signature))
    }

    /// Forget the cached signature so the next pass rebuilds.
    pub fn invalidate(&mut self) {
        self.signature = None;
        self.restyle_key = None;
    }

    /// `Idle` or `Rendered`; the engine reports `EditingOverlay` on top.
    #[must_use]
    pub fn state(&self) -> SyncState {
        if self.signature.is_some() { SyncState::Rendered } else { SyncState::Idle }
    }

    /// Number of full rebuilds so far.
    #[must_use]
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Clear the surface and draw every zone and, when the objects layer is
    /// visible, every point object.
    ///
    /// Only point objects are drawn; other object geometries are skipped.
    pub fn rebuild(
        &mut self,
        dataset: Dataset,
        input: &SyncInput<'_>,
        signature: Signature,
        palette: &Palette,
        style: &StyleConfig,
        surface: &mut dyn RenderSurface,
    ) -> SyncOutcome {
        surface.clear();
        self.layers.clear();

        let mut zones = 0;
        for (id, geometry) in &dataset.zones {
            let meta = LayerMeta::zone(*id);
            let shape = Shape::from_geometry(geometry);
            let zs = zone_style(input.active_zone == Some(*id), palette, style);
            let layer = surface.add_zone(meta, &shape, &zs);
            self.layers.push(RenderedLayer { id: layer, meta, shape });
            zones += 1;
        }

        let mut objects = 0;
        if input.objects_visible {
            for (id, geometry) in &dataset.objects {
                if !matches!(geometry, Geometry::Point(_)) {
                    continue;
                }
                let meta = LayerMeta::object(*id);
                let shape = Shape::from_geometry(geometry);
                let selected = input.selected_object == Some(*id);
                let ms = marker_style(selected, input.in_active_zone(*id), palette, input.zoom, style);
                let layer = surface.add_point(meta, &shape, &ms);
                self.layers.push(RenderedLayer { id: layer, meta, shape });
                objects += 1;
            }
        }

        self.zone_geometries = dataset.zones;
        self.signature = Some(signature);
        self.restyle_key = Some(RestyleKey::new(input, palette));
        self.rebuilds += 1;
        log::debug!("map layers rebuilt: {zones} zones, {objects} objects");
        SyncOutcome::Rebuilt { zones, objects }
    }

    /// Restyle already-drawn object layers in place when selection, active
    /// zone membership, palette, or zoom changed since the last pass. Returns
    /// the number of layers restyled.
    pub fn restyle_objects(
        &mut self,
        input: &SyncInput<'_>,
        palette: &Palette,
        style: &StyleConfig,
        surface: &mut dyn RenderSurface,
    ) -> usize {
        let key = RestyleKey::new(input, palette);
        if self.restyle_key.as_ref() == Some(&key) {
            return 0;
        }
        let mut restyled = 0;
        for layer in self.layers.iter().filter(|l| l.meta.kind == LayerKind::Object) {
            let selected = input.selected_object == Some(layer.meta.id);
            let in_zone = input.in_active_zone(layer.meta.id);
            let object_style = match layer.shape {
                Shape::Marker { .. } => ObjectStyle::Marker(marker_style(selected, in_zone, palette, input.zoom, style)),
                Shape::Polygon { .. } | Shape::MultiPolygon { .. } | Shape::Polyline { .. } => {
                    ObjectStyle::Path(path_style(selected, in_zone, palette, style))
                }
            };
            surface.restyle(layer.id, &object_style);
            restyled += 1;
        }
        self.restyle_key = Some(key);
        restyled
    }

    /// Disable data-layer pointer events while a placement is in progress so
    /// clicks reach the placement handlers, and restore them afterwards.
    pub fn set_pointer_suppressed(&mut self, suppressed: bool, surface: &mut dyn RenderSurface) {
        if self.pointer_suppressed != suppressed {
            self.pointer_suppressed = suppressed;
            surface.set_data_pointer_events(!suppressed);
        }
    }

    #[must_use]
    pub fn pointer_suppressed(&self) -> bool {
        self.pointer_suppressed
    }

    // --- Layer access ---

    #[must_use]
    pub fn layers(&self) -> &[RenderedLayer] {
        &self.layers
    }

    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&RenderedLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut RenderedLayer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// The layer tagged with `meta`.
    #[must_use]
    pub fn find(&self, meta: LayerMeta) -> Option<&RenderedLayer> {
        self.layers.iter().find(|l| l.meta == meta)
    }

    pub fn find_mut(&mut self, meta: LayerMeta) -> Option<&mut RenderedLayer> {
        self.layers.iter_mut().find(|l| l.meta == meta)
    }

    /// Zone geometries of the last rebuild, in input order.
    #[must_use]
    pub fn zone_geometries(&self) -> &[(ZoneId, Geometry)] {
        &self.zone_geometries
    }

    /// Put an in-progress ring back onto a freshly drawn layer.
    pub fn restore_ring(&mut self, meta: LayerMeta, ring: Ring, surface: &mut dyn RenderSurface) -> bool {
        let Some(layer) = self.find_mut(meta) else {
            return false;
        };
        if !layer.shape.is_path() {
            return false;
        }
        set_ring(&mut layer.shape, ring);
        surface.redraw(layer.id, &layer.shape);
        true
    }
}
