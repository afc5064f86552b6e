//! Map geometry synchronization and editing engine for master-plan zones.
//!
//! This crate is compiled to WebAssembly and runs in the browser next to a
//! tiled map widget. It owns the live vector layer on top of the map: it diffs
//! incoming zone/object data against what is already drawn, restyles selection
//! cheaply, drives free-hand polygon editing through draggable handles, and
//! previews new zones while the user places them. The host layer is
//! responsible only for wiring widget events to the engine, implementing
//! [`surface::RenderSurface`] on top of the widget, and applying the returned
//! [`engine::Action`]s to its own state store.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level, host-independent [`engine::EngineCore`] |
//! | [`sync`] | Dataset signature, rebuild/skip and selection restyle |
//! | [`session`] | Edit session: target, snapshots, save and cancel |
//! | [`overlay`] | Vertex and midpoint handles for one edited shape |
//! | [`preview`] | Live preview while placing a new zone |
//! | [`placement`] | Placement drafts (radius or corners) |
//! | [`circle`] | Circle approximation and distance math |
//! | [`geo`] | Coordinates, GeoJSON geometry, domain records |
//! | [`shape`] | Rendered shape model and ring helpers |
//! | [`hit`] | Point-in-polygon containment |
//! | [`theme`] | Theme token resolution and the resolved palette |
//! | [`style`] | Zone, marker and handle styles |
//! | [`surface`] | Render surface trait and layer/handle ids |
//! | [`intent`] | One-shot request intake |
//! | [`flyto`] | Fly-to request resolution |
//! | [`config`] | Engine configuration |
//! | [`error`] | Error types |
//! | [`web`] | Browser-backed theme resolver |
//! | [`consts`] | Shared numeric constants |

pub mod circle;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod flyto;
pub mod geo;
pub mod hit;
pub mod intent;
pub mod overlay;
pub mod placement;
pub mod preview;
pub mod session;
pub mod shape;
pub mod style;
pub mod surface;
pub mod sync;
pub mod theme;
pub mod web;

#[cfg(test)]
mod testing;
