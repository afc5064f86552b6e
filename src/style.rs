//! Styles handed to the render surface.
//!
//! Style functions are pure: they take the resolved [`Palette`] and the
//! [`StyleConfig`] and never look at the theme directly.

#[cfg(test)]
#[path = "style_test.rs"]
mod style_test;

use crate::config::StyleConfig;
use crate::theme::Palette;

/// Stroke and fill of a zone polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneStyle {
    pub color: String,
    pub weight: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
    /// Dash pattern; only the active zone is dashed.
    pub dash_array: Option<String>,
}

/// Pin icon of a point object.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: u32,
    /// Icon size in pixels, `(width, height)`. The icon anchors at bottom center.
    pub icon_size: (u32, u32),
}

impl MarkerStyle {
    /// Inline SVG for the pin icon.
    #[must_use]
    pub fn pin_svg(&self) -> String {
        let (w, h) = self.icon_size;
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 24 32\">\
             <path d=\"M12 0C5.4 0 0 5.4 0 12c0 9 12 20 12 20s12-11 12-20C24 5.4 18.6 0 12 0z\" \
             fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\"/></svg>",
            self.fill, self.stroke, self.stroke_width
        )
    }

    /// Pixel offset from the icon's top-left corner to the map position.
    #[must_use]
    pub fn icon_anchor(&self) -> (f64, f64) {
        (f64::from(self.icon_size.0) / 2.0, f64::from(self.icon_size.1))
    }
}

/// Stroke and fill of an object drawn as a polygon or polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStyle {
    pub color: String,
    pub weight: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

/// In-place restyle of an already rendered object layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectStyle {
    /// Icon swap for point markers.
    Marker(MarkerStyle),
    /// Weight/opacity change for vector objects.
    Path(PathStyle),
}

/// Pin icon size for `zoom`, interpolated linearly from the minimum size at
/// zoom 0 up to the base size at the reference zoom, and clamped there.
/// A non-positive zoom (unknown) yields the base size.
#[must_use]
pub fn icon_size_for_zoom(zoom: f64, style: &StyleConfig) -> (u32, u32) {
    let [base_w, base_h] = style.pin_icon_size;
    let [min_w, min_h] = style.pin_icon_size_min;
    if zoom <= 0.0 || zoom.is_nan() {
        return (base_w, base_h);
    }
    let scale = (zoom / style.pin_zoom_ref).clamp(0.0, 1.0);
    let lerp = |min: u32, base: u32| -> u32 {
        let value = f64::from(min) + (f64::from(base) - f64::from(min)) * scale;
        // The value lies between two u32 inputs, so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = value.round().max(0.0) as u32;
        rounded.max(min)
    };
    (lerp(min_w, base_w), lerp(min_h, base_h))
}

/// Style of a zone polygon; the active zone is highlighted and dashed.
#[must_use]
pub fn zone_style(is_active: bool, palette: &Palette, style: &StyleConfig) -> ZoneStyle {
    let color = if is_active { &palette.zone_selected } else { &palette.zone_muted };
    ZoneStyle {
        color: color.clone(),
        weight: if is_active { style.zone_weight_selected } else { style.zone_weight_muted },
        fill_color: color.clone(),
        fill_opacity: if is_active { style.zone_fill_opacity_selected } else { style.zone_fill_opacity_muted },
        dash_array: is_active.then(|| style.zone_dash_array.clone()),
    }
}

/// Object fill color: primary inside the active zone, muted elsewhere.
fn object_color(in_zone: bool, palette: &Palette) -> String {
    if in_zone { palette.primary.clone() } else { palette.muted.clone() }
}

/// Pin icon of a point object.
#[must_use]
pub fn marker_style(selected: bool, in_zone: bool, palette: &Palette, zoom: f64, style: &StyleConfig) -> MarkerStyle {
    MarkerStyle {
        fill: object_color(in_zone, palette),
        stroke: palette.stroke.clone(),
        stroke_width: if selected { 3 } else { 2 },
        icon_size: icon_size_for_zoom(zoom, style),
    }
}

/// Stroke and fill of a vector object.
#[must_use]
pub fn path_style(selected: bool, in_zone: bool, palette: &Palette, style: &StyleConfig) -> PathStyle {
    let color = object_color(in_zone, palette);
    let (weight, fill_opacity) = if selected {
        (style.object_weight_selected, style.object_fill_opacity_selected)
    } else if in_zone {
        (style.object_weight_in_zone, style.object_fill_opacity_in_zone)
    } else {
        (style.object_weight_muted, style.object_fill_opacity_outside)
    };
    PathStyle { color: color.clone(), weight, fill_color: color, fill_opacity }
}
