//! Engine configuration.
//!
//! Every field has a default, so a host may pass a partial JSON document and
//! only override what it needs. [`EngineConfig::from_json`] validates the
//! result before handing it out.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::CIRCLE_POINTS;
use crate::error::ConfigError;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub style: StyleConfig,
    pub placement: PlacementConfig,
    pub fly: FlyConfig,
}

impl EngineConfig {
    /// Parse and validate a (possibly partial) JSON config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value fails validation.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.placement;
        if !(p.min_radius_m > 0.0 && p.min_radius_m <= p.max_radius_m) {
            return Err(ConfigError::Invalid(format!(
                "placement radius range {}..{} m is empty or non-positive",
                p.min_radius_m, p.max_radius_m
            )));
        }
        if p.default_radius_m < p.min_radius_m || p.default_radius_m > p.max_radius_m {
            return Err(ConfigError::Invalid(format!(
                "default radius {} m is outside {}..{} m",
                p.default_radius_m, p.min_radius_m, p.max_radius_m
            )));
        }
        if p.circle_points < 3 {
            return Err(ConfigError::Invalid(format!("circle needs at least 3 points, got {}", p.circle_points)));
        }
        if self.style.pin_zoom_ref <= 0.0 {
            return Err(ConfigError::Invalid("pin reference zoom must be positive".to_owned()));
        }
        Ok(())
    }
}

/// Colors, stroke weights, fill opacities, and icon sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Primary color when the theme has no `primary` token.
    pub fallback_primary: String,
    /// Muted color when the theme has no muted token.
    pub fallback_muted: String,
    /// Background color when the theme has no `background`/`card` token.
    pub fallback_background: String,

    pub zone_weight_selected: f64,
    pub zone_weight_muted: f64,
    pub zone_fill_opacity_selected: f64,
    pub zone_fill_opacity_muted: f64,
    /// Dash pattern of the active zone's border.
    pub zone_dash_array: String,

    pub object_weight_selected: f64,
    pub object_weight_in_zone: f64,
    pub object_weight_muted: f64,
    pub object_fill_opacity_selected: f64,
    pub object_fill_opacity_in_zone: f64,
    pub object_fill_opacity_outside: f64,

    /// Pin icon size at and above [`Self::pin_zoom_ref`], `[width, height]`.
    pub pin_icon_size: [u32; 2],
    /// Pin icon size as zoom approaches zero.
    pub pin_icon_size_min: [u32; 2],
    pub pin_zoom_ref: f64,

    /// Vertex and midpoint handle size, `[width, height]`. Not zoom-scaled.
    pub edit_handle_size: [u32; 2],

    pub preview_line_weight: f64,
    pub preview_line_dash: String,
    pub center_handle_radius: f64,
    pub center_handle_weight: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            fallback_primary: "#818cf8".to_owned(),
            fallback_muted: "#94a3b8".to_owned(),
            fallback_background: "#fff".to_owned(),
            zone_weight_selected: 2.0,
            zone_weight_muted: 1.5,
            zone_fill_opacity_selected: 0.28,
            zone_fill_opacity_muted: 0.12,
            zone_dash_array: "8 6".to_owned(),
            object_weight_selected: 3.0,
            object_weight_in_zone: 2.0,
            object_weight_muted: 1.5,
            object_fill_opacity_selected: 0.35,
            object_fill_opacity_in_zone: 0.12,
            object_fill_opacity_outside: 0.18,
            pin_icon_size: [24, 32],
            pin_icon_size_min: [12, 16],
            pin_zoom_ref: 17.0,
            edit_handle_size: [18, 18],
            preview_line_weight: 2.0,
            preview_line_dash: "4,4".to_owned(),
            center_handle_radius: 11.0,
            center_handle_weight: 3.0,
        }
    }
}

/// Radius range and circle resolution for zone placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub min_radius_m: f64,
    pub max_radius_m: f64,
    /// Radius a fresh radius-mode draft starts with.
    pub default_radius_m: f64,
    /// Vertex count of the circle approximation.
    pub circle_points: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self { min_radius_m: 10.0, max_radius_m: 10_000.0, default_radius_m: 50.0, circle_points: CIRCLE_POINTS }
    }
}

/// Viewport framing for one kind of fly-to target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlyFraming {
    pub padding_px: [u32; 2],
    pub max_zoom: u8,
}

/// Fly-to animation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyConfig {
    pub duration_ms: u32,
    pub zone: FlyFraming,
    pub object: FlyFraming,
}

impl Default for FlyConfig {
    fn default() -> Self {
        Self {
            duration_ms: 600,
            zone: FlyFraming { padding_px: [32, 32], max_zoom: 15 },
            object: FlyFraming { padding_px: [32, 32], max_zoom: 17 },
        }
    }
}
