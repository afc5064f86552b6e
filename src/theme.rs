//! Theme token resolution.
//!
//! Colors follow the active visual theme (light/dark), exposed by the host as
//! named design tokens. The engine never queries the document itself: a
//! [`ThemeResolver`] is injected, and every pass resolves one [`Palette`] up
//! front so all shapes drawn in that pass agree on their colors.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::collections::HashMap;

use crate::config::StyleConfig;

/// Source of named design-token colors.
pub trait ThemeResolver {
    /// The token's current value, or `None` when the theme does not define it
    /// (for example during the first paint, before styles are loaded).
    fn token(&self, name: &str) -> Option<String>;
}

/// Resolve `name`, falling back to `fallback` when the token is absent or blank.
pub fn resolve_theme_color(theme: &dyn ThemeResolver, name: &str, fallback: &str) -> String {
    lookup(theme, name).unwrap_or_else(|| fallback.to_owned())
}

/// Trimmed, non-empty token value.
fn lookup(theme: &dyn ThemeResolver, name: &str) -> Option<String> {
    let value = theme.token(name)?;
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_owned()) }
}

/// Fixed token table. Used by hosts without a live theme and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTheme {
    tokens: HashMap<String, String>,
}

impl StaticTheme {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style token assignment.
    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.tokens.insert(name.to_owned(), value.to_owned());
    }

    pub fn remove(&mut self, name: &str) {
        self.tokens.remove(name);
    }
}

impl ThemeResolver for StaticTheme {
    fn token(&self, name: &str) -> Option<String> {
        self.tokens.get(name).cloned()
    }
}

/// Colors resolved once per pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    /// Accent color: objects in the active zone, placement preview.
    pub primary: String,
    /// Color of objects outside the active zone.
    pub muted: String,
    /// Border of the active zone.
    pub zone_selected: String,
    /// Border of every other zone.
    pub zone_muted: String,
    /// Outline of point markers.
    pub stroke: String,
    /// Fill of the placement center handle.
    pub background: String,
}

impl Palette {
    #[must_use]
    pub fn resolve(theme: &dyn ThemeResolver, style: &StyleConfig) -> Self {
        let primary = resolve_theme_color(theme, "primary", &style.fallback_primary);
        let muted = lookup(theme, "object-outside-fill")
            .or_else(|| lookup(theme, "muted-foreground"))
            .unwrap_or_else(|| style.fallback_muted.clone());
        let zone_selected = resolve_theme_color(theme, "zone-selected-border", &primary);
        let zone_muted = resolve_theme_color(theme, "zone-border", &primary);
        let stroke = lookup(theme, "border").unwrap_or_else(|| primary.clone());
        let background = lookup(theme, "background")
            .or_else(|| lookup(theme, "card"))
            .unwrap_or_else(|| style.fallback_background.clone());
        Self { primary, muted, zone_selected, zone_muted, stroke, background }
    }
}
