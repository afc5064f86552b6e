//! Browser-backed theme resolution.
//!
//! Reads design tokens from CSS custom properties (`--primary`, `--border`, ...)
//! on the `<html>` element. Requires a browser environment; outside one every
//! lookup misses and the configured fallbacks apply.

use wasm_bindgen::JsValue;

use crate::theme::ThemeResolver;

/// [`ThemeResolver`] over the document's computed style.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssTheme;

impl CssTheme {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ThemeResolver for CssTheme {
    fn token(&self, name: &str) -> Option<String> {
        let window = web_sys::window()?;
        let element = window.document()?.document_element()?;
        let style = match window.get_computed_style(&element) {
            Ok(Some(style)) => style,
            Ok(None) => return None,
            Err(err) => {
                log::debug!("computed style unavailable: {}", describe(&err));
                return None;
            }
        };
        match style.get_property_value(&format!("--{name}")) {
            Ok(value) if !value.trim().is_empty() => Some(value.trim().to_owned()),
            Ok(_) => None,
            Err(err) => {
                log::debug!("theme token --{name} unreadable: {}", describe(&err));
                None
            }
        }
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
