use std::rc::Rc;
use std::str::FromStr;

use indexmap::IndexMap;
use log::{error, warn};

use super::storage::KeyValueStore;
use crate::profile::options::{DRAW_ALPHA_MASK, OptionValue};
use crate::render::surface::Rgba;

pub const BACKGROUND_COLOR_KEY: &str = "backgroundColor";
pub const DRAW_ALPHA_MASK_KEY: &str = DRAW_ALPHA_MASK;
pub const DEBUG_KEY: &str = "debug";

pub const DEFAULT_BACKGROUND_COLOR: Rgba = Rgba::rgb(0xDC, 0xDC, 0xDC);

/// Process-wide display settings, each kept under its own storage key and
/// written through on change.
pub struct GlobalSettings {
    backend: Rc<dyn KeyValueStore>,
    background_color: Rgba,
    draw_alpha_mask: bool,
    debug: bool,
}

impl GlobalSettings {
    /// Read every setting, writing back the default for any that is missing
    /// or unreadable.
    pub fn load(backend: Rc<dyn KeyValueStore>) -> Self {
        let background_color = load_or_init(
            backend.as_ref(),
            BACKGROUND_COLOR_KEY,
            DEFAULT_BACKGROUND_COLOR,
            Rgba::from_hex,
            |color| color.to_hex(),
        );
        let draw_alpha_mask = load_or_init(
            backend.as_ref(),
            DRAW_ALPHA_MASK_KEY,
            false,
            |s| bool::from_str(s).ok(),
            |enabled| enabled.to_string(),
        );
        let debug = load_or_init(
            backend.as_ref(),
            DEBUG_KEY,
            false,
            |s| bool::from_str(s).ok(),
            |enabled| enabled.to_string(),
        );

        Self {
            backend,
            background_color,
            draw_alpha_mask,
            debug,
        }
    }

    pub fn background_color(&self) -> Rgba {
        self.background_color
    }

    pub fn draw_alpha_mask(&self) -> bool {
        self.draw_alpha_mask
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_background_color(&mut self, color: Rgba) {
        self.background_color = color;
        self.write(BACKGROUND_COLOR_KEY, &color.to_hex());
    }

    pub fn set_draw_alpha_mask(&mut self, enabled: bool) {
        self.draw_alpha_mask = enabled;
        self.write(DRAW_ALPHA_MASK_KEY, &enabled.to_string());
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
        self.write(DEBUG_KEY, &enabled.to_string());
    }

    /// Options merged under every device's user profile when drawing
    pub fn global_options(&self) -> IndexMap<String, OptionValue> {
        let mut options = IndexMap::new();
        options.insert(
            DRAW_ALPHA_MASK.to_string(),
            OptionValue::from(self.draw_alpha_mask),
        );
        options
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.set(key, value) {
            error!("Failed to persist setting '{}': {}", key, e);
        }
    }
}

fn load_or_init<T: Copy>(
    backend: &dyn KeyValueStore,
    key: &str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
    format: impl Fn(T) -> String,
) -> T {
    if let Some(value) = backend.get(key).as_deref().and_then(&parse) {
        return value;
    }

    if backend.get(key).is_some() {
        warn!("Replacing unreadable setting '{}' with its default", key);
    }
    if let Err(e) = backend.set(key, &format(default)) {
        error!("Failed to persist default for '{}': {}", key, e);
    }
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::storage::MemoryStore;

    #[test]
    fn writes_back_defaults() {
        let backend = Rc::new(MemoryStore::new());
        let settings = GlobalSettings::load(backend.clone());

        assert_eq!(settings.background_color(), DEFAULT_BACKGROUND_COLOR);
        assert!(!settings.draw_alpha_mask());
        assert!(!settings.debug());
        assert_eq!(
            backend.get(BACKGROUND_COLOR_KEY).as_deref(),
            Some("#DCDCDC")
        );
        assert_eq!(backend.get(DEBUG_KEY).as_deref(), Some("false"));
    }

    #[test]
    fn reads_stored_values_and_repairs_garbage() {
        let backend = Rc::new(MemoryStore::new());
        backend.set(BACKGROUND_COLOR_KEY, "#102030").unwrap();
        backend.set(DRAW_ALPHA_MASK_KEY, "yes please").unwrap();
        backend.set(DEBUG_KEY, "true").unwrap();

        let settings = GlobalSettings::load(backend.clone());
        assert_eq!(settings.background_color(), Rgba::rgb(0x10, 0x20, 0x30));
        assert!(!settings.draw_alpha_mask());
        assert!(settings.debug());
        assert_eq!(backend.get(DRAW_ALPHA_MASK_KEY).as_deref(), Some("false"));
    }

    #[test]
    fn setters_write_through() {
        let backend = Rc::new(MemoryStore::new());
        let mut settings = GlobalSettings::load(backend.clone());
        settings.set_draw_alpha_mask(true);
        settings.set_background_color(Rgba::rgb(0, 0, 0));

        let reloaded = GlobalSettings::load(backend);
        assert!(reloaded.draw_alpha_mask());
        assert_eq!(reloaded.background_color(), Rgba::BLACK);
        assert_eq!(
            reloaded.global_options().get(DRAW_ALPHA_MASK),
            Some(&OptionValue::Bool(true))
        );
    }

    #[test]
    fn read_only_backend_keeps_defaults() {
        let settings = GlobalSettings::load(Rc::new(MemoryStore::read_only()));
        assert_eq!(settings.background_color(), DEFAULT_BACKGROUND_COLOR);
    }
}
