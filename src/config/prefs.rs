//! Typed accessors for every overlay setting
//!
//! Each key has a `load_*` that resolves a missing value to its documented
//! default and a `save_*` that writes one value. The saved drag position is
//! always written and cleared as a pair.

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use super::store::{SettingEdit, SettingsStore};
use crate::constants::{defaults, keys, positioning};
use crate::types::Position;

pub fn is_enabled<S: SettingsStore + ?Sized>(store: &S) -> bool {
    store.get_bool(keys::ENABLED, defaults::ENABLED)
}

pub fn set_enabled<S: SettingsStore + ?Sized>(store: &mut S, enabled: bool) -> Result<()> {
    store.set(keys::ENABLED, enabled.into())
}

pub fn load_opacity<S: SettingsStore + ?Sized>(store: &S) -> f32 {
    store.get_float(keys::OPACITY, defaults::OPACITY)
}

pub fn save_opacity<S: SettingsStore + ?Sized>(store: &mut S, value: f32) -> Result<()> {
    store.set(keys::OPACITY, value.into())
}

pub fn load_hide_opacity<S: SettingsStore + ?Sized>(store: &S) -> f32 {
    store.get_float(keys::HIDE_OPACITY, defaults::HIDE_OPACITY)
}

pub fn save_hide_opacity<S: SettingsStore + ?Sized>(store: &mut S, value: f32) -> Result<()> {
    store.set(keys::HIDE_OPACITY, value.into())
}

pub fn load_main_button_size<S: SettingsStore + ?Sized>(store: &S) -> i32 {
    store.get_int(keys::MAIN_BUTTON_SIZE, defaults::MAIN_BUTTON_SIZE)
}

pub fn save_main_button_size<S: SettingsStore + ?Sized>(store: &mut S, size: i32) -> Result<()> {
    store.set(keys::MAIN_BUTTON_SIZE, size.into())
}

pub fn load_default_x<S: SettingsStore + ?Sized>(store: &S) -> i32 {
    store.get_int(keys::DEFAULT_X, defaults::DEFAULT_X)
}

pub fn save_default_x<S: SettingsStore + ?Sized>(store: &mut S, x: i32) -> Result<()> {
    store.set(keys::DEFAULT_X, x.into())
}

pub fn load_default_y<S: SettingsStore + ?Sized>(store: &S) -> i32 {
    store.get_int(keys::DEFAULT_Y, defaults::DEFAULT_Y)
}

pub fn save_default_y<S: SettingsStore + ?Sized>(store: &mut S, y: i32) -> Result<()> {
    store.set(keys::DEFAULT_Y, y.into())
}

pub fn load_default_offset<S: SettingsStore + ?Sized>(store: &S) -> i32 {
    store.get_int(keys::DEFAULT_OFFSET_Y, defaults::DEFAULT_OFFSET_Y)
}

pub fn save_default_offset<S: SettingsStore + ?Sized>(store: &mut S, offset: i32) -> Result<()> {
    store.set(keys::DEFAULT_OFFSET_Y, offset.into())
}

pub fn load_long_press_duration<S: SettingsStore + ?Sized>(store: &S) -> i32 {
    store.get_int(keys::LONG_PRESS_DURATION_MS, defaults::LONG_PRESS_DURATION_MS)
}

pub fn save_long_press_duration<S: SettingsStore + ?Sized>(store: &mut S, ms: i32) -> Result<()> {
    store.set(keys::LONG_PRESS_DURATION_MS, ms.into())
}

/// Saved X, or [`positioning::UNSET`] when no drag position is remembered
pub fn load_saved_x<S: SettingsStore + ?Sized>(store: &S) -> i32 {
    store.get_int(keys::SAVED_X, positioning::UNSET)
}

/// Saved Y, or [`positioning::UNSET`] when no drag position is remembered
pub fn load_saved_y<S: SettingsStore + ?Sized>(store: &S) -> i32 {
    store.get_int(keys::SAVED_Y, positioning::UNSET)
}

/// The remembered drag position, if both halves are present
pub fn load_saved_position<S: SettingsStore + ?Sized>(store: &S) -> Option<Position> {
    let x = load_saved_x(store);
    let y = load_saved_y(store);
    match (x == positioning::UNSET, y == positioning::UNSET) {
        (false, false) => Some(Position::new(x, y)),
        (true, true) => None,
        _ => {
            warn!(saved_x = x, saved_y = y, "Only one half of the saved position is present, ignoring it");
            None
        }
    }
}

pub fn save_position<S: SettingsStore + ?Sized>(store: &mut S, position: Position) -> Result<()> {
    debug!(x = position.x, y = position.y, "Saving overlay position");
    store.apply(&[
        SettingEdit::Set(keys::SAVED_X, position.x.into()),
        SettingEdit::Set(keys::SAVED_Y, position.y.into()),
    ])
}

pub fn clear_saved_position<S: SettingsStore + ?Sized>(store: &mut S) -> Result<()> {
    store.apply(&[
        SettingEdit::Remove(keys::SAVED_X),
        SettingEdit::Remove(keys::SAVED_Y),
    ])
}

/// Write every default back and forget the saved position, in one edit
pub fn restore_defaults<S: SettingsStore + ?Sized>(store: &mut S) -> Result<()> {
    store.apply(&[
        SettingEdit::Set(keys::ENABLED, defaults::ENABLED.into()),
        SettingEdit::Set(keys::OPACITY, defaults::OPACITY.into()),
        SettingEdit::Set(keys::HIDE_OPACITY, defaults::HIDE_OPACITY.into()),
        SettingEdit::Set(keys::MAIN_BUTTON_SIZE, defaults::MAIN_BUTTON_SIZE.into()),
        SettingEdit::Set(keys::DEFAULT_X, defaults::DEFAULT_X.into()),
        SettingEdit::Set(keys::DEFAULT_Y, defaults::DEFAULT_Y.into()),
        SettingEdit::Set(keys::DEFAULT_OFFSET_Y, defaults::DEFAULT_OFFSET_Y.into()),
        SettingEdit::Set(keys::LONG_PRESS_DURATION_MS, defaults::LONG_PRESS_DURATION_MS.into()),
        SettingEdit::Remove(keys::SAVED_X),
        SettingEdit::Remove(keys::SAVED_Y),
    ])
}

/// Keys `set_from_str` accepts; the saved position is only written by dragging
pub const EDITABLE_KEYS: [&str; 8] = [
    keys::ENABLED,
    keys::OPACITY,
    keys::HIDE_OPACITY,
    keys::MAIN_BUTTON_SIZE,
    keys::DEFAULT_X,
    keys::DEFAULT_Y,
    keys::DEFAULT_OFFSET_Y,
    keys::LONG_PRESS_DURATION_MS,
];

/// Parse `raw` as the type `key` stores and write it
pub fn set_from_str<S: SettingsStore + ?Sized>(store: &mut S, key: &str, raw: &str) -> Result<()> {
    let raw = raw.trim();
    let parse_int = || -> Result<i32> {
        raw.parse::<i32>()
            .with_context(|| format!("'{}' expects an integer, got '{}'", key, raw))
    };
    let parse_float = || -> Result<f32> {
        let value = raw
            .parse::<f32>()
            .with_context(|| format!("'{}' expects a number, got '{}'", key, raw))?;
        if !value.is_finite() {
            bail!("'{}' must be a finite number, got '{}'", key, raw);
        }
        Ok(value)
    };

    match key {
        keys::ENABLED => {
            let enabled = raw
                .parse::<bool>()
                .with_context(|| format!("'{}' expects true or false, got '{}'", key, raw))?;
            set_enabled(store, enabled)
        }
        keys::OPACITY => save_opacity(store, parse_float()?),
        keys::HIDE_OPACITY => save_hide_opacity(store, parse_float()?),
        keys::MAIN_BUTTON_SIZE => save_main_button_size(store, parse_int()?),
        keys::DEFAULT_X => save_default_x(store, parse_int()?),
        keys::DEFAULT_Y => save_default_y(store, parse_int()?),
        keys::DEFAULT_OFFSET_Y => save_default_offset(store, parse_int()?),
        keys::LONG_PRESS_DURATION_MS => save_long_press_duration(store, parse_int()?),
        keys::SAVED_X | keys::SAVED_Y => {
            bail!("'{}' is written by dragging the overlay; use reset-position to clear it", key)
        }
        _ => bail!("Unknown setting '{}'; known settings: {}", key, EDITABLE_KEYS.join(", ")),
    }
}
