//! Persistent overlay settings and the derived visual style

use tracing::{info, warn};

use super::prefs;
use super::store::SettingsStore;
use crate::constants::{defaults, positioning};
use crate::session_state::SessionState;
use crate::types::OverlayStyle;

/// Everything the settings UI controls, read in one pass
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySettings {
    pub enabled: bool,
    pub opacity: f32,
    pub hide_opacity: f32,
    pub main_button_size: i32,
    pub default_x: i32,
    pub default_y: i32,
    pub default_offset_y: i32,
    pub long_press_duration_ms: i32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            enabled: defaults::ENABLED,
            opacity: defaults::OPACITY,
            hide_opacity: defaults::HIDE_OPACITY,
            main_button_size: defaults::MAIN_BUTTON_SIZE,
            default_x: defaults::DEFAULT_X,
            default_y: defaults::DEFAULT_Y,
            default_offset_y: defaults::DEFAULT_OFFSET_Y,
            long_press_duration_ms: defaults::LONG_PRESS_DURATION_MS,
        }
    }
}

impl OverlaySettings {
    /// Read every key (defaults for missing ones) and clamp to usable ranges
    pub fn load<S: SettingsStore + ?Sized>(store: &S) -> Self {
        let mut settings = Self {
            enabled: prefs::is_enabled(store),
            opacity: prefs::load_opacity(store),
            hide_opacity: prefs::load_hide_opacity(store),
            main_button_size: prefs::load_main_button_size(store),
            default_x: prefs::load_default_x(store),
            default_y: prefs::load_default_y(store),
            default_offset_y: prefs::load_default_offset(store),
            long_press_duration_ms: prefs::load_long_press_duration(store),
        };
        settings.validate_and_clamp();
        info!(settings = ?settings, "Loaded overlay settings");
        settings
    }

    /// Validate and clamp values to safe ranges
    /// Bad values never fail loading, they are pulled back into range with a warning.
    fn validate_and_clamp(&mut self) {
        use crate::constants::validation::*;

        self.opacity = clamp_opacity("opacity", self.opacity, defaults::OPACITY);
        self.hide_opacity = clamp_opacity("hide_opacity", self.hide_opacity, defaults::HIDE_OPACITY);

        if self.main_button_size < MIN_BUTTON_SIZE {
            warn!(main_button_size = self.main_button_size, min = MIN_BUTTON_SIZE, "main_button_size below minimum, clamping");
            self.main_button_size = MIN_BUTTON_SIZE;
        } else if self.main_button_size > MAX_BUTTON_SIZE {
            warn!(main_button_size = self.main_button_size, max = MAX_BUTTON_SIZE, "main_button_size exceeds maximum, clamping");
            self.main_button_size = MAX_BUTTON_SIZE;
        }

        if self.long_press_duration_ms < MIN_LONG_PRESS_MS {
            warn!(long_press_duration_ms = self.long_press_duration_ms, min = MIN_LONG_PRESS_MS, "long_press_duration_ms below minimum, clamping");
            self.long_press_duration_ms = MIN_LONG_PRESS_MS;
        } else if self.long_press_duration_ms > MAX_LONG_PRESS_MS {
            warn!(long_press_duration_ms = self.long_press_duration_ms, max = MAX_LONG_PRESS_MS, "long_press_duration_ms exceeds maximum, clamping");
            self.long_press_duration_ms = MAX_LONG_PRESS_MS;
        }
    }

    /// Resolve the visual style; the session's temporary fade picks the hide opacity
    pub fn style(&self, session: &SessionState) -> OverlayStyle {
        OverlayStyle {
            opacity: if session.temp_fade_enabled {
                self.hide_opacity
            } else {
                self.opacity
            },
            main_size: self.main_button_size,
            small_size: self.main_button_size / positioning::SMALL_BUTTON_DIVISOR,
        }
    }

    pub fn long_press_duration_ms(&self) -> u64 {
        self.long_press_duration_ms.max(0) as u64
    }
}

fn clamp_opacity(name: &str, value: f32, default: f32) -> f32 {
    use crate::constants::validation::{MAX_OPACITY, MIN_OPACITY};

    if value.is_nan() {
        warn!(setting = %name, default = default, "Opacity is not a number, using default");
        default
    } else if !(MIN_OPACITY..=MAX_OPACITY).contains(&value) {
        let clamped = value.clamp(MIN_OPACITY, MAX_OPACITY);
        warn!(setting = %name, value = value, clamped = clamped, "Opacity out of range, clamping");
        clamped
    } else {
        value
    }
}
