//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Settings store keys
pub mod keys {
    pub const ENABLED: &str = "enabled";
    pub const OPACITY: &str = "opacity";
    pub const HIDE_OPACITY: &str = "hideOpacity";
    pub const MAIN_BUTTON_SIZE: &str = "mainButtonSize";
    pub const DEFAULT_X: &str = "defaultX";
    pub const DEFAULT_Y: &str = "defaultY";
    pub const DEFAULT_OFFSET_Y: &str = "defaultOffsetY";
    pub const LONG_PRESS_DURATION_MS: &str = "longPressDurationMs";

    /// Position remembered after a completed drag (written and removed as a pair)
    pub const SAVED_X: &str = "savedX";
    pub const SAVED_Y: &str = "savedY";
}

/// Values used when a key is missing from the store
pub mod defaults {
    pub const ENABLED: bool = true;
    pub const OPACITY: f32 = 0.4;
    pub const HIDE_OPACITY: f32 = 0.1;
    pub const MAIN_BUTTON_SIZE: i32 = 48;
    pub const DEFAULT_X: i32 = super::positioning::UNSET;
    pub const DEFAULT_Y: i32 = super::positioning::UNSET;
    pub const DEFAULT_OFFSET_Y: i32 = -120;
    pub const LONG_PRESS_DURATION_MS: i32 = 600;
}

/// Ranges that loaded settings are clamped into
pub mod validation {
    pub const MIN_OPACITY: f32 = 0.0;
    pub const MAX_OPACITY: f32 = 1.0;

    /// Button size in pixels
    pub const MIN_BUTTON_SIZE: i32 = 16;
    pub const MAX_BUTTON_SIZE: i32 = 96;

    /// Long-press duration in milliseconds
    pub const MIN_LONG_PRESS_MS: i32 = 10;
    pub const MAX_LONG_PRESS_MS: i32 = 1500;
}

/// Default overlay positioning
pub mod positioning {
    /// Sentinel for "no explicit coordinate configured"
    pub const UNSET: i32 = -1;

    /// Default anchor as a fraction of screen width/height
    pub const DEFAULT_SCREEN_FRACTION: f64 = 0.8;

    /// Secondary controls are this many times smaller than the main buttons
    pub const SMALL_BUTTON_DIVISOR: i32 = 3;
}

/// Pointer gesture constants
pub mod gesture {
    /// Squared per-event displacement (px²) above which a press becomes a drag
    pub const DRAG_THRESHOLD_SQUARED: f32 = 16.0;
}

/// X11 protocol and rendering constants
pub mod x11 {
    /// Override redirect flag for unmanaged windows
    pub const OVERRIDE_REDIRECT: u32 = 1;

    /// WM_CLASS value (instance and class, NUL separated)
    pub const WM_CLASS: &[u8] = b"float-pager\0float-pager\0";

    /// Overlay background (0xRRGGBB)
    pub const BACKGROUND_PIXEL: u32 = 0x202020;

    /// Main page buttons
    pub const PAGE_BUTTON_PIXEL: u32 = 0x5a5a5a;

    /// Fade toggle
    pub const FADE_BUTTON_PIXEL: u32 = 0x3b6ea5;

    /// Long-press close control
    pub const CLOSE_BUTTON_PIXEL: u32 = 0xb03a2e;

    /// Inset between a control's hit area and its painted face
    pub const BUTTON_PADDING: i16 = 4;
}

/// Mouse button constants
pub mod mouse {
    /// Left mouse button number
    pub const BUTTON_LEFT: u8 = 1;
}

/// X keysyms injected for the pager actions
pub mod keysym {
    pub const PRIOR: u32 = 0xff55;
    pub const NEXT: u32 = 0xff56;
    pub const CONTROL_L: u32 = 0xffe3;
    pub const LOWER_W: u32 = 0x0077;
}

/// Daemon loop timing
pub mod daemon {
    /// Sleep between polls when no timer is due sooner
    pub const POLL_INTERVAL_MS: u64 = 8;

    /// How often the settings file is checked for external edits
    pub const SETTINGS_CHECK_INTERVAL_MS: u64 = 500;
}

/// Configuration file location
pub mod config {
    /// Application directory under the user's config dir
    pub const APP_DIR: &str = "float-pager";

    /// Settings file name
    pub const FILENAME: &str = "settings.json";
}
