//! Shared value types

/// Overlay position in screen pixels (top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Visible screen rectangle, anchored at the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl ScreenSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Visual properties derived from settings and session state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Resolved window opacity (0.0 - 1.0)
    pub opacity: f32,
    /// Page up/down button edge length
    pub main_size: i32,
    /// Fade toggle and close control edge length
    pub small_size: i32,
}

/// One visual update handed to the overlay host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFrame {
    pub style: OverlayStyle,
    pub geometry: Position,
}
