//! Pointer gesture state machine
//!
//! | state          | Down           | Move (d² > 16)       | Move (d² ≤ 16) | Up             | Cancel |
//! |----------------|----------------|----------------------|----------------|----------------|--------|
//! | Idle           | PotentialDrag  | ignored              | ignored        | ignored        | Idle   |
//! | PotentialDrag  | PotentialDrag  | Dragging (+ move)    | PotentialDrag  | Idle, tap      | Idle   |
//! | Dragging       | PotentialDrag  | Dragging (+ move)    | Dragging (+ move) | Idle, drag end | Idle |
//!
//! The threshold is checked on the displacement since the previous event.

use tracing::{debug, trace};

use crate::constants::gesture::DRAG_THRESHOLD_SQUARED;
use crate::geometry::clamp_to_screen;
use crate::types::{Position, ScreenSize};

/// Raw pointer input in absolute screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    PotentialDrag,
    Dragging,
}

/// What a single event meant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Nothing for the caller to do
    None,
    /// The overlay should move here (already clamped)
    Moved(Position),
    /// Released without dragging
    Tap,
    /// Released after dragging; the final position should be remembered
    DragEnd(Position),
    /// Gesture abandoned
    Cancelled,
}

#[derive(Debug, Default)]
pub struct GestureController {
    state: GestureState,
    last_x: f32,
    last_y: f32,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Forget any gesture in progress
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Feed one event; `geometry` is the overlay's current position
    pub fn handle(&mut self, event: PointerEvent, geometry: Position, screen: ScreenSize) -> GestureOutcome {
        match event {
            PointerEvent::Down { x, y } => {
                self.last_x = x;
                self.last_y = y;
                self.state = GestureState::PotentialDrag;
                GestureOutcome::None
            }
            PointerEvent::Move { x, y } => {
                if self.state == GestureState::Idle {
                    return GestureOutcome::None;
                }

                let dx = x - self.last_x;
                let dy = y - self.last_y;
                self.last_x = x;
                self.last_y = y;

                if self.state == GestureState::PotentialDrag && dx * dx + dy * dy > DRAG_THRESHOLD_SQUARED {
                    debug!(dx = dx, dy = dy, "Drag started");
                    self.state = GestureState::Dragging;
                }

                if self.state != GestureState::Dragging {
                    return GestureOutcome::None;
                }

                // Truncate toward zero, matching how the overlay host takes integer positions
                let moved = Position::new(
                    geometry.x.saturating_add(dx as i32),
                    geometry.y.saturating_add(dy as i32),
                );
                let clamped = clamp_to_screen(moved, screen);
                trace!(x = clamped.x, y = clamped.y, "Drag move");
                GestureOutcome::Moved(clamped)
            }
            PointerEvent::Up { .. } => {
                let previous = std::mem::take(&mut self.state);
                match previous {
                    GestureState::Dragging => GestureOutcome::DragEnd(clamp_to_screen(geometry, screen)),
                    GestureState::PotentialDrag => GestureOutcome::Tap,
                    GestureState::Idle => GestureOutcome::None,
                }
            }
            PointerEvent::Cancel => {
                let previous = std::mem::take(&mut self.state);
                if previous == GestureState::Idle {
                    GestureOutcome::None
                } else {
                    GestureOutcome::Cancelled
                }
            }
        }
    }
}
