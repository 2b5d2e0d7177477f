//! The floating page-turner controller
//!
//! `FloatPager` owns the overlay's configuration, geometry and timers and talks
//! to the outside world through three seams: an [`OverlayHost`] that owns the
//! actual surface, a [`SettingsStore`] for durable settings, and
//! [`PagerCallbacks`] for the page-up / page-down / close-tab actions.
//!
//! Everything runs on the caller's thread. Deferred work (redraw flushes and
//! the long-press fire) only happens inside [`FloatPager::advance_to`] and
//! friends, never inside the event handler that scheduled it.

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::coalesce::Coalescer;
use crate::config::{prefs, OverlaySettings, SettingsStore};
use crate::geometry::{clamp_to_screen, default_position};
use crate::gesture::{GestureController, GestureOutcome, PointerEvent};
use crate::layout::Control;
use crate::long_press::LongPressTimer;
use crate::session_state::SessionState;
use crate::timer::{TimerId, TimerQueue};
use crate::types::{OverlayFrame, OverlayStyle, Position, ScreenSize};

/// The service that actually puts the overlay on screen
pub trait OverlayHost {
    fn screen_size(&self) -> ScreenSize;

    fn attach(&mut self, frame: &OverlayFrame) -> Result<()>;

    fn update_geometry(&mut self, frame: &OverlayFrame) -> Result<()>;

    /// Errors when nothing is attached
    fn detach(&mut self) -> Result<()>;
}

/// Host actions triggered by gestures, invoked synchronously
pub struct PagerCallbacks {
    on_page_up: Box<dyn FnMut()>,
    on_page_down: Box<dyn FnMut()>,
    on_close_tab: Box<dyn FnMut()>,
}

impl PagerCallbacks {
    pub fn new(
        on_page_up: impl FnMut() + 'static,
        on_page_down: impl FnMut() + 'static,
        on_close_tab: impl FnMut() + 'static,
    ) -> Self {
        Self {
            on_page_up: Box::new(on_page_up),
            on_page_down: Box::new(on_page_down),
            on_close_tab: Box::new(on_close_tab),
        }
    }

    pub fn page_up(&mut self) {
        (self.on_page_up)()
    }

    pub fn page_down(&mut self) {
        (self.on_page_down)()
    }

    pub fn close_tab(&mut self) {
        (self.on_close_tab)()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    Hidden,
    Shown,
}

/// Work parked on the timer queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    Redraw,
    CloseTab,
}

pub struct FloatPager<H: OverlayHost, S: SettingsStore> {
    host: H,
    store: S,
    callbacks: PagerCallbacks,

    settings: OverlaySettings,
    session: SessionState,
    phase: OverlayPhase,
    geometry: Option<Position>,
    style: OverlayStyle,

    gesture: GestureController,
    long_press: LongPressTimer,
    redraw: Coalescer<OverlayFrame>,
    timers: TimerQueue<Deferred>,
}

impl<H: OverlayHost, S: SettingsStore> FloatPager<H, S> {
    pub fn new(host: H, store: S, callbacks: PagerCallbacks) -> Self {
        let settings = OverlaySettings::default();
        let session = SessionState::new();
        let style = settings.style(&session);
        Self {
            host,
            store,
            callbacks,
            settings,
            session,
            phase: OverlayPhase::Hidden,
            geometry: None,
            style,
            gesture: GestureController::new(),
            long_press: LongPressTimer::new(),
            redraw: Coalescer::new(),
            timers: TimerQueue::new(),
        }
    }

    // === Lifecycle ===

    /// Load settings and attach the overlay; no-op when disabled or already shown
    pub fn show(&mut self) {
        if self.phase == OverlayPhase::Shown {
            debug!("Overlay already shown");
            return;
        }

        self.settings = OverlaySettings::load(&self.store);
        if !self.settings.enabled {
            info!("Overlay disabled in settings, not showing");
            return;
        }

        let screen = self.host.screen_size();
        let geometry = clamp_to_screen(self.initial_position(screen), screen);
        let style = self.settings.style(&self.session);
        let frame = OverlayFrame { style, geometry };

        match self.host.attach(&frame) {
            Ok(()) => {
                self.phase = OverlayPhase::Shown;
                self.geometry = Some(geometry);
                self.style = style;
                info!(x = geometry.x, y = geometry.y, opacity = style.opacity, "Overlay shown");
            }
            Err(e) => {
                error!(error = ?e, "Failed to attach overlay, staying hidden");
            }
        }
    }

    /// Detach the overlay; best effort and idempotent
    pub fn remove(&mut self) {
        self.long_press.cancel(&mut self.timers);
        self.redraw.cancel(&mut self.timers);
        self.gesture.reset();

        if self.phase == OverlayPhase::Hidden {
            debug!("Overlay already hidden");
            return;
        }

        if let Err(e) = self.host.detach() {
            warn!(error = ?e, "Failed to detach overlay, ignoring");
        }
        self.phase = OverlayPhase::Hidden;
        self.geometry = None;
        info!("Overlay removed");
    }

    /// Forget the dragged position and return to the default one with fresh settings
    pub fn refresh(&mut self) {
        if let Err(e) = prefs::clear_saved_position(&mut self.store) {
            error!(error = ?e, "Failed to clear saved position");
        }
        self.settings = OverlaySettings::load(&self.store);

        if self.phase == OverlayPhase::Hidden {
            return;
        }
        if !self.settings.enabled {
            info!("Overlay disabled in settings, removing");
            self.remove();
            return;
        }

        let screen = self.host.screen_size();
        let geometry = clamp_to_screen(default_position(&self.settings, screen), screen);
        self.geometry = Some(geometry);
        self.style = self.settings.style(&self.session);
        info!(x = geometry.x, y = geometry.y, "Overlay reset to default position");
        self.submit_frame();
    }

    /// Re-read visual settings (opacity, sizes) without moving the overlay
    pub fn apply_settings(&mut self) {
        self.settings = OverlaySettings::load(&self.store);

        if self.phase == OverlayPhase::Hidden {
            return;
        }
        if !self.settings.enabled {
            info!("Overlay disabled in settings, removing");
            self.remove();
            return;
        }

        self.style = self.settings.style(&self.session);
        self.submit_frame();
    }

    /// Flip the temporary fade; session only, never stored
    pub fn toggle_fade(&mut self) {
        self.session.toggle_fade();
        self.style = self.settings.style(&self.session);
        self.submit_frame();
    }

    // === Input ===

    /// Route a pointer event that started on `control`
    pub fn handle_pointer(&mut self, control: Control, event: PointerEvent) {
        let Some(geometry) = self.geometry.filter(|_| self.phase == OverlayPhase::Shown) else {
            debug!(event = ?event, "Pointer event while hidden, ignoring");
            return;
        };

        if control == Control::Center {
            match event {
                PointerEvent::Down { .. } => {
                    let duration_ms = self.settings.long_press_duration_ms();
                    self.long_press.arm(&mut self.timers, duration_ms, Deferred::CloseTab);
                }
                PointerEvent::Up { .. } | PointerEvent::Cancel => {
                    self.long_press.cancel(&mut self.timers);
                }
                PointerEvent::Move { .. } => {}
            }
            return;
        }

        let screen = self.host.screen_size();
        match self.gesture.handle(event, geometry, screen) {
            GestureOutcome::Moved(position) => {
                self.geometry = Some(position);
                self.submit_frame();
            }
            GestureOutcome::DragEnd(position) => {
                self.geometry = Some(position);
                match prefs::save_position(&mut self.store, position) {
                    Ok(()) => info!(x = position.x, y = position.y, "Saved overlay position after drag"),
                    Err(e) => error!(error = ?e, "Failed to save overlay position"),
                }
            }
            GestureOutcome::Tap => self.tap(control),
            GestureOutcome::None | GestureOutcome::Cancelled => {}
        }
    }

    fn tap(&mut self, control: Control) {
        debug!(control = ?control, "Tap");
        match control {
            Control::PageUp => self.callbacks.page_up(),
            Control::PageDown => self.callbacks.page_down(),
            Control::Fade => self.toggle_fade(),
            Control::Body | Control::Center => {}
        }
    }

    // === Time ===

    /// Run everything due up to logical time `now_ms`, in deadline order
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some((id, task)) = self.timers.pop_due(now_ms) {
            self.dispatch(id, task);
        }
        self.timers.set_now(now_ms);
    }

    pub fn advance_by(&mut self, elapsed_ms: u64) {
        let now = self.timers.now_ms().saturating_add(elapsed_ms);
        self.advance_to(now);
    }

    /// Run work scheduled for the current tick (redraw flushes)
    pub fn run_pending(&mut self) {
        self.advance_by(0);
    }

    /// Milliseconds until the next deferred task, if any
    pub fn next_deadline_in(&self) -> Option<u64> {
        self.timers
            .next_deadline()
            .map(|due| due.saturating_sub(self.timers.now_ms()))
    }

    fn dispatch(&mut self, id: TimerId, task: Deferred) {
        match task {
            Deferred::Redraw => {
                let Some(frame) = self.redraw.flush(id) else {
                    return;
                };
                if self.phase != OverlayPhase::Shown {
                    return;
                }
                if let Err(e) = self.host.update_geometry(&frame) {
                    warn!(error = ?e, "Failed to update overlay");
                }
            }
            Deferred::CloseTab => {
                if self.long_press.fire(id) {
                    info!("Long press completed, closing tab");
                    self.callbacks.close_tab();
                }
            }
        }
    }

    fn submit_frame(&mut self) {
        let Some(geometry) = self.geometry.filter(|_| self.phase == OverlayPhase::Shown) else {
            return;
        };
        let frame = OverlayFrame {
            style: self.style,
            geometry,
        };
        self.redraw.submit(&mut self.timers, frame, Deferred::Redraw);
    }

    fn initial_position(&self, screen: ScreenSize) -> Position {
        match prefs::load_saved_position(&self.store) {
            Some(saved) => {
                debug!(x = saved.x, y = saved.y, "Using saved overlay position");
                saved
            }
            None => default_position(&self.settings, screen),
        }
    }

    // === Accessors ===

    pub fn is_shown(&self) -> bool {
        self.phase == OverlayPhase::Shown
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
impl<H: OverlayHost, S: SettingsStore> FloatPager<H, S> {
    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn geometry(&self) -> Option<Position> {
        self.geometry
    }

    pub fn temp_fade_enabled(&self) -> bool {
        self.session.temp_fade_enabled
    }

    pub fn gesture_state(&self) -> crate::gesture::GestureState {
        self.gesture.state()
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
