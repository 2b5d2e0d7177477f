use anyhow::Result;
use tracing::trace;
use x11rb::protocol::xproto::NotifyMode;
use x11rb::protocol::Event;

use crate::config::SettingsStore;
use crate::constants::mouse;
use crate::gesture::PointerEvent;
use crate::layout::Control;
use crate::pager::FloatPager;

use super::window::X11OverlayHost;

/// Which control owns the pointer between press and release
#[derive(Debug, Default)]
pub struct InputState {
    pressed: Option<Control>,
}

impl InputState {
    pub fn press(&mut self, control: Control, root_x: i16, root_y: i16) -> (Control, PointerEvent) {
        self.pressed = Some(control);
        (control, PointerEvent::Down { x: root_x as f32, y: root_y as f32 })
    }

    pub fn motion(&self, root_x: i16, root_y: i16) -> Option<(Control, PointerEvent)> {
        self.pressed
            .map(|control| (control, PointerEvent::Move { x: root_x as f32, y: root_y as f32 }))
    }

    pub fn release(&mut self, root_x: i16, root_y: i16) -> Option<(Control, PointerEvent)> {
        self.pressed
            .take()
            .map(|control| (control, PointerEvent::Up { x: root_x as f32, y: root_y as f32 }))
    }

    pub fn cancel(&mut self) -> Option<(Control, PointerEvent)> {
        self.pressed.take().map(|control| (control, PointerEvent::Cancel))
    }
}

pub fn handle_event<S: SettingsStore>(
    pager: &mut FloatPager<X11OverlayHost<'_>, S>,
    input: &mut InputState,
    event: Event,
) -> Result<()> {
    let Some(window) = pager.host().window() else {
        // Overlay went away mid-gesture; drop whatever was in flight
        if let Some((control, cancel)) = input.cancel() {
            pager.handle_pointer(control, cancel);
        }
        return Ok(());
    };

    let translated = match event {
        Event::ButtonPress(event) if event.event == window && event.detail == mouse::BUTTON_LEFT => {
            pager
                .host()
                .hit_test(event.event_x, event.event_y)
                .map(|control| input.press(control, event.root_x, event.root_y))
        }
        Event::MotionNotify(event) if event.event == window => input.motion(event.root_x, event.root_y),
        Event::ButtonRelease(event) if event.event == window && event.detail == mouse::BUTTON_LEFT => {
            input.release(event.root_x, event.root_y)
        }
        // Grab taken away before the button came up
        Event::LeaveNotify(event) if event.event == window && event.mode == NotifyMode::UNGRAB => input.cancel(),
        Event::Expose(event) if event.window == window && event.count == 0 => {
            pager.host().redraw()?;
            None
        }
        _ => None,
    };

    if let Some((control, pointer)) = translated {
        trace!(control = ?control, event = ?pointer, "Pointer event");
        pager.handle_pointer(control, pointer);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_motion_release_sequence() {
        let mut input = InputState::default();
        assert_eq!(
            input.press(Control::PageUp, 10, 20),
            (Control::PageUp, PointerEvent::Down { x: 10.0, y: 20.0 })
        );
        assert_eq!(
            input.motion(15, 25),
            Some((Control::PageUp, PointerEvent::Move { x: 15.0, y: 25.0 }))
        );
        assert_eq!(
            input.release(15, 25),
            Some((Control::PageUp, PointerEvent::Up { x: 15.0, y: 25.0 }))
        );
        assert_eq!(input.motion(30, 30), None);
    }

    #[test]
    fn test_motion_without_press_is_ignored() {
        let input = InputState::default();
        assert_eq!(input.motion(1, 1), None);
    }

    #[test]
    fn test_release_stays_with_pressed_control() {
        let mut input = InputState::default();
        input.press(Control::Center, 0, 0);
        // Pointer left the centre control before releasing
        let (control, _) = input.release(300, 300).unwrap();
        assert_eq!(control, Control::Center);
    }

    #[test]
    fn test_cancel_clears_press() {
        let mut input = InputState::default();
        input.press(Control::Body, 0, 0);
        assert_eq!(input.cancel(), Some((Control::Body, PointerEvent::Cancel)));
        assert_eq!(input.cancel(), None);
        assert_eq!(input.release(0, 0), None);
    }
}
