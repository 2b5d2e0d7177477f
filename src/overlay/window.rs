//! The overlay's X11 window

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::wrapper::ConnectionExt as WrapperExt;

use crate::constants::x11;
use crate::layout::{Control, OverlayLayout, Rect};
use crate::pager::OverlayHost;
use crate::types::{OverlayFrame, ScreenSize};
use crate::x11_utils::{set_window_opacity, to_i16, to_u16_len, AppContext};

/// A live overlay surface and its drawing resources
struct OverlayWindow {
    window: Window,
    gc: Gcontext,
    layout: OverlayLayout,
}

/// [`OverlayHost`] backed by an override-redirect X11 window
pub struct X11OverlayHost<'a> {
    ctx: AppContext<'a>,
    surface: Option<OverlayWindow>,
}

impl<'a> X11OverlayHost<'a> {
    pub fn new(ctx: AppContext<'a>) -> Self {
        Self { ctx, surface: None }
    }

    pub fn window(&self) -> Option<Window> {
        self.surface.as_ref().map(|s| s.window)
    }

    /// Control under a window-local point
    pub fn hit_test(&self, x: i16, y: i16) -> Option<Control> {
        self.surface
            .as_ref()
            .and_then(|s| s.layout.hit_test(x as i32, y as i32))
    }

    /// Repaint after an Expose
    pub fn redraw(&self) -> Result<()> {
        match &self.surface {
            Some(surface) => self.paint(surface),
            None => Ok(()),
        }
    }

    fn create_window(&self, frame: &OverlayFrame, layout: &OverlayLayout) -> Result<Window> {
        let conn = self.ctx.conn;
        let screen = self.ctx.screen;
        let window = conn.generate_id()
            .context("Failed to generate X11 window ID")?;
        conn.create_window(
            screen.root_depth,
            window,
            screen.root,
            to_i16(frame.geometry.x),
            to_i16(frame.geometry.y),
            to_u16_len(layout.width),
            to_u16_len(layout.height),
            0,
            WindowClass::INPUT_OUTPUT,
            screen.root_visual,
            &CreateWindowAux::new()
                .override_redirect(x11::OVERRIDE_REDIRECT)
                .background_pixel(x11::BACKGROUND_PIXEL)
                .event_mask(
                    EventMask::EXPOSURE
                    | EventMask::BUTTON_PRESS
                    | EventMask::BUTTON_RELEASE
                    | EventMask::BUTTON_MOTION
                    | EventMask::LEAVE_WINDOW,
                ),
        )
        .context("Failed to create overlay window")?;
        Ok(window)
    }

    /// Opacity, WM_CLASS and always-on-top, then map
    fn setup_window_properties(&self, window: Window, opacity: f32) -> Result<()> {
        let conn = self.ctx.conn;
        let atoms = self.ctx.atoms;

        set_window_opacity(&self.ctx, window, opacity)?;

        conn.change_property8(
            PropMode::REPLACE,
            window,
            atoms.wm_class,
            AtomEnum::STRING,
            x11::WM_CLASS,
        )
        .context("Failed to set WM_CLASS on overlay window")?;

        conn.change_property32(
            PropMode::REPLACE,
            window,
            atoms.net_wm_state,
            AtomEnum::ATOM,
            &[atoms.net_wm_state_above],
        )
        .context("Failed to set overlay window always-on-top")?;

        conn.map_window(window)
            .inspect_err(|e| error!(window = window, error = ?e, "Failed to map overlay window"))
            .context("Failed to map overlay window")?;
        debug!(window = window, "Mapped overlay window");
        Ok(())
    }

    fn paint(&self, surface: &OverlayWindow) -> Result<()> {
        let conn = self.ctx.conn;
        let layout = &surface.layout;

        let background = Rect { x: 0, y: 0, width: layout.width, height: layout.height };
        self.fill(surface, background, x11::BACKGROUND_PIXEL, 0)?;

        for (control, rect) in layout.controls() {
            let (pixel, padding) = match control {
                Control::Fade => (x11::FADE_BUTTON_PIXEL, 0),
                Control::Center => (x11::CLOSE_BUTTON_PIXEL, 0),
                Control::PageUp | Control::PageDown => (x11::PAGE_BUTTON_PIXEL, x11::BUTTON_PADDING),
                Control::Body => continue,
            };
            self.fill(surface, *rect, pixel, padding)?;
        }

        conn.flush()
            .context("Failed to flush X11 connection after painting overlay")?;
        Ok(())
    }

    fn fill(&self, surface: &OverlayWindow, rect: Rect, pixel: u32, padding: i16) -> Result<()> {
        let conn = self.ctx.conn;
        conn.change_gc(surface.gc, &ChangeGCAux::new().foreground(pixel))
            .context("Failed to set overlay fill colour")?;
        let inset = padding as i32;
        let rectangle = Rectangle {
            x: to_i16(rect.x + inset),
            y: to_i16(rect.y + inset),
            width: to_u16_len(rect.width - 2 * inset),
            height: to_u16_len(rect.height - 2 * inset),
        };
        conn.poly_fill_rectangle(surface.window, surface.gc, &[rectangle])
            .context("Failed to fill overlay rectangle")?;
        Ok(())
    }

    fn destroy(&self, surface: &OverlayWindow) -> Result<()> {
        let conn = self.ctx.conn;
        conn.free_gc(surface.gc)
            .context(format!("Failed to free GC for overlay window {}", surface.window))?;
        conn.destroy_window(surface.window)
            .context(format!("Failed to destroy overlay window {}", surface.window))?;
        conn.flush()
            .context("Failed to flush X11 connection after destroying overlay")?;
        Ok(())
    }
}

impl OverlayHost for X11OverlayHost<'_> {
    fn screen_size(&self) -> ScreenSize {
        self.ctx.screen_size()
    }

    fn attach(&mut self, frame: &OverlayFrame) -> Result<()> {
        if let Some(surface) = &self.surface {
            anyhow::bail!("Overlay window {} is already attached", surface.window);
        }

        let conn = self.ctx.conn;
        let layout = OverlayLayout::new(&frame.style);
        let window = self.create_window(frame, &layout)?;

        // Destroys the window if a later step fails
        struct WindowGuard<'c> {
            conn: &'c x11rb::rust_connection::RustConnection,
            window: Window,
            should_cleanup: bool,
        }

        impl Drop for WindowGuard<'_> {
            fn drop(&mut self) {
                if self.should_cleanup {
                    if let Err(e) = self.conn.destroy_window(self.window) {
                        error!(window = self.window, error = %e, "Failed to clean up overlay window after attach failure");
                    }
                    let _ = self.conn.flush();
                }
            }
        }

        let mut guard = WindowGuard { conn, window, should_cleanup: true };

        self.setup_window_properties(window, frame.style.opacity)?;

        let gc = conn.generate_id()
            .context("Failed to generate ID for overlay GC")?;
        conn.create_gc(gc, window, &CreateGCAux::new().foreground(x11::BACKGROUND_PIXEL))
            .context("Failed to create overlay GC")?;

        let surface = OverlayWindow { window, gc, layout };
        self.paint(&surface)?;

        guard.should_cleanup = false;
        info!(
            window = window,
            x = frame.geometry.x,
            y = frame.geometry.y,
            width = surface.layout.width,
            height = surface.layout.height,
            "Overlay window attached"
        );
        self.surface = Some(surface);
        Ok(())
    }

    fn update_geometry(&mut self, frame: &OverlayFrame) -> Result<()> {
        let Some(surface) = &self.surface else {
            anyhow::bail!("No overlay window attached");
        };
        let window = surface.window;
        let layout = OverlayLayout::new(&frame.style);
        let resized = layout != surface.layout;

        self.ctx.conn.configure_window(
            window,
            &ConfigureWindowAux::new()
                .x(frame.geometry.x)
                .y(frame.geometry.y)
                .width(to_u16_len(layout.width) as u32)
                .height(to_u16_len(layout.height) as u32),
        )
        .context(format!("Failed to reconfigure overlay window {}", window))?;
        set_window_opacity(&self.ctx, window, frame.style.opacity)?;

        if let Some(surface) = self.surface.as_mut() {
            surface.layout = layout;
        }
        if let Some(surface) = &self.surface {
            if resized {
                debug!(window = window, "Overlay resized, repainting");
            }
            self.paint(surface)?;
        }
        Ok(())
    }

    fn detach(&mut self) -> Result<()> {
        let surface = self.surface.take()
            .ok_or_else(|| anyhow::anyhow!("No overlay window attached"))?;
        self.destroy(&surface)?;
        info!(window = surface.window, "Overlay window detached");
        Ok(())
    }
}

impl Drop for X11OverlayHost<'_> {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.take() {
            if let Err(e) = self.destroy(&surface) {
                error!(window = surface.window, error = ?e, "Failed to destroy overlay window on drop");
            }
        }
    }
}
