use anyhow::{Context, Result};
use tracing::{debug, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::protocol::xtest::ConnectionExt as XTestExt;
use x11rb::wrapper::ConnectionExt as WrapperExt;
use x11rb::rust_connection::RustConnection;

use crate::constants::keysym;
use crate::types::ScreenSize;

/// Application context holding immutable shared state
#[derive(Clone, Copy)]
pub struct AppContext<'a> {
    pub conn: &'a RustConnection,
    pub screen: &'a Screen,
    pub atoms: &'a CachedAtoms,
}

impl AppContext<'_> {
    pub fn screen_size(&self) -> ScreenSize {
        ScreenSize::new(
            self.screen.width_in_pixels as i32,
            self.screen.height_in_pixels as i32,
        )
    }
}

/// Pre-cached X11 atoms to avoid repeated roundtrips
pub struct CachedAtoms {
    pub net_wm_window_opacity: Atom,
    pub wm_class: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_above: Atom,
}

impl CachedAtoms {
    pub fn new(conn: &RustConnection) -> Result<Self> {
        Ok(Self {
            net_wm_window_opacity: intern(conn, b"_NET_WM_WINDOW_OPACITY")?,
            wm_class: intern(conn, b"WM_CLASS")?,
            net_wm_state: intern(conn, b"_NET_WM_STATE")?,
            net_wm_state_above: intern(conn, b"_NET_WM_STATE_ABOVE")?,
        })
    }
}

fn intern(conn: &RustConnection, name: &[u8]) -> Result<Atom> {
    let display = String::from_utf8_lossy(name);
    Ok(conn
        .intern_atom(false, name)
        .context(format!("Failed to intern {} atom", display))?
        .reply()
        .context(format!("Failed to get reply for {} atom", display))?
        .atom)
}

/// `_NET_WM_WINDOW_OPACITY` value for an opacity in [0, 1]
pub fn opacity_to_cardinal(opacity: f32) -> u32 {
    if opacity.is_nan() {
        return u32::MAX;
    }
    (opacity.clamp(0.0, 1.0) as f64 * u32::MAX as f64) as u32
}

pub fn set_window_opacity(ctx: &AppContext, window: Window, opacity: f32) -> Result<()> {
    ctx.conn
        .change_property32(
            PropMode::REPLACE,
            window,
            ctx.atoms.net_wm_window_opacity,
            AtomEnum::CARDINAL,
            &[opacity_to_cardinal(opacity)],
        )
        .context(format!("Failed to set opacity on window {}", window))?;
    Ok(())
}

/// Saturate an i32 coordinate into the i16 range X11 uses on the wire
pub fn to_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Saturate a length into 1..=u16::MAX
pub fn to_u16_len(v: i32) -> u16 {
    v.clamp(1, u16::MAX as i32) as u16
}

/// Keycodes for the keys the overlay injects
#[derive(Debug, Clone, Copy)]
pub struct KeyBindings {
    pub page_up: Keycode,
    pub page_down: Keycode,
    pub control: Keycode,
    pub close: Keycode,
}

impl KeyBindings {
    /// Resolve every binding against the server's current keyboard mapping
    pub fn resolve(conn: &RustConnection) -> Result<Self> {
        let setup = conn.setup();
        let min = setup.min_keycode;
        let count = setup.max_keycode.saturating_sub(min).saturating_add(1);
        let mapping = conn
            .get_keyboard_mapping(min, count)
            .context("Failed to request keyboard mapping")?
            .reply()
            .context("Failed to get keyboard mapping reply")?;

        let per_keycode = mapping.keysyms_per_keycode;
        let lookup = |sym: Keysym, name: &str| -> Result<Keycode> {
            let code = find_keycode(&mapping.keysyms, per_keycode, min, sym)
                .ok_or_else(|| anyhow::anyhow!("No keycode mapped for {} (keysym {:#x})", name, sym))?;
            debug!(key = name, keycode = code, "Resolved keycode");
            Ok(code)
        };

        Ok(Self {
            page_up: lookup(keysym::PRIOR, "Prior")?,
            page_down: lookup(keysym::NEXT, "Next")?,
            control: lookup(keysym::CONTROL_L, "Control_L")?,
            close: lookup(keysym::LOWER_W, "w")?,
        })
    }
}

/// First keycode whose mapping row contains `sym`
fn find_keycode(keysyms: &[Keysym], per_keycode: u8, min_keycode: Keycode, sym: Keysym) -> Option<Keycode> {
    if per_keycode == 0 {
        return None;
    }
    keysyms
        .chunks(per_keycode as usize)
        .position(|row| row.contains(&sym))
        .and_then(|index| u8::try_from(index).ok())
        .and_then(|index| min_keycode.checked_add(index))
}

/// Make sure the XTEST extension is present before relying on it
pub fn check_xtest(conn: &RustConnection) -> bool {
    match conn.xtest_get_version(2, 2).map(|cookie| cookie.reply()) {
        Ok(Ok(version)) => {
            debug!(major = version.major_version, minor = version.minor_version, "XTEST available");
            true
        }
        Ok(Err(e)) => {
            warn!(error = %e, "XTEST extension unavailable, key injection disabled");
            false
        }
        Err(e) => {
            warn!(error = %e, "XTEST extension unavailable, key injection disabled");
            false
        }
    }
}

/// Press `modifiers` then `key`, and release them in reverse order
pub fn send_key_chord(ctx: &AppContext, modifiers: &[Keycode], key: Keycode) -> Result<()> {
    let root = ctx.screen.root;
    for &modifier in modifiers {
        fake_key(ctx.conn, KEY_PRESS_EVENT, modifier, root)?;
    }
    fake_key(ctx.conn, KEY_PRESS_EVENT, key, root)?;
    fake_key(ctx.conn, KEY_RELEASE_EVENT, key, root)?;
    for &modifier in modifiers.iter().rev() {
        fake_key(ctx.conn, KEY_RELEASE_EVENT, modifier, root)?;
    }
    ctx.conn.flush()
        .context("Failed to flush X11 connection after key injection")?;
    Ok(())
}

fn fake_key(conn: &RustConnection, kind: u8, keycode: Keycode, root: Window) -> Result<()> {
    conn.xtest_fake_input(kind, keycode, x11rb::CURRENT_TIME, root, 0, 0, 0)
        .context(format!("Failed to inject key event (type {}, keycode {})", kind, keycode))?;
    Ok(())
}
