//! Overlay daemon - keeps the page-turner on screen and turns taps into keys

mod event_handler;
mod window;

pub use window::X11OverlayHost;

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use x11rb::connection::Connection;

use crate::config::SettingsStore;
use crate::constants::daemon;
use crate::pager::{FloatPager, PagerCallbacks};
use crate::x11_utils::{check_xtest, send_key_chord, AppContext, CachedAtoms, KeyBindings};

use event_handler::{handle_event, InputState};

/// Actions the pager asks the daemon to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerCommand {
    PageUp,
    PageDown,
    CloseTab,
}

/// Signal-driven requests, set from signal handlers and polled by the loop
#[derive(Debug, Default)]
struct SignalFlags {
    quit: Arc<AtomicBool>,
    refresh: Arc<AtomicBool>,
}

impl SignalFlags {
    #[cfg(unix)]
    fn register() -> Result<Self> {
        use signal_hook::consts::{SIGINT, SIGTERM, SIGUSR1};

        let flags = Self::default();
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&flags.quit))
                .context(format!("Failed to register handler for signal {}", signal))?;
        }
        signal_hook::flag::register(SIGUSR1, Arc::clone(&flags.refresh))
            .context("Failed to register SIGUSR1 handler")?;
        Ok(flags)
    }

    #[cfg(not(unix))]
    fn register() -> Result<Self> {
        Ok(Self::default())
    }
}

fn post(tx: Sender<PagerCommand>, command: PagerCommand) -> impl FnMut() + 'static {
    move || {
        if let Err(e) = tx.send(command) {
            warn!(command = ?command, error = %e, "Command channel closed");
        }
    }
}

fn command_callbacks(tx: Sender<PagerCommand>) -> PagerCallbacks {
    PagerCallbacks::new(
        post(tx.clone(), PagerCommand::PageUp),
        post(tx.clone(), PagerCommand::PageDown),
        post(tx, PagerCommand::CloseTab),
    )
}

fn execute_command(ctx: &AppContext, keys: Option<&KeyBindings>, command: PagerCommand) {
    let Some(keys) = keys else {
        warn!(command = ?command, "Key injection unavailable, dropping command");
        return;
    };
    let result = match command {
        PagerCommand::PageUp => send_key_chord(ctx, &[], keys.page_up),
        PagerCommand::PageDown => send_key_chord(ctx, &[], keys.page_down),
        PagerCommand::CloseTab => send_key_chord(ctx, &[keys.control], keys.close),
    };
    match result {
        Ok(()) => debug!(command = ?command, "Injected key"),
        Err(e) => error!(command = ?command, error = ?e, "Failed to inject key"),
    }
}

/// Milliseconds since `start`, saturating
fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

pub fn run_overlay_daemon<S: SettingsStore>(store: S) -> Result<()> {
    let (conn, screen_num) = x11rb::connect(None)
        .context("Failed to connect to X11 server. Is DISPLAY set correctly?")?;
    let screen = &conn.setup().roots[screen_num];
    info!(
        screen = screen_num,
        width = screen.width_in_pixels,
        height = screen.height_in_pixels,
        "Connected to X11 server"
    );

    // Pre-cache atoms once at startup (eliminates roundtrip overhead)
    let atoms = CachedAtoms::new(&conn)
        .context("Failed to cache X11 atoms at startup")?;
    let ctx = AppContext {
        conn: &conn,
        screen,
        atoms: &atoms,
    };

    // Key injection is optional: the overlay still works, taps just go nowhere
    let keys = if check_xtest(&conn) {
        KeyBindings::resolve(&conn)
            .inspect_err(|e| error!(error = ?e, "Failed to resolve key bindings"))
            .ok()
    } else {
        None
    };

    let signals = SignalFlags::register()?;
    let (command_tx, command_rx) = mpsc::channel();

    let mut pager = FloatPager::new(X11OverlayHost::new(ctx), store, command_callbacks(command_tx));
    pager.show();
    if !pager.is_shown() {
        info!("Overlay not shown at startup, waiting for settings to enable it");
    }

    let mut input = InputState::default();
    let start = Instant::now();
    let mut last_settings_check = 0;

    info!("Overlay daemon running");

    while !signals.quit.load(Ordering::Relaxed) {
        if signals.refresh.swap(false, Ordering::Relaxed) {
            info!("Refresh requested");
            pager.refresh();
        }

        // Catch the clock up first so a press arms its timers from the current time
        let now = elapsed_ms(start);
        pager.advance_to(now);

        while let Some(event) = conn.poll_for_event()
            .context("Failed to poll for X11 event")?
        {
            let _ = handle_event(&mut pager, &mut input, event)
                .inspect_err(|err| error!(error = ?err, "Event handling error"));
        }
        pager.run_pending();

        while let Ok(command) = command_rx.try_recv() {
            info!(command = ?command, "Executing pager command");
            execute_command(&ctx, keys.as_ref(), command);
        }

        if now.saturating_sub(last_settings_check) >= daemon::SETTINGS_CHECK_INTERVAL_MS {
            last_settings_check = now;
            if pager.store_mut().reload_if_changed() {
                info!("Settings changed, applying");
                pager.apply_settings();
                if !pager.is_shown() && pager.settings().enabled {
                    pager.show();
                }
            }
        }

        conn.flush()
            .context("Failed to flush X11 connection")?;

        let sleep_ms = pager
            .next_deadline_in()
            .map_or(daemon::POLL_INTERVAL_MS, |due| due.min(daemon::POLL_INTERVAL_MS));
        thread::sleep(Duration::from_millis(sleep_ms));
    }

    info!("Shutting down overlay daemon");
    pager.remove();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callbacks_post_commands_in_order() {
        let (tx, rx) = mpsc::channel();
        let mut callbacks = command_callbacks(tx);
        callbacks.page_down();
        callbacks.close_tab();
        callbacks.page_up();
        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![PagerCommand::PageDown, PagerCommand::CloseTab, PagerCommand::PageUp]
        );
    }

    #[test]
    fn test_callbacks_survive_closed_channel() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut callbacks = command_callbacks(tx);
        callbacks.page_up();
    }
}
