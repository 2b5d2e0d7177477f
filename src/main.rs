#![forbid(unsafe_code)]

mod coalesce;
mod config;
mod constants;
mod geometry;
mod gesture;
mod layout;
mod long_press;
mod overlay;
mod pager;
mod session_state;
mod timer;
mod types;
mod x11_utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use config::{prefs, JsonFileStore, MemoryStore, OverlaySettings};

/// Floating page-turner overlay
#[derive(Parser, Debug)]
#[command(name = "float-pager", version, about)]
struct Cli {
    /// Settings file (defaults to <config dir>/float-pager/settings.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the overlay and run until interrupted (the default)
    Run {
        /// Keep settings and the dragged position in memory only
        #[arg(long)]
        no_persist: bool,
    },
    /// Inspect or edit stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Store one setting
    Set { key: String, value: String },
    /// Forget the dragged position
    ResetPosition,
    /// Write every default back and forget the dragged position
    RestoreDefaults,
}

fn init_tracing() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;
    Ok(())
}

fn show_settings(store: &JsonFileStore) {
    let settings = OverlaySettings::load(store);
    println!("settings file: {}", store.path().display());
    println!("enabled: {}", settings.enabled);
    println!("opacity: {}", settings.opacity);
    println!("hideOpacity: {}", settings.hide_opacity);
    println!("mainButtonSize: {}", settings.main_button_size);
    println!("defaultX: {}", settings.default_x);
    println!("defaultY: {}", settings.default_y);
    println!("defaultOffsetY: {}", settings.default_offset_y);
    println!("longPressDurationMs: {}", settings.long_press_duration_ms);
    match prefs::load_saved_position(store) {
        Some(position) => println!("saved position: {}, {}", position.x, position.y),
        None => println!("saved position: none"),
    }
}

fn run_config(mut store: JsonFileStore, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_settings(&store),
        ConfigAction::Set { key, value } => {
            prefs::set_from_str(&mut store, &key, &value)?;
            info!(key = %key, value = %value, "Setting stored");
        }
        ConfigAction::ResetPosition => {
            prefs::clear_saved_position(&mut store)
                .context("Failed to clear saved position")?;
            info!("Saved position cleared");
        }
        ConfigAction::RestoreDefaults => {
            prefs::restore_defaults(&mut store)
                .context("Failed to restore default settings")?;
            info!("Defaults restored");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let path = cli.config.unwrap_or_else(JsonFileStore::default_path);
    match cli.command.unwrap_or(Command::Run { no_persist: false }) {
        Command::Run { no_persist: true } => {
            // Seed from the file so the session starts with the user's settings
            let seed = JsonFileStore::open(&path);
            info!("Running without persistence");
            overlay::run_overlay_daemon(MemoryStore::from_map(seed.values().clone()))
        }
        Command::Run { no_persist: false } => overlay::run_overlay_daemon(JsonFileStore::open(&path)),
        Command::Config { action } => run_config(JsonFileStore::open(&path), action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsStore;

    #[test]
    fn test_cli_defaults_to_run() {
        let cli = Cli::try_parse_from(["float-pager"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_parses_config_set() {
        let cli = Cli::try_parse_from(["float-pager", "--config", "/tmp/s.json", "config", "set", "opacity", "0.5"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.json")));
        match cli.command {
            Some(Command::Config { action: ConfigAction::Set { key, value } }) => {
                assert_eq!(key, "opacity");
                assert_eq!(value, "0.5");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_run_no_persist() {
        let cli = Cli::try_parse_from(["float-pager", "run", "--no-persist"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Run { no_persist: true })));
    }

    #[test]
    fn test_run_config_set_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        run_config(
            JsonFileStore::open(&path),
            ConfigAction::Set { key: "mainButtonSize".into(), value: "72".into() },
        )
        .unwrap();
        let mut store = JsonFileStore::open(&path);
        assert_eq!(prefs::load_main_button_size(&store), 72);

        prefs::save_position(&mut store, types::Position::new(5, 6)).unwrap();
        run_config(JsonFileStore::open(&path), ConfigAction::ResetPosition).unwrap();
        let store = JsonFileStore::open(&path);
        assert_eq!(prefs::load_saved_position(&store), None);
        assert!(store.contains("mainButtonSize"));
    }
}
