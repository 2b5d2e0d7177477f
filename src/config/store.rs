//! Durable key/value storage for overlay settings
//!
//! The controller only ever talks to the [`SettingsStore`] trait. Two backends
//! are provided: a JSON file (used by the daemon and the `config` subcommands)
//! and an in-memory map (used for `--no-persist` runs and in tests).

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

/// A single stored value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl SettingValue {
    /// Booleans and numbers only; anything else has no stored form
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(SettingValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(SettingValue::Int)
                .or_else(|| n.as_f64().map(SettingValue::Float)),
            _ => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(self) -> Option<i32> {
        match self {
            SettingValue::Int(i) => i32::try_from(i).ok(),
            _ => None,
        }
    }

    /// Integers are accepted for float keys (`1` written by hand instead of `1.0`)
    pub fn as_float(self) -> Option<f32> {
        match self {
            SettingValue::Float(f) => Some(f as f32),
            SettingValue::Int(i) => Some(i as f32),
            SettingValue::Bool(_) => None,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Int(value as i64)
    }
}

impl From<f32> for SettingValue {
    fn from(value: f32) -> Self {
        // Go through the shortest decimal form so 0.7f32 is stored as 0.7, not 0.699999988079071
        SettingValue::Float(value.to_string().parse().unwrap_or(value as f64))
    }
}

/// One change in a store transaction
#[derive(Debug, Clone, PartialEq)]
pub enum SettingEdit<'a> {
    Set(&'a str, SettingValue),
    Remove(&'a str),
}

pub type SettingsMap = BTreeMap<String, SettingValue>;

/// Key/value store with typed, default-resolving reads
///
/// `apply` is all-or-nothing: either every edit lands or none does.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<SettingValue>;

    fn apply(&mut self, edits: &[SettingEdit<'_>]) -> Result<()>;

    fn set(&mut self, key: &str, value: SettingValue) -> Result<()> {
        self.apply(&[SettingEdit::Set(key, value)])
    }

    #[cfg(test)]
    fn remove(&mut self, key: &str) -> Result<()> {
        self.apply(&[SettingEdit::Remove(key)])
    }

    #[cfg(test)]
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        typed_or_default(key, self.get(key), SettingValue::as_bool, default)
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        typed_or_default(key, self.get(key), SettingValue::as_int, default)
    }

    fn get_float(&self, key: &str, default: f32) -> f32 {
        typed_or_default(key, self.get(key), SettingValue::as_float, default)
    }

    /// Pick up edits made outside this process; true when values changed
    fn reload_if_changed(&mut self) -> bool {
        false
    }
}

fn typed_or_default<T: std::fmt::Debug>(
    key: &str,
    value: Option<SettingValue>,
    convert: impl FnOnce(SettingValue) -> Option<T>,
    default: T,
) -> T {
    match value {
        None => default,
        Some(raw) => convert(raw).unwrap_or_else(|| {
            warn!(key = %key, value = ?raw, default = ?default, "Stored value has the wrong type, using default");
            default
        }),
    }
}

fn apply_edits(map: &mut SettingsMap, edits: &[SettingEdit<'_>]) {
    for edit in edits {
        match edit {
            SettingEdit::Set(key, value) => {
                map.insert((*key).to_string(), *value);
            }
            SettingEdit::Remove(key) => {
                map.remove(*key);
            }
        }
    }
}

/// Process-local store, nothing survives a restart
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: SettingsMap,
}

impl MemoryStore {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: SettingsMap) -> Self {
        Self { values }
    }

    #[cfg(test)]
    pub fn values(&self) -> &SettingsMap {
        &self.values
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).copied()
    }

    fn apply(&mut self, edits: &[SettingEdit<'_>]) -> Result<()> {
        apply_edits(&mut self.values, edits);
        Ok(())
    }
}

/// Settings persisted as a flat JSON object
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: SettingsMap,
    /// Modification time of the file as of the last load or write
    modified: Option<SystemTime>,
}

impl JsonFileStore {
    /// Default location: `<config dir>/float-pager/settings.json`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Open the store at `path`
    /// A missing or unreadable file yields an empty store; every key then resolves to its default.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::read_values(&path);
        let modified = Self::modified_time(&path);
        info!(path = %path.display(), keys = values.len(), "Opened settings store");
        Self { path, values, modified }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of everything currently stored
    pub fn values(&self) -> &SettingsMap {
        &self.values
    }

    fn modified_time(path: &Path) -> Option<SystemTime> {
        fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    fn read_values(path: &Path) -> SettingsMap {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file yet, using defaults");
                return SettingsMap::new();
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read settings file, using defaults");
                return SettingsMap::new();
            }
        };

        let object = match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(object)) => object,
            Ok(other) => {
                error!(path = %path.display(), found = %other, "Settings file is not a JSON object, using defaults");
                return SettingsMap::new();
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to parse settings file, using defaults");
                return SettingsMap::new();
            }
        };

        // One bad entry must not cost the others; it is dropped on the next write
        object
            .into_iter()
            .filter_map(|(key, raw)| match SettingValue::from_json(&raw) {
                Some(value) => Some((key, value)),
                None => {
                    warn!(key = %key, value = %raw, "Ignoring setting with unsupported type");
                    None
                }
            })
            .collect()
    }

    fn write_values(&self, values: &SettingsMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(values)
            .context("Failed to serialize settings to JSON")?;

        // Write beside the target and rename so readers never see a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .context(format!("Failed to write settings file to {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .context(format!("Failed to move settings file into place at {}", self.path.display()))?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).copied()
    }

    fn apply(&mut self, edits: &[SettingEdit<'_>]) -> Result<()> {
        let mut next = self.values.clone();
        apply_edits(&mut next, edits);
        self.write_values(&next)?;
        self.values = next;
        self.modified = Self::modified_time(&self.path);
        Ok(())
    }

    /// Re-read the file if another process changed it since we last looked
    fn reload_if_changed(&mut self) -> bool {
        let modified = Self::modified_time(&self.path);
        if modified == self.modified {
            return false;
        }
        debug!(path = %self.path.display(), "Settings file changed on disk, reloading");
        self.values = Self::read_values(&self.path);
        self.modified = modified;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_reads_fall_back_to_default() {
        let store = MemoryStore::new();
        assert!(store.get_bool("missing", true));
        assert_eq!(store.get_int("missing", 48), 48);
        assert_eq!(store.get_float("missing", 0.4), 0.4);
    }

    #[test]
    fn test_wrong_type_uses_default() {
        let mut store = MemoryStore::new();
        store.set("flag", SettingValue::Float(2.5)).unwrap();
        assert!(!store.get_bool("flag", false));
        assert_eq!(store.get_int("flag", 7), 7);
    }

    #[test]
    fn test_int_accepted_for_float_key() {
        let mut store = MemoryStore::new();
        store.set("opacity", SettingValue::Int(1)).unwrap();
        assert_eq!(store.get_float("opacity", 0.4), 1.0);
    }

    #[test]
    fn test_int_out_of_range_uses_default() {
        let mut store = MemoryStore::new();
        store.set("size", SettingValue::Int(i64::MAX)).unwrap();
        assert_eq!(store.get_int("size", 48), 48);
    }

    #[test]
    fn test_apply_is_ordered() {
        let mut store = MemoryStore::new();
        store
            .apply(&[
                SettingEdit::Set("a", 1.into()),
                SettingEdit::Remove("a"),
                SettingEdit::Set("b", 2.into()),
            ])
            .unwrap();
        assert!(!store.contains("a"));
        assert_eq!(store.get_int("b", 0), 2);
    }

    #[test]
    fn test_float_conversion_keeps_short_decimal() {
        assert_eq!(SettingValue::from(0.7f32), SettingValue::Float(0.7));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("settings.json"));
        assert!(store.values().is_empty());
        assert_eq!(store.get_int("mainButtonSize", 48), 48);
    }

    #[test]
    fn test_file_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = JsonFileStore::open(&path);
        store
            .apply(&[
                SettingEdit::Set("savedX", 12.into()),
                SettingEdit::Set("savedY", 34.into()),
                SettingEdit::Set("opacity", 0.7f32.into()),
                SettingEdit::Set("enabled", false.into()),
            ])
            .unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get_int("savedX", -1), 12);
        assert_eq!(reopened.get_int("savedY", -1), 34);
        assert_eq!(reopened.get_float("opacity", 0.4), 0.7);
        assert!(!reopened.get_bool("enabled", true));
    }

    #[test]
    fn test_file_store_corrupt_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert!(store.values().is_empty());
        assert_eq!(store.get_float("opacity", 0.4), 0.4);
    }

    #[test]
    fn test_file_store_keeps_valid_keys_when_one_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "mainButtonSize": 64, "longPressDurationMs": 900, "opacity": "0.5", "enabled": null }"#,
        )
        .unwrap();

        let mut store = JsonFileStore::open(&path);
        assert_eq!(store.get_int("mainButtonSize", 48), 64);
        assert_eq!(store.get_int("longPressDurationMs", 600), 900);
        assert_eq!(store.get_float("opacity", 0.4), 0.4);
        assert!(store.get_bool("enabled", true));

        // Writing back after a drag must not lose the keys that did parse
        crate::config::prefs::save_position(&mut store, crate::types::Position::new(10, 20)).unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get_int("mainButtonSize", 48), 64);
        assert_eq!(reopened.get_int("longPressDurationMs", 600), 900);
        assert_eq!(reopened.get_int("savedX", -1), 10);
        assert_eq!(reopened.get_int("savedY", -1), 20);
        assert!(!reopened.contains("opacity"));
    }

    #[test]
    fn test_file_store_non_object_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = JsonFileStore::open(&path);
        assert!(store.values().is_empty());
    }

    #[test]
    fn test_file_store_failed_write_keeps_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail
        let path = dir.path().join("settings.json");
        fs::create_dir_all(path.join("blocker")).unwrap();

        let mut store = JsonFileStore::open(&path);
        assert!(store.set("savedX", 5.into()).is_err());
        assert!(!store.contains("savedX"));
    }

    #[test]
    fn test_reload_if_changed_picks_up_external_edit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = JsonFileStore::open(&path);
        assert!(!store.reload_if_changed());

        fs::write(&path, r#"{ "mainButtonSize": 64 }"#).unwrap();
        assert!(store.reload_if_changed());
        assert_eq!(store.get_int("mainButtonSize", 48), 64);
        assert!(!store.reload_if_changed());
    }
}
