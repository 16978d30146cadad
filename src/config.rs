//! Configuration management for the application.
//!
//! This module defines the configuration document (key settings, playback
//! shortcuts, theme) and [`ConfigStore`], which loads it once, fills any
//! missing fields from the built-in defaults, and persists partial updates.
//!
//! The document is JSON:
//!
//! ```json
//! {
//!   "keySettings": {
//!     "minNote": 48,
//!     "maxNote": 83,
//!     "blackKeyMode": "support_black_key",
//!     "noteToKey": { "60": "a", "61": "shift+a" }
//!   },
//!   "shortcuts": { "START_PAUSE": "alt+=", "STOP": "alt+-", "PREV_SONG": "alt+up", "NEXT_SONG": "alt+down" },
//!   "themeSettings": { "currentTheme": "light" }
//! }
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::constants::{CONFIG_DOCUMENT, DEFAULT_THEME};
use crate::keymap::{BlackKeyMode, KeyBindingTable, KeyCombo, MAPPING_HIGH, MAPPING_LOW};
use crate::shortcuts::{Action, ShortcutSet};
use crate::storage::BlobStore;

/// Note range, black-key policy and the per-note binding table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySettings {
    /// Lowest note that is played
    pub min_note: i32,
    /// Highest note that is played (inclusive)
    pub max_note: i32,
    /// How chromatic notes are handled
    pub black_key_mode: BlackKeyMode,
    /// Note → key combo table
    pub note_to_key: KeyBindingTable,
    /// Unrecognized fields, preserved across saves
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            min_note: MAPPING_LOW,
            max_note: MAPPING_HIGH,
            black_key_mode: BlackKeyMode::default(),
            note_to_key: KeyBindingTable::default_mapping(),
            extra: Map::new(),
        }
    }
}

/// Theme preference. Opaque to everything but the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    /// Theme name
    pub current_theme: String,
    /// Unrecognized fields, preserved across saves
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            current_theme: DEFAULT_THEME.to_string(),
            extra: Map::new(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/PianoKeys/config.json`
/// - macOS: `~/Library/Application Support/PianoKeys/config.json`
/// - Windows: `%APPDATA%\PianoKeys\config.json`
///
/// # Validation
///
/// - `minNote` must not exceed `maxNote`
/// - no two shortcuts may share a combo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Key translation settings
    pub key_settings: KeySettings,
    /// Global playback shortcuts
    pub shortcuts: ShortcutSet,
    /// Theme preference
    pub theme_settings: ThemeSettings,
    /// Unrecognized top-level fields, preserved across saves
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppConfig {
    /// Builds a config from a loaded document, filling every missing field
    /// (at any depth) from the defaults.
    pub fn with_defaults(mut loaded: Value) -> Result<Self> {
        normalize_note_keys(&mut loaded);
        let mut document =
            serde_json::to_value(Self::default()).context("Failed to serialize default configuration")?;
        merge_value(&mut document, loaded);

        let config: Self =
            serde_json::from_value(document).context("Failed to parse configuration document")?;
        config.validate()?;
        Ok(config)
    }

    /// Returns a copy with `patch` merged over it.
    pub fn merged(&self, patch: &ConfigPatch) -> Result<Self> {
        let mut document =
            serde_json::to_value(self).context("Failed to serialize configuration")?;
        let patch = serde_json::to_value(patch).context("Failed to serialize configuration patch")?;
        merge_value(&mut document, patch);

        let config: Self =
            serde_json::from_value(document).context("Failed to apply configuration patch")?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        let keys = &self.key_settings;
        if keys.min_note > keys.max_note {
            bail!(
                "Invalid note range: minNote ({}) is greater than maxNote ({})",
                keys.min_note,
                keys.max_note
            );
        }

        self.shortcuts.validate()
    }
}

/// Rewrites `keySettings.noteToKey` keys to canonical note numbers ("060"
/// becomes "60") so they line up with the defaults they are merged over.
/// Keys that are not numbers are left for deserialization to reject.
fn normalize_note_keys(document: &mut Value) {
    let Some(table) = document
        .get_mut("keySettings")
        .and_then(|keys| keys.get_mut("noteToKey"))
        .and_then(Value::as_object_mut)
    else {
        return;
    };

    let entries = std::mem::take(table);
    for (key, combo) in entries {
        let key = match key.trim().parse::<i32>() {
            Ok(note) => note.to_string(),
            Err(_) => key,
        };
        table.insert(key, combo);
    }
}

/// Recursively overlays `patch` onto `base`.
///
/// Objects are merged key by key; any other value replaces what was there.
/// `null` in the patch counts as absent, so it never erases a default.
pub fn merge_value(base: &mut Value, patch: Value) {
    match (base, patch) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        if !value.is_null() {
                            base_map.insert(key, value);
                        }
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Partial key settings for [`ConfigPatch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySettingsPatch {
    /// New lowest note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_note: Option<i32>,
    /// New highest note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_note: Option<i32>,
    /// New black-key mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_key_mode: Option<BlackKeyMode>,
    /// Bindings to add or replace; other notes keep their current binding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_to_key: Option<BTreeMap<i32, KeyCombo>>,
}

/// Partial shortcut set for [`ConfigPatch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortcutPatch {
    /// New play/pause combo
    #[serde(rename = "START_PAUSE", default, skip_serializing_if = "Option::is_none")]
    pub start_pause: Option<KeyCombo>,
    /// New stop combo
    #[serde(rename = "STOP", default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<KeyCombo>,
    /// New previous-song combo
    #[serde(rename = "PREV_SONG", default, skip_serializing_if = "Option::is_none")]
    pub prev_song: Option<KeyCombo>,
    /// New next-song combo
    #[serde(rename = "NEXT_SONG", default, skip_serializing_if = "Option::is_none")]
    pub next_song: Option<KeyCombo>,
}

/// Partial theme settings for [`ConfigPatch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettingsPatch {
    /// New theme name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_theme: Option<String>,
}

/// A partial configuration update. Only the fields that are set change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    /// Key settings changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_settings: Option<KeySettingsPatch>,
    /// Shortcut changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcuts: Option<ShortcutPatch>,
    /// Theme changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_settings: Option<ThemeSettingsPatch>,
}

impl ConfigPatch {
    /// Rebinds one shortcut.
    #[must_use]
    pub fn shortcut(mut self, action: Action, combo: KeyCombo) -> Self {
        let shortcuts = self.shortcuts.get_or_insert_with(ShortcutPatch::default);
        let slot = match action {
            Action::StartPause => &mut shortcuts.start_pause,
            Action::Stop => &mut shortcuts.stop,
            Action::PrevSong => &mut shortcuts.prev_song,
            Action::NextSong => &mut shortcuts.next_song,
        };
        *slot = Some(combo);
        self
    }

    /// Sets the playable note range.
    #[must_use]
    pub fn note_range(mut self, min_note: i32, max_note: i32) -> Self {
        let keys = self.key_settings.get_or_insert_with(KeySettingsPatch::default);
        keys.min_note = Some(min_note);
        keys.max_note = Some(max_note);
        self
    }

    /// Sets the black-key mode.
    #[must_use]
    pub fn black_key_mode(mut self, mode: BlackKeyMode) -> Self {
        self.key_settings
            .get_or_insert_with(KeySettingsPatch::default)
            .black_key_mode = Some(mode);
        self
    }

    /// Adds or replaces one note binding.
    #[must_use]
    pub fn binding(mut self, note: i32, combo: KeyCombo) -> Self {
        self.key_settings
            .get_or_insert_with(KeySettingsPatch::default)
            .note_to_key
            .get_or_insert_with(BTreeMap::new)
            .insert(note, combo);
        self
    }

    /// Sets the theme name.
    #[must_use]
    pub fn theme(mut self, name: impl Into<String>) -> Self {
        self.theme_settings = Some(ThemeSettingsPatch {
            current_theme: Some(name.into()),
        });
        self
    }
}

/// Owner of the live configuration.
///
/// One store is created by the application and handed to whatever needs
/// configuration. The first [`load`](Self::load) reads storage; later calls
/// return the cached config. [`save`](Self::save) updates memory first and
/// then persists, so a failed write leaves memory ahead of disk.
#[derive(Debug)]
pub struct ConfigStore<B: BlobStore> {
    store: B,
    config: AppConfig,
    loaded: bool,
    /// Set when the last persist attempt failed
    dirty: bool,
}

impl<B: BlobStore> ConfigStore<B> {
    /// Creates a store holding the built-in defaults. Nothing is read yet.
    pub fn new(store: B) -> Self {
        Self {
            store,
            config: AppConfig::default(),
            loaded: false,
            dirty: false,
        }
    }

    /// Returns true once [`load`](Self::load) has resolved the config.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The in-memory config (defaults until the first load).
    #[must_use]
    pub const fn current(&self) -> &AppConfig {
        &self.config
    }

    /// Returns true when the in-memory config is ahead of storage.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The underlying blob store.
    #[must_use]
    pub const fn blob_store(&self) -> &B {
        &self.store
    }

    /// Consumes the config store, returning the blob store.
    pub fn into_blob_store(self) -> B {
        self.store
    }

    /// Loads the configuration once.
    ///
    /// A missing document is created from defaults; if that write fails the
    /// store is left dirty. Any read, parse or validation failure is logged
    /// and the defaults are used.
    pub fn load(&mut self) -> &AppConfig {
        if !self.loaded {
            self.config = match self.read_or_create() {
                Ok(config) => config,
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "Falling back to default configuration");
                    AppConfig::default()
                }
            };
            self.loaded = true;
        }
        &self.config
    }

    fn read_or_create(&mut self) -> Result<AppConfig> {
        if !self.store.exists(CONFIG_DOCUMENT) {
            info!("No configuration found, writing defaults");
            let defaults = AppConfig::default();
            self.dirty = self.persist(&defaults).is_err();
            return Ok(defaults);
        }

        let content = self.store.read_text(CONFIG_DOCUMENT)?;
        let loaded: Value = serde_json::from_str(&content)
            .context(format!("Failed to parse {CONFIG_DOCUMENT}"))?;

        debug!("Loaded configuration document");
        AppConfig::with_defaults(loaded)
    }

    /// Merges `patch` into the config and persists the result.
    ///
    /// Loads first if needed, so a save never overwrites stored settings
    /// with defaults. Returns an error only when the merged config would be
    /// invalid, in which case nothing changes. Persistence failures are
    /// logged; the in-memory update stands.
    pub fn save(&mut self, patch: &ConfigPatch) -> Result<()> {
        self.load();

        let merged = self.config.merged(patch)?;
        self.config = merged;

        self.dirty = self.persist(&self.config).is_err();
        if self.dirty {
            warn!("Keeping in-memory configuration changes that were not persisted");
        }
        Ok(())
    }

    /// Replaces the config with the defaults and persists them.
    pub fn reset(&mut self) {
        self.config = AppConfig::default();
        self.loaded = true;
        self.dirty = self.persist(&self.config).is_err();
    }

    fn persist(&self, config: &AppConfig) -> Result<()> {
        let result = serde_json::to_string_pretty(config)
            .context("Failed to serialize configuration")
            .and_then(|content| self.store.write_text(CONFIG_DOCUMENT, &content));

        if let Err(err) = &result {
            warn!(error = %format!("{err:#}"), "Failed to persist configuration");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_new() {
        let config = AppConfig::default();
        assert_eq!(config.key_settings.min_note, 48);
        assert_eq!(config.key_settings.max_note, 83);
        assert_eq!(config.key_settings.black_key_mode, BlackKeyMode::SupportBlackKey);
        assert_eq!(config.key_settings.note_to_key.len(), 36);
        assert_eq!(config.theme_settings.current_theme, "light");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_document_field_names() {
        let json = serde_json::to_value(AppConfig::default()).unwrap();
        assert_eq!(json["keySettings"]["minNote"], 48);
        assert_eq!(json["keySettings"]["blackKeyMode"], "support_black_key");
        assert_eq!(json["keySettings"]["noteToKey"]["61"], "shift+a");
        assert_eq!(json["shortcuts"]["STOP"], "alt+-");
        assert_eq!(json["themeSettings"]["currentTheme"], "light");
    }

    #[test]
    fn test_merge_value_is_recursive() {
        let mut base = json!({ "a": { "b": 1, "c": 2 }, "d": 3 });
        merge_value(&mut base, json!({ "a": { "c": 20, "e": 5 }, "f": 6 }));
        assert_eq!(base, json!({ "a": { "b": 1, "c": 20, "e": 5 }, "d": 3, "f": 6 }));
    }

    #[test]
    fn test_merge_value_ignores_null() {
        let mut base = json!({ "a": { "b": 1 } });
        merge_value(&mut base, json!({ "a": null, "x": null }));
        assert_eq!(base, json!({ "a": { "b": 1 } }));
    }

    #[test]
    fn test_with_defaults_fills_nested_fields() {
        let loaded = json!({
            "keySettings": { "maxNote": 71, "noteToKey": { "60": "q" } },
            "themeSettings": {}
        });
        let config = AppConfig::with_defaults(loaded).unwrap();

        assert_eq!(config.key_settings.min_note, 48);
        assert_eq!(config.key_settings.max_note, 71);
        assert_eq!(config.key_settings.note_to_key.get(60), Some(&"q".parse().unwrap()));
        assert_eq!(config.key_settings.note_to_key.get(61), Some(&"shift+a".parse().unwrap()));
        assert_eq!(config.shortcuts, ShortcutSet::default());
        assert_eq!(config.theme_settings.current_theme, "light");
    }

    #[test]
    fn test_with_defaults_preserves_unknown_fields() {
        let loaded = json!({
            "windowState": { "width": 800 },
            "themeSettings": { "currentTheme": "dark", "accent": "teal" }
        });
        let config = AppConfig::with_defaults(loaded).unwrap();

        assert_eq!(config.extra["windowState"], json!({ "width": 800 }));
        assert_eq!(config.theme_settings.extra["accent"], "teal");

        let saved = serde_json::to_value(&config).unwrap();
        assert_eq!(saved["windowState"]["width"], 800);
        assert_eq!(saved["themeSettings"]["accent"], "teal");
    }

    #[test]
    fn test_with_defaults_normalizes_note_keys() {
        let loaded = json!({ "keySettings": { "noteToKey": { "060": "q", " 72 ": "" } } });
        let config = AppConfig::with_defaults(loaded).unwrap();

        let table = &config.key_settings.note_to_key;
        assert_eq!(table.get(60), Some(&"q".parse().unwrap()));
        assert!(table.get(72).unwrap().is_unbound());
        assert_eq!(table.len(), 36);
    }

    #[test]
    fn test_with_defaults_rejects_invalid_documents() {
        assert!(AppConfig::with_defaults(json!({ "keySettings": { "minNote": 90 } })).is_err());
        assert!(AppConfig::with_defaults(json!({ "keySettings": { "blackKeyMode": "maybe" } })).is_err());
        assert!(AppConfig::with_defaults(json!({ "shortcuts": { "STOP": "hyper+q" } })).is_err());
        assert!(AppConfig::with_defaults(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = ConfigPatch::default().shortcut(Action::Stop, "ctrl+s".parse().unwrap());
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, json!({ "shortcuts": { "STOP": "ctrl+s" } }));

        let patch = ConfigPatch::default().binding(60, KeyCombo::unbound()).theme("dark");
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            json,
            json!({
                "keySettings": { "noteToKey": { "60": "" } },
                "themeSettings": { "currentTheme": "dark" }
            })
        );
    }

    #[test]
    fn test_merged_rejects_inverted_range() {
        let config = AppConfig::default();
        assert!(config.merged(&ConfigPatch::default().note_range(80, 50)).is_err());
        assert!(config.merged(&ConfigPatch::default().note_range(50, 80)).is_ok());
    }
}
