//! Tests for loading, saving and resetting the persisted configuration.

use pianokeys::config::{AppConfig, ConfigPatch, ConfigStore};
use pianokeys::keymap::{BlackKeyMode, KeyCombo};
use pianokeys::shortcuts::{Action, ShortcutSet};
use pianokeys::storage::{BlobStore, FsBlobStore, MemoryBlobStore};
use serde_json::{json, Value};
use tempfile::TempDir;

const DOCUMENT: &str = "config.json";

fn stored(blobs: &MemoryBlobStore) -> Value {
    serde_json::from_str(&blobs.get(DOCUMENT).expect("document should exist")).unwrap()
}

fn combo(s: &str) -> KeyCombo {
    s.parse().unwrap()
}

#[test]
fn test_load_reads_storage_once() {
    let blobs = MemoryBlobStore::with_blob(DOCUMENT, r#"{ "themeSettings": { "currentTheme": "dark" } }"#);
    let mut config = ConfigStore::new(blobs.clone());

    assert!(!config.is_loaded());
    assert_eq!(config.load().theme_settings.current_theme, "dark");
    assert_eq!(config.load().theme_settings.current_theme, "dark");
    assert!(config.is_loaded());
    assert_eq!(blobs.reads(), 1);
    assert_eq!(blobs.writes(), 0);
}

#[test]
fn test_missing_document_writes_defaults() {
    let blobs = MemoryBlobStore::new();
    let mut config = ConfigStore::new(blobs.clone());

    assert_eq!(config.load(), &AppConfig::default());
    assert_eq!(blobs.reads(), 0);
    assert_eq!(blobs.writes(), 1);

    let document = stored(&blobs);
    assert_eq!(document["keySettings"]["blackKeyMode"], "support_black_key");
    assert_eq!(document["shortcuts"]["PREV_SONG"], "alt+up");
}

#[test]
fn test_unwritable_missing_document_marks_dirty() {
    let blobs = MemoryBlobStore::new();
    blobs.set_fail_writes(true);
    let mut config = ConfigStore::new(blobs.clone());

    assert_eq!(config.load(), &AppConfig::default());
    assert!(config.is_dirty());
    assert!(blobs.get(DOCUMENT).is_none());

    blobs.set_fail_writes(false);
    config.reset();
    assert!(!config.is_dirty());
    assert!(config.into_blob_store().exists(DOCUMENT));
}

#[test]
fn test_padded_note_keys_override_defaults() {
    let blobs = MemoryBlobStore::with_blob(
        DOCUMENT,
        r#"{ "keySettings": { "noteToKey": { "060": "q" } } }"#,
    );
    let mut config = ConfigStore::new(blobs);
    let keys = &config.load().key_settings;

    assert_eq!(
        keys.note_to_key.resolve(60, keys.black_key_mode),
        Some(&combo("q"))
    );
    assert_eq!(keys.note_to_key.len(), 36);
}

#[test]
fn test_partial_document_is_filled_from_defaults() {
    let blobs = MemoryBlobStore::with_blob(
        DOCUMENT,
        r#"{ "keySettings": { "minNote": 60 }, "shortcuts": { "STOP": null } }"#,
    );
    let mut config = ConfigStore::new(blobs);
    let loaded = config.load();

    assert_eq!(loaded.key_settings.min_note, 60);
    assert_eq!(loaded.key_settings.max_note, 83);
    assert_eq!(loaded.key_settings.note_to_key.len(), 36);
    assert_eq!(loaded.shortcuts, ShortcutSet::default());
}

#[test]
fn test_corrupt_document_falls_back_to_defaults() {
    let blobs = MemoryBlobStore::with_blob(DOCUMENT, "{ not json");
    let mut config = ConfigStore::new(blobs.clone());

    assert_eq!(config.load(), &AppConfig::default());
    // The broken document is left for the user to inspect
    assert_eq!(blobs.get(DOCUMENT).as_deref(), Some("{ not json"));
}

#[test]
fn test_read_failure_falls_back_to_defaults() {
    let blobs = MemoryBlobStore::with_blob(DOCUMENT, "{}");
    blobs.set_fail_reads(true);
    let mut config = ConfigStore::new(blobs);

    assert_eq!(config.load(), &AppConfig::default());
    assert!(config.is_loaded());
}

#[test]
fn test_save_changes_only_the_patched_field() {
    let blobs = MemoryBlobStore::new();
    let mut config = ConfigStore::new(blobs.clone());
    config.load();
    let before = stored(&blobs);

    config
        .save(&ConfigPatch::default().shortcut(Action::Stop, combo("ctrl+s")))
        .unwrap();

    let mut after = stored(&blobs);
    assert_eq!(after["shortcuts"]["STOP"], "ctrl+s");
    after["shortcuts"]["STOP"] = before["shortcuts"]["STOP"].clone();
    assert_eq!(after, before);
    assert_eq!(config.current().shortcuts.stop, combo("ctrl+s"));
}

#[test]
fn test_save_before_load_keeps_stored_settings() {
    let blobs = MemoryBlobStore::with_blob(DOCUMENT, r#"{ "keySettings": { "maxNote": 71 } }"#);
    let mut config = ConfigStore::new(blobs.clone());

    config.save(&ConfigPatch::default().theme("dark")).unwrap();

    let document = stored(&blobs);
    assert_eq!(document["keySettings"]["maxNote"], 71);
    assert_eq!(document["themeSettings"]["currentTheme"], "dark");
}

#[test]
fn test_invalid_save_changes_nothing() {
    let blobs = MemoryBlobStore::new();
    let mut config = ConfigStore::new(blobs.clone());
    config.load();
    let writes = blobs.writes();

    let conflicting = ConfigPatch::default().shortcut(Action::NextSong, combo("alt+up"));
    assert!(config.save(&conflicting).is_err());
    assert!(config.save(&ConfigPatch::default().note_range(90, 30)).is_err());

    assert_eq!(config.current(), &AppConfig::default());
    assert_eq!(blobs.writes(), writes);
}

#[test]
fn test_failed_write_keeps_in_memory_change() {
    let blobs = MemoryBlobStore::new();
    let mut config = ConfigStore::new(blobs.clone());
    config.load();
    blobs.set_fail_writes(true);

    config
        .save(&ConfigPatch::default().black_key_mode(BlackKeyMode::All))
        .unwrap();

    assert!(config.is_dirty());
    assert_eq!(config.current().key_settings.black_key_mode, BlackKeyMode::All);
    assert_eq!(stored(&blobs)["keySettings"]["blackKeyMode"], "support_black_key");

    blobs.set_fail_writes(false);
    config.save(&ConfigPatch::default()).unwrap();
    assert!(!config.is_dirty());
    assert_eq!(stored(&blobs)["keySettings"]["blackKeyMode"], "all");
}

#[test]
fn test_round_trip_through_fresh_store() {
    let blobs = MemoryBlobStore::new();
    {
        let mut config = ConfigStore::new(blobs.clone());
        config
            .save(
                &ConfigPatch::default()
                    .note_range(36, 95)
                    .binding(60, KeyCombo::unbound())
                    .binding(84, combo("ctrl+q")),
            )
            .unwrap();
    }

    let mut config = ConfigStore::new(blobs);
    let loaded = config.load();
    assert_eq!(loaded.key_settings.min_note, 36);
    assert_eq!(loaded.key_settings.max_note, 95);
    assert!(loaded.key_settings.note_to_key.get(60).unwrap().is_unbound());
    assert_eq!(loaded.key_settings.note_to_key.get(84), Some(&combo("ctrl+q")));
    assert_eq!(loaded.key_settings.note_to_key.get(62), Some(&combo("s")));
}

#[test]
fn test_reset_overwrites_everything() {
    let blobs = MemoryBlobStore::with_blob(
        DOCUMENT,
        r#"{ "themeSettings": { "currentTheme": "dark" }, "legacy": true }"#,
    );
    let mut config = ConfigStore::new(blobs.clone());
    config.load();
    config.reset();

    assert_eq!(config.current(), &AppConfig::default());
    let document = stored(&blobs);
    assert_eq!(document["themeSettings"]["currentTheme"], "light");
    assert!(document.get("legacy").is_none());
}

#[test]
fn test_fs_store_persists_between_instances() {
    let temp_dir = TempDir::new().unwrap();

    let mut config = ConfigStore::new(FsBlobStore::new(temp_dir.path()));
    config
        .save(&ConfigPatch::default().shortcut(Action::StartPause, combo("ctrl+alt+=")))
        .unwrap();

    let files = FsBlobStore::new(temp_dir.path());
    assert_eq!(files.root(), temp_dir.path());
    assert!(files.exists(DOCUMENT));
    let document: Value = serde_json::from_str(&files.read_text(DOCUMENT).unwrap()).unwrap();
    assert_eq!(document["shortcuts"]["START_PAUSE"], json!("ctrl+alt+="));

    let mut reopened = ConfigStore::new(files);
    assert_eq!(reopened.load().shortcuts.start_pause, combo("ctrl+alt+="));
}
