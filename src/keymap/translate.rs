//! Translation of note events into timed key events.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::KeySettings;
use crate::notes::NoteEvent;

/// A key press for the input injector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Press time in seconds
    pub time: f64,
    /// Combo string, e.g. "a", "shift+a", "ctrl+d"
    pub key: String,
    /// How long to hold the key, in seconds
    pub duration: f64,
}

/// Converts note events into key events using the active key settings.
///
/// Events without a note, notes outside `[min_note, max_note]` and notes
/// with no usable binding are skipped. The result is ordered by time.
#[must_use]
pub fn translate(events: &[NoteEvent], settings: &KeySettings) -> Vec<KeyEvent> {
    let mut skipped = 0usize;

    let mut key_events: Vec<KeyEvent> = events
        .iter()
        .filter_map(|event| {
            let combo = event
                .note
                .filter(|note| (settings.min_note..=settings.max_note).contains(note))
                .and_then(|note| settings.note_to_key.resolve(note, settings.black_key_mode));

            if combo.is_none() {
                skipped += 1;
            }

            combo.map(|combo| KeyEvent {
                time: event.time,
                key: combo.to_string(),
                duration: event.duration,
            })
        })
        .collect();

    key_events.sort_by(|a, b| a.time.total_cmp(&b.time));

    debug!(
        translated = key_events.len(),
        skipped, "Translated note events to key events"
    );

    key_events
}
