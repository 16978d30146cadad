//! Piano note catalog.
//!
//! This module provides pure note-number arithmetic over the 88-key piano
//! range (21–108): octave group classification, display names, solfège
//! degrees and group-based filtering of note-tagged events.

mod display;

pub use display::{display_name, full_notation, solfege_degree};

use serde::{Deserialize, Serialize};

/// Lowest note on an 88-key piano (A0).
pub const LOWEST_NOTE: i32 = 21;

/// Highest note on an 88-key piano (C8).
pub const HIGHEST_NOTE: i32 = 108;

/// Middle C, the boundary of the superscript-marked registers.
pub const MIDDLE_C: i32 = 60;

/// A named octave bucket covering an inclusive range of note numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteGroup {
    /// Display name (e.g., "小字组 (c-b)")
    pub name: &'static str,
    /// Lowest note in the group
    pub low: i32,
    /// Highest note in the group (inclusive)
    pub high: i32,
}

impl NoteGroup {
    /// Returns true if `note` lies inside this group.
    #[must_use]
    pub const fn contains(&self, note: i32) -> bool {
        note >= self.low && note <= self.high
    }

    /// Number of notes in the group.
    #[must_use]
    pub const fn len(&self) -> usize {
        (self.high - self.low + 1) as usize
    }
}

/// The nine canonical groups, ordered from lowest to highest.
///
/// Together they partition [`LOWEST_NOTE`, `HIGHEST_NOTE`] with no gaps and
/// no overlaps.
pub const NOTE_GROUPS: [NoteGroup; 9] = [
    NoteGroup { name: "大字二组 (A₂-B₂)", low: 21, high: 23 },
    NoteGroup { name: "大字一组 (C₁-B₁)", low: 24, high: 35 },
    NoteGroup { name: "大字组 (C-B)", low: 36, high: 47 },
    NoteGroup { name: "小字组 (c-b)", low: 48, high: 59 },
    NoteGroup { name: "小字一组 (c¹-b¹)", low: 60, high: 71 },
    NoteGroup { name: "小字二组 (c²-b²)", low: 72, high: 83 },
    NoteGroup { name: "小字三组 (c³-b³)", low: 84, high: 95 },
    NoteGroup { name: "小字四组 (c⁴-b⁴)", low: 96, high: 107 },
    NoteGroup { name: "小字五组 (c⁵)", low: 108, high: 108 },
];

/// Returns true if `note` is on the 88-key piano.
#[must_use]
pub const fn is_piano_note(note: i32) -> bool {
    note >= LOWEST_NOTE && note <= HIGHEST_NOTE
}

/// Finds the group containing `note`, or `None` when the note is unknown
/// (outside the piano range).
#[must_use]
pub fn group_for_note(note: i32) -> Option<&'static NoteGroup> {
    NOTE_GROUPS.iter().find(|group| group.contains(note))
}

/// Looks up a group by its exact display name.
#[must_use]
pub fn group_by_name(name: &str) -> Option<&'static NoteGroup> {
    NOTE_GROUPS.iter().find(|group| group.name == name)
}

/// Semitone class of a note (0 = c, 11 = b).
#[must_use]
pub const fn semitone(note: i32) -> usize {
    note.rem_euclid(12) as usize
}

/// Returns true for chromatic (black-key) notes.
#[must_use]
pub const fn is_black_key(note: i32) -> bool {
    matches!(semitone(note), 1 | 3 | 6 | 8 | 10)
}

/// Nearest diatonic note at or below `note`.
///
/// Every chromatic note sits one semitone above a diatonic one, so this is
/// either `note` itself or `note - 1`.
#[must_use]
pub const fn lower_white_key(note: i32) -> i32 {
    if is_black_key(note) {
        note - 1
    } else {
        note
    }
}

/// Anything carrying an optional note number.
pub trait NoteTagged {
    /// The note number, if the item has one.
    fn note(&self) -> Option<i32>;
}

/// A chronological note event emitted by the playback scheduler.
///
/// Non-note events (tempo changes, markers) arrive with `note: None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI note number
    #[serde(default)]
    pub note: Option<i32>,
    /// MIDI channel
    #[serde(default)]
    pub channel: u8,
    /// Start time in seconds
    pub time: f64,
    /// Duration in seconds
    #[serde(default)]
    pub duration: f64,
}

impl NoteEvent {
    /// Creates a note event on channel 0.
    #[must_use]
    pub const fn new(note: i32, time: f64, duration: f64) -> Self {
        Self {
            note: Some(note),
            channel: 0,
            time,
            duration,
        }
    }
}

impl NoteTagged for NoteEvent {
    fn note(&self) -> Option<i32> {
        self.note
    }
}

/// Keeps only events whose note falls in one of the selected groups.
///
/// An empty selection returns `events` unchanged. Unknown group names are
/// ignored; once filtering is active, events without a note are dropped.
pub fn filter_by_groups<E, S>(events: Vec<E>, selected_groups: &[S]) -> Vec<E>
where
    E: NoteTagged,
    S: AsRef<str>,
{
    if selected_groups.is_empty() {
        return events;
    }

    let groups: Vec<&NoteGroup> = selected_groups
        .iter()
        .filter_map(|name| group_by_name(name.as_ref()))
        .collect();

    events
        .into_iter()
        .filter(|event| {
            event
                .note()
                .is_some_and(|note| groups.iter().any(|group| group.contains(note)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_partition_piano_range() {
        let mut expected_low = LOWEST_NOTE;
        for group in &NOTE_GROUPS {
            assert_eq!(group.low, expected_low, "gap or overlap before {}", group.name);
            assert!(group.low <= group.high);
            expected_low = group.high + 1;
        }
        assert_eq!(expected_low, HIGHEST_NOTE + 1);

        let total: usize = NOTE_GROUPS.iter().map(NoteGroup::len).sum();
        assert_eq!(total, 88);
    }

    #[test]
    fn test_group_for_note_boundaries() {
        assert_eq!(group_for_note(21).unwrap().name, "大字二组 (A₂-B₂)");
        assert_eq!(group_for_note(59).unwrap().name, "小字组 (c-b)");
        assert_eq!(group_for_note(60).unwrap().name, "小字一组 (c¹-b¹)");
        assert_eq!(group_for_note(108).unwrap().name, "小字五组 (c⁵)");
        assert!(group_for_note(20).is_none());
        assert!(group_for_note(109).is_none());
        assert!(group_for_note(-5).is_none());
    }

    #[test]
    fn test_black_keys_and_lower_white_key() {
        assert!(!is_black_key(60));
        assert!(is_black_key(61));
        assert!(is_black_key(70));
        assert!(!is_black_key(71));
        assert_eq!(lower_white_key(61), 60);
        assert_eq!(lower_white_key(63), 62);
        assert_eq!(lower_white_key(64), 64);
        assert_eq!(lower_white_key(22), 21);
    }

    #[test]
    fn test_filter_unknown_names_only_drops_everything() {
        let events = vec![NoteEvent::new(60, 0.0, 0.5)];
        let filtered = filter_by_groups(events, &["no such group"]);
        assert!(filtered.is_empty());
    }
}
