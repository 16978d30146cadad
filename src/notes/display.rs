//! Note naming: display names, solfège degrees and full notation.

use super::{is_black_key, is_piano_note, lower_white_key, semitone, MIDDLE_C};

/// Semitone class names, independent of octave.
const NOTE_NAMES: [&str; 12] = [
    "c", "c#", "d", "d#", "e", "f", "f#", "g", "g#", "a", "a#", "b",
];

/// Solfège degree per semitone class; chromatic notes share the degree of
/// the diatonic note below them.
const SOLFEGE_DEGREES: [u8; 12] = [1, 1, 2, 2, 3, 4, 4, 5, 5, 6, 6, 7];

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Lowest note of the small (lowercase, unmarked) octave.
const SMALL_OCTAVE: i32 = 48;

/// Lowest note of the great (uppercase, unmarked) octave.
const GREAT_OCTAVE: i32 = 36;

/// Lowest note of the contra octave (subscript ₁).
const CONTRA_OCTAVE: i32 = 24;

fn superscript(value: i32) -> String {
    value
        .to_string()
        .chars()
        .filter_map(|digit| digit.to_digit(10))
        .map(|digit| SUPERSCRIPT_DIGITS[digit as usize])
        .collect()
}

/// Octave marker for a piano note.
fn octave_marker(note: i32) -> String {
    if note >= MIDDLE_C {
        superscript((note - MIDDLE_C) / 12 + 1)
    } else if note >= GREAT_OCTAVE {
        String::new()
    } else if note >= CONTRA_OCTAVE {
        "₁".to_string()
    } else {
        "₂".to_string()
    }
}

/// Letter name, uppercase below the small octave.
fn letter(note: i32) -> String {
    let name = NOTE_NAMES[semitone(note)];
    if note < SMALL_OCTAVE {
        name.to_uppercase()
    } else {
        name.to_string()
    }
}

/// Helmholtz-style display name of a note.
///
/// ```
/// use pianokeys::notes::display_name;
///
/// assert_eq!(display_name(60), "c¹");
/// assert_eq!(display_name(61), "c#¹");
/// assert_eq!(display_name(50), "d");
/// assert_eq!(display_name(40), "E");
/// assert_eq!(display_name(21), "A₂");
/// assert_eq!(display_name(7), "7");
/// ```
#[must_use]
pub fn display_name(note: i32) -> String {
    if !is_piano_note(note) {
        return note.to_string();
    }
    format!("{}{}", letter(note), octave_marker(note))
}

/// Scale degree (1–7) of a note, derived from its semitone class alone.
#[must_use]
pub fn solfege_degree(note: i32) -> u8 {
    SOLFEGE_DEGREES[semitone(note)]
}

/// Degree followed by the display name of the diatonic base.
///
/// Chromatic notes get a trailing `#` after the octave marker, so 61 reads
/// as degree 1 on "c¹", raised: `1c¹#`.
#[must_use]
pub fn full_notation(note: i32) -> String {
    if !is_piano_note(note) {
        return note.to_string();
    }

    let base = lower_white_key(note);
    let sharp = if is_black_key(note) { "#" } else { "" };
    format!(
        "{}{}{}{}",
        solfege_degree(note),
        letter(base),
        octave_marker(note),
        sharp
    )
}
