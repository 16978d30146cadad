//! Tests for the note catalog, group filtering and key translation.

use pianokeys::config::KeySettings;
use pianokeys::keymap::translate::translate;
use pianokeys::keymap::{BlackKeyMode, KeyBindingTable};
use pianokeys::notes::{
    display_name, filter_by_groups, full_notation, group_for_note, is_black_key, NoteEvent,
    HIGHEST_NOTE, LOWEST_NOTE, NOTE_GROUPS,
};

fn events(notes: &[i32]) -> Vec<NoteEvent> {
    notes
        .iter()
        .enumerate()
        .map(|(i, note)| NoteEvent::new(*note, i as f64 * 0.5, 0.25))
        .collect()
}

#[test]
fn test_every_piano_note_has_exactly_one_group() {
    for note in LOWEST_NOTE..=HIGHEST_NOTE {
        let owners = NOTE_GROUPS.iter().filter(|group| group.contains(note)).count();
        assert_eq!(owners, 1, "note {note} belongs to {owners} groups");
        assert!(group_for_note(note).is_some());
    }
}

#[test]
fn test_every_piano_note_has_a_name() {
    for note in LOWEST_NOTE..=HIGHEST_NOTE {
        let name = display_name(note);
        assert_ne!(name, note.to_string(), "note {note} has no name");
        assert_eq!(full_notation(note).ends_with('#'), is_black_key(note));
    }
}

#[test]
fn test_middle_octave_notation() {
    let names: Vec<String> = (60..72).map(full_notation).collect();
    assert_eq!(
        names,
        vec![
            "1c¹", "1c¹#", "2d¹", "2d¹#", "3e¹", "4f¹", "4f¹#", "5g¹", "5g¹#", "6a¹", "6a¹#",
            "7b¹"
        ]
    );
}

#[test]
fn test_empty_selection_keeps_everything() {
    let input = events(&[21, 60, 108]);
    let mut with_marker = input.clone();
    with_marker.push(NoteEvent {
        note: None,
        channel: 9,
        time: 2.0,
        duration: 0.0,
    });

    let none: [&str; 0] = [];
    assert_eq!(filter_by_groups(with_marker.clone(), &none), with_marker);
}

#[test]
fn test_filter_by_small_group() {
    let mut input = events(&[47, 48, 55, 59, 60, 72]);
    input.insert(
        2,
        NoteEvent {
            note: None,
            channel: 9,
            time: 0.75,
            duration: 0.0,
        },
    );
    let filtered = filter_by_groups(input, &["小字组 (c-b)"]);

    // Events without a note are dropped once a group is selected
    assert_eq!(filtered.len(), 3);
    let notes: Vec<Option<i32>> = filtered.iter().map(|event| event.note).collect();
    assert_eq!(notes, vec![Some(48), Some(55), Some(59)]);
}

#[test]
fn test_filter_by_several_groups_ignores_unknown_names() {
    let input = events(&[30, 60, 84, 108]);
    let filtered = filter_by_groups(
        input,
        &["大字一组 (C₁-B₁)".to_string(), "bogus".to_string(), "小字五组 (c⁵)".to_string()],
    );

    let notes: Vec<i32> = filtered.iter().filter_map(|event| event.note).collect();
    assert_eq!(notes, vec![30, 108]);
}

#[test]
fn test_translate_respects_range_and_mode() {
    let settings = KeySettings {
        min_note: 60,
        max_note: 71,
        black_key_mode: BlackKeyMode::None,
        ..KeySettings::default()
    };

    let keys = translate(&events(&[59, 60, 61, 72]), &settings);
    let pressed: Vec<&str> = keys.iter().map(|key| key.key.as_str()).collect();
    assert_eq!(pressed, vec!["a", "a"]);
}

#[test]
fn test_translate_with_blank_table_presses_nothing() {
    let settings = KeySettings {
        note_to_key: KeyBindingTable::empty_mapping(),
        ..KeySettings::default()
    };
    assert!(translate(&events(&[60, 61, 62]), &settings).is_empty());
}
