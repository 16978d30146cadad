//! Per-note keyboard bindings.
//!
//! This module maps piano notes to keyboard actions. The default table
//! covers three one-octave registers (48–83); chromatic notes are reached
//! through modifier chords that approximate them from a neighbouring
//! diatonic key.

pub mod combo;
pub mod translate;

pub use combo::{BaseKey, KeyCombo, Modifier};
pub use translate::{translate, KeyEvent};

use crate::notes::{is_black_key, lower_white_key};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// First note covered by the default and blank tables.
pub const MAPPING_LOW: i32 = 48;

/// Last note covered by the default and blank tables.
pub const MAPPING_HIGH: i32 = 83;

/// Base notes and the seven diatonic keys of each default register.
const REGISTERS: [(i32, [char; 7]); 3] = [
    (48, ['z', 'x', 'c', 'v', 'b', 'n', 'm']),
    (60, ['a', 's', 'd', 'f', 'g', 'h', 'j']),
    (72, ['q', 'w', 'e', 'r', 't', 'y', 'u']),
];

/// How each semitone of a register is reached, by diatonic degree index.
#[derive(Debug, Clone, Copy)]
enum Reach {
    /// Plain key of this degree
    Plain(usize),
    /// Shift + key of the degree below (sharp approximation)
    Sharp(usize),
    /// Ctrl + key of the degree above (flat approximation)
    Flat(usize),
}

const SEMITONE_REACH: [Reach; 12] = [
    Reach::Plain(0),
    Reach::Sharp(0),
    Reach::Plain(1),
    Reach::Flat(2),
    Reach::Plain(2),
    Reach::Plain(3),
    Reach::Sharp(3),
    Reach::Plain(4),
    Reach::Sharp(4),
    Reach::Plain(5),
    Reach::Flat(6),
    Reach::Plain(6),
];

/// Whether (and how) the target can play chromatic notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlackKeyMode {
    /// Target has no black keys; every chromatic note falls to the white key below
    None,
    /// Every chromatic note is looked up directly
    All,
    /// Chromatic notes are looked up directly, falling back to the white key
    /// below when they have no binding
    Selective,
    /// Chromatic notes are played through their chord bindings
    #[default]
    SupportBlackKey,
}

impl BlackKeyMode {
    /// All modes, in display order.
    pub const ALL: [Self; 4] = [Self::None, Self::All, Self::Selective, Self::SupportBlackKey];

    /// Identifier used in the configuration document.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::All => "all",
            Self::Selective => "selective",
            Self::SupportBlackKey => "support_black_key",
        }
    }

    /// Parses a configuration identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.id() == id)
    }
}

/// Mapping from note number to keyboard action.
///
/// Serialized as a JSON object keyed by the note number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyBindingTable {
    bindings: BTreeMap<i32, KeyCombo>,
}

impl KeyBindingTable {
    /// The built-in three-register table.
    #[must_use]
    pub fn default_mapping() -> Self {
        let mut bindings = BTreeMap::new();

        for (base, letters) in REGISTERS {
            for (offset, reach) in SEMITONE_REACH.iter().enumerate() {
                let combo = match *reach {
                    Reach::Plain(degree) => KeyCombo::letter(None, letters[degree]),
                    Reach::Sharp(degree) => KeyCombo::letter(Some(Modifier::Shift), letters[degree]),
                    Reach::Flat(degree) => KeyCombo::letter(Some(Modifier::Ctrl), letters[degree]),
                };
                bindings.insert(base + offset as i32, combo);
            }
        }

        Self { bindings }
    }

    /// Same domain as [`default_mapping`](Self::default_mapping), all unbound.
    #[must_use]
    pub fn empty_mapping() -> Self {
        let bindings = (MAPPING_LOW..=MAPPING_HIGH)
            .map(|note| (note, KeyCombo::unbound()))
            .collect();
        Self { bindings }
    }

    /// Raw binding for a note, unbound entries included.
    #[must_use]
    pub fn get(&self, note: i32) -> Option<&KeyCombo> {
        self.bindings.get(&note)
    }

    /// Sets (or replaces) the binding for a note.
    pub fn set(&mut self, note: i32, combo: KeyCombo) {
        self.bindings.insert(note, combo);
    }

    /// Iterates bindings in note order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &KeyCombo)> {
        self.bindings.iter().map(|(note, combo)| (*note, combo))
    }

    /// Number of entries (bound or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolves the action to play for `note` under `mode`.
    ///
    /// Substitution is a remap of the note value; the table itself is never
    /// rewritten. Returns `None` when the (possibly remapped) note has no
    /// usable binding.
    #[must_use]
    pub fn resolve(&self, note: i32, mode: BlackKeyMode) -> Option<&KeyCombo> {
        let bound = |note: i32| self.get(note).filter(|combo| !combo.is_unbound());

        if !is_black_key(note) {
            return bound(note);
        }

        match mode {
            BlackKeyMode::None => bound(lower_white_key(note)),
            BlackKeyMode::Selective => bound(note).or_else(|| bound(lower_white_key(note))),
            BlackKeyMode::All | BlackKeyMode::SupportBlackKey => bound(note),
        }
    }
}

// Keys arrive as strings ("60"). Parsing them here keeps the table readable
// from inside flattened parents, where serde buffers keys as plain strings.
impl<'de> Deserialize<'de> for KeyBindingTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, KeyCombo>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(note, combo)| {
                note.trim()
                    .parse::<i32>()
                    .map(|note| (note, combo))
                    .map_err(|_| D::Error::custom(format!("invalid note number '{note}'")))
            })
            .collect()
    }
}

impl FromIterator<(i32, KeyCombo)> for KeyBindingTable {
    fn from_iter<I: IntoIterator<Item = (i32, KeyCombo)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}
