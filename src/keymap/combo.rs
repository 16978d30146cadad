//! Key combination grammar.
//!
//! A combo is written `(modifier "+")* basekey`, with modifiers drawn from
//! `ctrl`, `alt` and `shift` and normalized to that order. The base key is a
//! single letter, `-`, `=`, `up` or `down`. The empty string is the unbound
//! marker.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keyboard modifier. The derive order is the canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    /// Control (Command on macOS when injected)
    Ctrl,
    /// Alt / Option
    Alt,
    /// Shift
    Shift,
}

impl Modifier {
    /// Token used in combo strings.
    #[must_use]
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Ctrl => "ctrl",
            Self::Alt => "alt",
            Self::Shift => "shift",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "ctrl" | "control" => Some(Self::Ctrl),
            "alt" => Some(Self::Alt),
            "shift" => Some(Self::Shift),
            _ => None,
        }
    }
}

/// The non-modifier part of a combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseKey {
    /// A lowercase letter
    Char(char),
    /// `-`
    Minus,
    /// `=`
    Equals,
    /// Arrow up
    Up,
    /// Arrow down
    Down,
}

impl BaseKey {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "-" => Some(Self::Minus),
            "=" => Some(Self::Equals),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_lowercase() => Some(Self::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

impl fmt::Display for BaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::Minus => write!(f, "-"),
            Self::Equals => write!(f, "="),
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// A keyboard action: modifiers plus one base key, or unbound.
///
/// Serialized as its combo string, e.g. `"shift+z"`, or `""` when unbound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCombo {
    /// Sorted, deduplicated modifiers
    modifiers: Vec<Modifier>,
    /// `None` only for the unbound marker
    key: Option<BaseKey>,
}

impl KeyCombo {
    /// The unbound marker.
    #[must_use]
    pub const fn unbound() -> Self {
        Self {
            modifiers: Vec::new(),
            key: None,
        }
    }

    /// A combo with no modifiers.
    #[must_use]
    pub fn plain(key: BaseKey) -> Self {
        Self::new(&[], key)
    }

    /// A combo with the given modifiers, normalized to canonical order.
    #[must_use]
    pub fn new(modifiers: &[Modifier], key: BaseKey) -> Self {
        let mut modifiers = modifiers.to_vec();
        modifiers.sort_unstable();
        modifiers.dedup();
        Self {
            modifiers,
            key: Some(key),
        }
    }

    /// Shorthand for a letter with at most one modifier.
    #[must_use]
    pub fn letter(modifier: Option<Modifier>, letter: char) -> Self {
        let key = BaseKey::Char(letter.to_ascii_lowercase());
        match modifier {
            Some(modifier) => Self::new(&[modifier], key),
            None => Self::plain(key),
        }
    }

    /// Returns true for the unbound marker.
    #[must_use]
    pub const fn is_unbound(&self) -> bool {
        self.key.is_none()
    }

    /// Modifiers in canonical order.
    #[must_use]
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// The base key, if bound.
    #[must_use]
    pub const fn key(&self) -> Option<BaseKey> {
        self.key
    }
}

impl FromStr for KeyCombo {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        if normalized.is_empty() {
            return Ok(Self::unbound());
        }

        // "ctrl+-" and "alt+=" split cleanly; only a trailing "+" is suspect.
        let parts: Vec<&str> = normalized.split('+').collect();
        let Some((base, modifier_tokens)) = parts.split_last() else {
            bail!("Empty key combo");
        };

        let mut modifiers = Vec::with_capacity(modifier_tokens.len());
        for token in modifier_tokens {
            let Some(modifier) = Modifier::parse(token) else {
                bail!("Unknown modifier '{token}' in key combo '{s}'");
            };
            if modifiers.contains(&modifier) {
                bail!("Duplicate modifier '{token}' in key combo '{s}'");
            }
            modifiers.push(modifier);
        }

        let Some(key) = BaseKey::parse(base) else {
            bail!("Invalid base key '{base}' in key combo '{s}'");
        };

        Ok(Self::new(&modifiers, key))
    }
}

impl TryFrom<String> for KeyCombo {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<KeyCombo> for String {
    fn from(combo: KeyCombo) -> Self {
        combo.to_string()
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(key) = self.key else {
            return Ok(());
        };
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.token())?;
        }
        write!(f, "{key}")
    }
}
