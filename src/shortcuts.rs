//! Global playback shortcuts.
//!
//! This module defines the four hotkey actions, the user-configurable
//! shortcut set bound to them, and the hotkey service seam that the
//! playback controller registers against.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::mpsc;
use tracing::debug;

use crate::keymap::{BaseKey, KeyCombo, Modifier};

/// All hotkey actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Toggle play/pause
    StartPause,
    /// Stop playback
    Stop,
    /// Stop, select the previous song, start
    PrevSong,
    /// Stop, select the next song, start
    NextSong,
}

impl Action {
    /// Every action, in registration order.
    pub const ALL: [Self; 4] = [Self::StartPause, Self::Stop, Self::PrevSong, Self::NextSong];

    /// Get the action ID used in the configuration document
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::StartPause => "START_PAUSE",
            Self::Stop => "STOP",
            Self::PrevSong => "PREV_SONG",
            Self::NextSong => "NEXT_SONG",
        }
    }

    /// Short human-readable description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::StartPause => "Start / pause playback",
            Self::Stop => "Stop playback",
            Self::PrevSong => "Previous song",
            Self::NextSong => "Next song",
        }
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    /// Accepts the document ID in any case, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim().to_uppercase().replace('-', "_");
        match Self::ALL.into_iter().find(|action| action.id() == id) {
            Some(action) => Ok(action),
            None => bail!(
                "Unknown action '{s}'. Expected one of: START_PAUSE, STOP, PREV_SONG, NEXT_SONG"
            ),
        }
    }
}

/// Sending half of the channel hotkey presses are delivered on.
pub type ActionSender = mpsc::UnboundedSender<Action>;

/// Receiving half of the hotkey channel.
pub type ActionReceiver = mpsc::UnboundedReceiver<Action>;

/// Creates the channel that connects a hotkey service to the controller.
#[must_use]
pub fn action_channel() -> (ActionSender, ActionReceiver) {
    mpsc::unbounded_channel()
}

/// The four configurable playback shortcuts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortcutSet {
    /// Toggle play/pause
    #[serde(rename = "START_PAUSE")]
    pub start_pause: KeyCombo,
    /// Stop
    #[serde(rename = "STOP")]
    pub stop: KeyCombo,
    /// Previous song
    #[serde(rename = "PREV_SONG")]
    pub prev_song: KeyCombo,
    /// Next song
    #[serde(rename = "NEXT_SONG")]
    pub next_song: KeyCombo,
    /// Unrecognized fields, preserved across saves
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for ShortcutSet {
    fn default() -> Self {
        Self {
            start_pause: KeyCombo::new(&[Modifier::Alt], BaseKey::Equals),
            stop: KeyCombo::new(&[Modifier::Alt], BaseKey::Minus),
            prev_song: KeyCombo::new(&[Modifier::Alt], BaseKey::Up),
            next_song: KeyCombo::new(&[Modifier::Alt], BaseKey::Down),
            extra: serde_json::Map::new(),
        }
    }
}

impl ShortcutSet {
    /// Combo bound to an action.
    #[must_use]
    pub const fn get(&self, action: Action) -> &KeyCombo {
        match action {
            Action::StartPause => &self.start_pause,
            Action::Stop => &self.stop,
            Action::PrevSong => &self.prev_song,
            Action::NextSong => &self.next_song,
        }
    }

    /// Rebinds an action.
    pub fn set(&mut self, action: Action, combo: KeyCombo) {
        match action {
            Action::StartPause => self.start_pause = combo,
            Action::Stop => self.stop = combo,
            Action::PrevSong => self.prev_song = combo,
            Action::NextSong => self.next_song = combo,
        }
    }

    /// All (action, combo) pairs in registration order.
    #[must_use]
    pub fn bindings(&self) -> Vec<(Action, KeyCombo)> {
        Action::ALL
            .into_iter()
            .map(|action| (action, self.get(action).clone()))
            .collect()
    }

    /// Checks that no combo is shared by two actions.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<&KeyCombo, Action> = HashMap::new();
        for action in Action::ALL {
            let combo = self.get(action);
            if combo.is_unbound() {
                continue;
            }
            if let Some(other) = seen.insert(combo, action) {
                bail!(
                    "Shortcut '{}' is bound to both {} and {}",
                    combo,
                    other.id(),
                    action.id()
                );
            }
        }
        Ok(())
    }
}

/// A facility that turns global key presses into actions.
///
/// Registration is all-or-nothing: changing shortcuts means
/// [`unregister_all`](Self::unregister_all) followed by a fresh
/// [`register`](Self::register).
pub trait HotkeyService {
    /// Registers every bound action; presses are sent on `sink`.
    fn register(&mut self, bindings: &[(Action, KeyCombo)], sink: ActionSender) -> Result<()>;

    /// Drops every registration made by this service.
    fn unregister_all(&mut self) -> Result<()>;
}

/// In-process hotkey registry.
///
/// Maps combos to actions and forwards simulated presses to the registered
/// sink. Useful for embedding behind a platform key hook and in tests.
#[derive(Debug, Default)]
pub struct ShortcutRegistry {
    /// Maps key combo to Action
    bindings: HashMap<KeyCombo, Action>,
    sink: Option<ActionSender>,
}

impl ShortcutRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a registration is active.
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        self.sink.is_some()
    }

    /// Look up the action bound to a combo.
    #[must_use]
    pub fn lookup(&self, combo: &KeyCombo) -> Option<Action> {
        self.bindings.get(combo).copied()
    }

    /// Check if a combo triggers a specific action.
    #[must_use]
    pub fn matches(&self, combo: &KeyCombo, action: Action) -> bool {
        self.lookup(combo) == Some(action)
    }

    /// Handles a key press, forwarding the bound action (if any) to the sink.
    pub fn press(&self, combo: &KeyCombo) -> Option<Action> {
        let action = self.lookup(combo)?;
        let sink = self.sink.as_ref()?;
        sink.send(action).ok()?;
        debug!(action = action.id(), combo = %combo, "Hotkey pressed");
        Some(action)
    }
}

impl HotkeyService for ShortcutRegistry {
    fn register(&mut self, bindings: &[(Action, KeyCombo)], sink: ActionSender) -> Result<()> {
        if self.is_registered() {
            bail!("Shortcuts are already registered; unregister them first");
        }

        let mut registered = HashMap::new();
        for (action, combo) in bindings {
            if combo.is_unbound() {
                debug!(action = action.id(), "Skipping unbound shortcut");
                continue;
            }
            if let Some(other) = registered.insert(combo.clone(), *action) {
                bail!(
                    "Shortcut '{}' is bound to both {} and {}",
                    combo,
                    other.id(),
                    action.id()
                );
            }
        }

        self.bindings = registered;
        self.sink = Some(sink);
        Ok(())
    }

    fn unregister_all(&mut self) -> Result<()> {
        self.bindings.clear();
        self.sink = None;
        Ok(())
    }
}
