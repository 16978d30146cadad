//! PianoKeys library
//!
//! Core functionality for playing piano music on a computer keyboard:
//! the 88-key note catalog, note-to-key binding tables, the persisted
//! user configuration, and the hotkey-driven playback controller.

pub mod cli;
pub mod config;
pub mod constants;
pub mod keymap;
pub mod notes;
pub mod playback;
pub mod shortcuts;
pub mod storage;
