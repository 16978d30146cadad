//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and storage locations.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "PianoKeys";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "pianokeys";

/// Directory name under the platform config directory.
pub const APP_DIR_NAME: &str = "PianoKeys";

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "PIANOKEYS_CONFIG_DIR";

/// Name of the persisted configuration document.
pub const CONFIG_DOCUMENT: &str = "config.json";

/// Theme used when none has been chosen.
pub const DEFAULT_THEME: &str = "light";
