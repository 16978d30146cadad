//! CLI command handlers for PianoKeys.
//!
//! These commands give scriptable access to the note catalog, the key
//! binding tables and the persisted configuration.

pub mod common;
pub mod config;
pub mod mapping;
pub mod notes;

pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use mapping::MappingArgs;
pub use notes::NotesArgs;
