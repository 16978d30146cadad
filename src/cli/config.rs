//! Configuration management CLI commands.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::{AppConfig, ConfigPatch, ConfigStore};
use crate::constants::{APP_NAME, CONFIG_DOCUMENT};
use crate::keymap::{BlackKeyMode, KeyCombo};
use crate::notes::{display_name, is_piano_note};
use crate::shortcuts::Action;
use crate::storage::FsBlobStore;
use clap::{Args, Subcommand};

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Print the configuration file location
    Path,
    /// Bind a shortcut to an action (START_PAUSE, STOP, PREV_SONG, NEXT_SONG)
    SetShortcut {
        /// Action ID
        action: String,
        /// Key combo such as "alt+=" or "ctrl+shift+s"; empty to unbind
        combo: String,
    },
    /// Set the playable note range (inclusive)
    SetRange {
        /// Lowest note number
        min: i32,
        /// Highest note number
        max: i32,
    },
    /// Set how black keys are played (none, all, selective, support_black_key)
    SetBlackKeyMode {
        /// Mode ID
        mode: String,
    },
    /// Set the UI theme name
    SetTheme {
        /// Theme name
        name: String,
    },
    /// Restore every setting to its default
    Reset,
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        let store = FsBlobStore::from_env()
            .map_err(|e| CliError::io(format!("Failed to locate configuration: {e}")))?;

        match &self.command {
            ConfigCommand::Show(args) => args.execute(store),
            ConfigCommand::Path => {
                println!("{}", store.path_of(CONFIG_DOCUMENT).display());
                Ok(())
            }
            ConfigCommand::SetShortcut { action, combo } => {
                let action: Action = action
                    .parse()
                    .map_err(|e| CliError::validation(format!("{e}")))?;
                let combo: KeyCombo = combo
                    .parse()
                    .map_err(|e| CliError::validation(format!("Invalid key combo: {e}")))?;
                apply(store, &ConfigPatch::default().shortcut(action, combo))?;
                println!("✓ {} set", action.id());
                Ok(())
            }
            ConfigCommand::SetRange { min, max } => {
                for note in [min, max] {
                    if !is_piano_note(*note) {
                        return Err(CliError::validation(format!(
                            "Note {note} is outside the piano range 21-108"
                        )));
                    }
                }
                apply(store, &ConfigPatch::default().note_range(*min, *max))?;
                println!(
                    "✓ Note range set to {} ({}) - {} ({})",
                    min,
                    display_name(*min),
                    max,
                    display_name(*max)
                );
                Ok(())
            }
            ConfigCommand::SetBlackKeyMode { mode } => {
                let id = mode.trim().to_lowercase().replace('-', "_");
                let mode = BlackKeyMode::from_id(&id).ok_or_else(|| {
                    CliError::validation(format!(
                        "Invalid black key mode '{mode}'. Use none, all, selective or support_black_key"
                    ))
                })?;
                apply(store, &ConfigPatch::default().black_key_mode(mode))?;
                println!("✓ Black key mode set to {}", mode.id());
                Ok(())
            }
            ConfigCommand::SetTheme { name } => {
                if name.trim().is_empty() {
                    return Err(CliError::validation("Theme name must not be empty"));
                }
                apply(store, &ConfigPatch::default().theme(name.trim()))?;
                println!("✓ Theme set to {}", name.trim());
                Ok(())
            }
            ConfigCommand::Reset => {
                let mut config = ConfigStore::new(store);
                config.reset();
                ensure_persisted(&config)?;
                println!("✓ Configuration reset to defaults");
                Ok(())
            }
        }
    }
}

impl ConfigShowArgs {
    fn execute(&self, store: FsBlobStore) -> CliResult<()> {
        let mut config = ConfigStore::new(store);
        config.load();

        if self.json {
            print_json(config.current())?;
        } else {
            println!(
                "{APP_NAME} configuration ({})",
                config.blob_store().path_of(CONFIG_DOCUMENT).display()
            );
            println!();
            print_human(config.current());
        }
        ensure_persisted(&config)
    }
}

/// Merges `patch` into the stored configuration.
fn apply(store: FsBlobStore, patch: &ConfigPatch) -> CliResult<()> {
    let mut config = ConfigStore::new(store);
    config
        .save(patch)
        .map_err(|e| CliError::validation(format!("{e:#}")))?;
    ensure_persisted(&config)
}

/// The store logs write failures and carries on; a command must not.
fn ensure_persisted(config: &ConfigStore<FsBlobStore>) -> CliResult<()> {
    if config.is_dirty() {
        Err(CliError::io(format!(
            "Failed to write {}",
            config.blob_store().path_of(CONFIG_DOCUMENT).display()
        )))
    } else {
        Ok(())
    }
}

fn print_human(config: &AppConfig) {
    let keys = &config.key_settings;
    println!("Key Settings:");
    println!(
        "  Note range:      {} ({}) - {} ({})",
        keys.min_note,
        display_name(keys.min_note),
        keys.max_note,
        display_name(keys.max_note)
    );
    println!("  Black key mode:  {}", keys.black_key_mode.id());
    let bound = keys
        .note_to_key
        .iter()
        .filter(|(_, combo)| !combo.is_unbound())
        .count();
    println!("  Bound notes:     {bound}/{}", keys.note_to_key.len());
    println!();

    println!("Shortcuts:");
    for (action, combo) in config.shortcuts.bindings() {
        let combo = if combo.is_unbound() {
            "(unbound)".to_string()
        } else {
            combo.to_string()
        };
        println!("  {:<12} {:<14} {}", action.id(), combo, action.description());
    }
    println!();

    println!("Theme:");
    println!("  {}", config.theme_settings.current_theme);
}
