//! Key binding table command.

use crate::cli::common::{print_json, CliResult};
use crate::keymap::KeyBindingTable;
use crate::notes::{display_name, is_black_key};
use clap::Args;

/// Print the built-in note-to-key binding table
#[derive(Debug, Clone, Args)]
pub struct MappingArgs {
    /// Print the blank table (every note unbound) instead of the default
    #[arg(long)]
    pub empty: bool,

    /// Output as JSON (the `noteToKey` document shape)
    #[arg(long)]
    pub json: bool,
}

impl MappingArgs {
    /// Execute the mapping command
    pub fn execute(&self) -> CliResult<()> {
        let table = if self.empty {
            KeyBindingTable::empty_mapping()
        } else {
            KeyBindingTable::default_mapping()
        };

        if self.json {
            return print_json(&table);
        }

        for (note, combo) in table.iter() {
            let marker = if is_black_key(note) { "#" } else { " " };
            let combo = if combo.is_unbound() {
                "-".to_string()
            } else {
                combo.to_string()
            };
            println!("{note:>3} {marker} {:<6} {combo}", display_name(note));
        }
        Ok(())
    }
}
