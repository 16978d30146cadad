//! Note table command.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::{ConfigStore, KeySettings};
use crate::constants::APP_BINARY_NAME;
use crate::notes::{
    display_name, filter_by_groups, full_notation, group_for_note, NoteTagged, HIGHEST_NOTE,
    LOWEST_NOTE, NOTE_GROUPS,
};
use crate::storage::FsBlobStore;
use clap::Args;
use serde::Serialize;

/// List piano notes with their names and key bindings
#[derive(Debug, Clone, Args)]
pub struct NotesArgs {
    /// Only show notes in this group (repeatable, e.g. "小字组 (c-b)")
    #[arg(short, long = "group", value_name = "NAME")]
    pub groups: Vec<String>,

    /// List the group names instead of notes
    #[arg(long)]
    pub list_groups: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct NoteRow {
    note: i32,
    group: String,
    display: String,
    notation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
}

impl NoteTagged for NoteRow {
    fn note(&self) -> Option<i32> {
        Some(self.note)
    }
}

impl NotesArgs {
    /// Execute the notes command
    pub fn execute(&self) -> CliResult<()> {
        if self.list_groups {
            return self.print_groups();
        }

        let unknown: Vec<&String> = self
            .groups
            .iter()
            .filter(|name| !NOTE_GROUPS.iter().any(|group| group.name == name.as_str()))
            .collect();
        if !unknown.is_empty() && unknown.len() == self.groups.len() {
            return Err(CliError::validation(format!(
                "Unknown note group(s): {}. Run `{} notes --list-groups` to see valid names",
                unknown
                    .iter()
                    .map(|name| name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                APP_BINARY_NAME
            )));
        }

        let store = FsBlobStore::from_env()
            .map_err(|e| CliError::io(format!("Failed to locate configuration: {e}")))?;
        let mut config = ConfigStore::new(store);
        let rows = filter_by_groups(note_rows(&config.load().key_settings), &self.groups);

        if self.json {
            print_json(&rows)
        } else {
            for row in &rows {
                println!(
                    "{:>3}  {:<6} {:<7} {:<12} {}",
                    row.note,
                    row.display,
                    row.notation,
                    row.key.as_deref().unwrap_or("-"),
                    row.group
                );
            }
            Ok(())
        }
    }

    fn print_groups(&self) -> CliResult<()> {
        if self.json {
            return print_json(&NOTE_GROUPS);
        }
        for group in &NOTE_GROUPS {
            println!("{:>3}-{:<3}  {}", group.low, group.high, group.name);
        }
        Ok(())
    }
}

fn note_rows(settings: &KeySettings) -> Vec<NoteRow> {
    (LOWEST_NOTE..=HIGHEST_NOTE)
        .map(|note| NoteRow {
            note,
            group: group_for_note(note)
                .map(|group| group.name.to_string())
                .unwrap_or_default(),
            display: display_name(note),
            notation: full_notation(note),
            key: settings
                .note_to_key
                .resolve(note, settings.black_key_mode)
                .map(ToString::to_string),
        })
        .collect()
}
