//! PianoKeys - play piano notes on a computer keyboard
//!
//! Command-line access to the note catalog, key binding tables and the
//! persisted configuration.

use clap::{Parser, Subcommand};
use pianokeys::cli::{CliResult, ConfigArgs, MappingArgs, NotesArgs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// PianoKeys - play piano notes on a computer keyboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List piano notes with names, groups and key bindings
    Notes(NotesArgs),
    /// Print the default or blank note-to-key binding table
    Mapping(MappingArgs),
    /// Show or change the persisted configuration
    Config(ConfigArgs),
}

impl Command {
    fn execute(&self) -> CliResult<()> {
        match self {
            Self::Notes(args) => args.execute(),
            Self::Mapping(args) => args.execute(),
            Self::Config(args) => args.execute(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = cli.command.execute() {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
}
