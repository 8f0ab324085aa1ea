//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `annotate`: Resolve translation calls in a file and print the inline
//!   annotations
//! - `keys`: Print the merged translation table as dotted keys
//! - `init`: Initialize a keylens configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Annotate(cmd)) => cmd.common.verbose,
            Some(Command::Keys(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by table-building commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Translation source pattern (overrides config file)
    #[arg(long)]
    pub sources: Option<String>,

    /// Locale substring filter (overrides config file)
    #[arg(long)]
    pub locale: Option<String>,

    /// Comma-separated translation function names (overrides config file)
    #[arg(long)]
    pub functions: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Annotate a source file with resolved translations
    Annotate(AnnotateCommand),
    /// Print the merged translation table as dotted keys
    Keys(KeysCommand),
    /// Initialize a keylens configuration file
    Init,
}

#[derive(Debug, Args)]
pub struct AnnotateCommand {
    /// The file to scan for translation calls
    pub file: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct KeysCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}
