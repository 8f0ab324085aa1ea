//! Command-line interface layer.
//!
//! The CLI drives the same engine an editor host would: `annotate` runs one
//! full synchronizer pass against a file, `keys` prints the merged table,
//! `init` writes a default configuration file.

use std::process::ExitCode;

use anyhow::Result;

mod args;
mod report;
mod run;

pub use args::{AnnotateCommand, Arguments, Command, CommonArgs, KeysCommand};

/// Exit status for CLI commands.
///
/// - `Success` (0): command completed (an empty buffer or table is not an
///   error)
/// - `Failure` (1): `annotate` found translation calls but resolved none
/// - `Error` (2): command failed due to an internal error (config error,
///   unreadable file, etc.)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };
    run::run(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_values() {
        let statuses = [ExitStatus::Success, ExitStatus::Failure, ExitStatus::Error];
        for (status, expected) in statuses.into_iter().zip([0u8, 1, 2]) {
            assert_eq!(
                format!("{:?}", ExitCode::from(status)),
                format!("{:?}", ExitCode::from(expected))
            );
        }
    }
}
