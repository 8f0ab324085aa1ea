use std::process::ExitCode;

use clap::Parser;
use keylens::cli::{Arguments, ExitStatus};
use keylens::logger;

fn main() -> ExitCode {
    let args = Arguments::parse();
    logger::init(args.verbose());

    match keylens::cli::run_cli(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}
