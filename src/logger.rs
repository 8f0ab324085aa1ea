//! Diagnostic logging for the keylens binary.
//!
//! All engine diagnostics go through the `log` macros; the binary wires them
//! to stderr here. Load failures are warnings, skipped sources and sandbox
//! console output are debug lines.

use fern::Dispatch;
use log::LevelFilter;

pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let result = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply();

    if let Err(err) = result {
        eprintln!("Failed to initialize logger: {}", err);
    }
}
