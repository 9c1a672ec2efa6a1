use hprobe_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Logging must never hold up the probes; init_logging falls back to stderr.
    if let Err(err) = logging::init_logging() {
        eprintln!("hprobe: {:#}", err);
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("hprobe error: {:#}", err);
        std::process::exit(1);
    }
}
