use urleval_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Fall back to stderr if the state dir is unusable.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("urleval error: {:#}", err);
        std::process::exit(1);
    }
}
