//! The main entry point for the program.
use human_panic::setup_panic;
use lcoe_eval::cli::run_cli;
use lcoe_eval::log::is_logger_initialised;
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    setup_panic!();

    if let Err(err) = run_cli() {
        // The logger may not have been set up yet if the error occurred early on
        if is_logger_initialised() {
            error!("{err:?}");
        } else {
            eprintln!("Error: {err:?}");
        }

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
