use std::process::ExitCode;

mod cli;
mod config;
mod control;
mod error;
mod events;
mod logging;
mod mpris;
mod recorder;
mod runtime;
mod track;

fn main() -> ExitCode {
    match runtime::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mrec: {e}");
            ExitCode::FAILURE
        }
    }
}
