//! Compo CLI - Package manager for platform-specific modules and widgets

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = compo::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
