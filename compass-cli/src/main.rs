//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use compass_cli::CliError;

fn main() {
    match compass_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("compass: {err}");
            std::process::exit(1);
        }
    }
}
