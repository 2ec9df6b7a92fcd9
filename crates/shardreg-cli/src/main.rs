//! shardreg - DNS registry node registration CLI
//!
//! Exits 0 on success, 3 when `add` finds the address already registered,
//! and 1 on any other failure.

use colored::Colorize;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match shardreg_cli::run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "Error:".red().bold());
            if let Some(hint) = shardreg_cli::cli::hint(&err) {
                eprintln!("{} {hint}", "Hint:".yellow().bold());
            }
            ExitCode::from(shardreg_cli::cli::EXIT_FAILURE)
        }
    }
}
