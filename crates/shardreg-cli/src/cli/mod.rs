//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use shardreg::RegistryError;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::output::OutputFormat;

/// Exit status for any failure.
pub const EXIT_FAILURE: u8 = 1;

/// Exit status when `add` finds the address already registered.
pub const EXIT_ALREADY_REGISTERED: u8 = 3;

/// Run the CLI application.
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;

    // Determine output format
    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Pretty);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Create context for commands
    let ctx = commands::Context {
        registry: cli.registry,
        config,
        config_path,
        output_format,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Add(args) => commands::add::execute(ctx, args).await,
        Commands::Remove(args) => commands::remove::execute(ctx, args).await,
        Commands::Members(args) => commands::members::execute(ctx, args).await,
        Commands::Shard(args) => commands::shard::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args),
    }
}

/// Suggest a next step for failures the user can act on.
#[must_use]
pub fn hint(err: &anyhow::Error) -> Option<&'static str> {
    let registry = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<RegistryError>())?;

    if registry.is_auth_error() {
        Some("check the control-plane token (--token, SHARDREG_TOKEN or `shardreg config set token`)")
    } else if registry.is_exhausted() {
        Some("the control plane kept failing; run the command again later or raise retry.max_attempts")
    } else {
        None
    }
}

/// Log to stderr; `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;

    fn failed(err: RegistryError) -> anyhow::Error {
        Err::<(), _>(err)
            .context("Registration of 10.0.0.5 in svc.example._65 failed")
            .unwrap_err()
    }

    #[test]
    fn test_hint_for_rejected_token() {
        let hint = hint(&failed(RegistryError::Unauthorized)).unwrap();
        assert!(hint.contains("token"));
    }

    #[test]
    fn test_hint_for_exhausted_retries() {
        let err = failed(RegistryError::RetryBudgetExhausted {
            operation: "list",
            attempts: 25,
            source: Box::new(RegistryError::Timeout("list".into())),
        });
        assert!(hint(&err).unwrap().contains("retry.max_attempts"));
    }

    #[test]
    fn test_no_hint_for_other_failures() {
        assert!(hint(&failed(RegistryError::InvalidAddress("x".into()))).is_none());
        assert!(hint(&anyhow::anyhow!("missing endpoint")).is_none());
    }
}
