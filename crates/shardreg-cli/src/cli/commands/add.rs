//! `shardreg add` - Register this node.

use anyhow::{Context as _, Result};
use colored::Colorize;
use shardreg::AddOutcome;
use std::process::ExitCode;

use super::Context;
use crate::cli::args::AddressArgs;
use crate::cli::EXIT_ALREADY_REGISTERED;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: AddressArgs) -> Result<ExitCode> {
    let controller = ctx.controller()?;
    let address = ctx.address(args.address).await?;
    let key = controller.key_for(address);

    let outcome = controller
        .add(address)
        .await
        .with_context(|| format!("Registration of {address} in {key} failed"))?;

    match ctx.output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "action": "add",
                    "address": address,
                    "shard": key.shard,
                    "set_identifier": key.set_identifier(),
                    "outcome": outcome,
                })
            );
        }
        OutputFormat::Pretty => match outcome {
            AddOutcome::Registered => {
                println!(
                    "{} {} in {}",
                    "Registered".green().bold(),
                    address.to_string().cyan(),
                    key.to_string().bold()
                );
            }
            AddOutcome::AlreadyRegistered => {
                println!(
                    "{} {} is already registered in {}",
                    "Exists:".yellow().bold(),
                    address.to_string().cyan(),
                    key.to_string().bold()
                );
            }
        },
    }

    Ok(match outcome {
        AddOutcome::Registered => ExitCode::SUCCESS,
        AddOutcome::AlreadyRegistered => ExitCode::from(EXIT_ALREADY_REGISTERED),
    })
}
