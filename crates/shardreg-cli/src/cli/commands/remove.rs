//! `shardreg remove` - Deregister this node.

use anyhow::{Context as _, Result};
use colored::Colorize;
use shardreg::RemoveOutcome;
use std::process::ExitCode;

use super::Context;
use crate::cli::args::AddressArgs;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: AddressArgs) -> Result<ExitCode> {
    let controller = ctx.controller()?;
    let address = ctx.address(args.address).await?;
    let key = controller.key_for(address);

    let outcome = controller
        .remove(address)
        .await
        .with_context(|| format!("Deregistration of {address} from {key} failed"))?;

    match ctx.output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "action": "remove",
                    "address": address,
                    "shard": key.shard,
                    "set_identifier": key.set_identifier(),
                    "outcome": outcome,
                })
            );
        }
        OutputFormat::Pretty => {
            let address = address.to_string().cyan();
            let key = key.to_string().bold();
            match outcome {
                RemoveOutcome::Removed => {
                    println!("{} {address} from {key}", "Removed".green().bold());
                }
                RemoveOutcome::RecordDeleted => {
                    println!(
                        "{} {address} from {key} (last member, record set deleted)",
                        "Removed".green().bold()
                    );
                }
                RemoveOutcome::NotRegistered => {
                    println!("{} {address} is not present in {key}", "Skipped:".dimmed());
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
