//! `shardreg shard` - Show which shard an address belongs to.

use anyhow::Result;
use colored::Colorize;
use shardreg::{shard, RecordSetKey};
use std::process::ExitCode;

use super::Context;
use crate::cli::args::ShardArgs;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: ShardArgs) -> Result<ExitCode> {
    let address = ctx.address(args.address).await?;
    let shard = shard::assign(address);
    let set_identifier = ctx
        .record_name()
        .map(|name| RecordSetKey::new(name, shard).set_identifier());

    match ctx.output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "address": address,
                    "shard": shard,
                    "set_identifier": set_identifier,
                })
            );
        }
        OutputFormat::Pretty => {
            let suffix = set_identifier.map(|id| format!(" ({id})")).unwrap_or_default();
            println!(
                "{} {} -> {}{suffix}",
                "Shard:".bold(),
                address.to_string().cyan(),
                shard.to_string().green().bold()
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
