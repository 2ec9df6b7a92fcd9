//! `shardreg members` - Show the members of a shard.

use anyhow::Result;
use colored::Colorize;
use shardreg::shard;
use std::process::ExitCode;

use super::Context;
use crate::cli::args::MembersArgs;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: MembersArgs) -> Result<ExitCode> {
    let controller = ctx.controller()?;

    let shard = match args.shard {
        Some(shard) => shard,
        None => shard::assign(ctx.address(args.address).await?),
    };
    let key = controller.config().key(shard);
    let members = controller.members_of(shard).await?;

    match ctx.output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "shard": shard,
                    "set_identifier": key.set_identifier(),
                    "members": members,
                }))?
            );
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} ({} members)",
                "Shard".bold(),
                key.to_string().cyan(),
                members.len()
            );
            if members.is_empty() {
                println!("  {}", "(no record set)".dimmed());
            }
            for member in &members {
                println!("  {member}");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
