//! `shardreg config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::OutputFormat;

pub fn execute(ctx: Context, args: ConfigArgs) -> Result<ExitCode> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx)?,
        ConfigCommands::Set { key, value } => set_config(&ctx, &key, &value)?,
        ConfigCommands::Path => println!("{}", ctx.config_path.display()),
    }

    Ok(ExitCode::SUCCESS)
}

fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let mut config = ctx.config.clone();
    config.token = config.token.as_deref().map(mask);

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Pretty => {
            println!("{}", "Current Configuration:".bold());
            println!();

            let unset = || "(not set)".dimmed().to_string();
            let show = |key: &str, value: Option<String>| {
                println!("  {} {}", format!("{key}:").bold(), value.unwrap_or_else(unset));
            };

            show("endpoint", config.endpoint.clone());
            show("token", config.token.clone());
            show("zone_id", config.zone_id.clone());
            show("record_name", config.record_name.clone());
            show("record_type", config.record_type.clone());
            show("ttl", config.ttl.map(|t| t.to_string()));
            show("address_url", config.address_url.clone());
            show("output_format", config.output_format.map(|f| f.to_string()));
            show("retry.max_attempts", config.retry.max_attempts.map(|n| n.to_string()));
            show("retry.delay_unit_ms", config.retry.delay_unit_ms.map(|n| n.to_string()));
        }
    }

    Ok(())
}

fn set_config(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = Config::load(&ctx.config_path)?;
    apply(&mut config, key, value)?;
    config.save(&ctx.config_path)?;

    println!(
        "{} {} set in {}.",
        "Success:".green().bold(),
        key.cyan(),
        ctx.config_path.display()
    );

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let text = Some(value.to_string());

    match key {
        "endpoint" => config.endpoint = text,
        "token" => config.token = text,
        "zone_id" => config.zone_id = text,
        "record_name" => config.record_name = text,
        "record_type" => config.record_type = text,
        "ttl" => config.ttl = Some(value.parse()?),
        "address_url" => config.address_url = text,
        "output_format" | "output" => config.output_format = Some(value.parse()?),
        "retry.max_attempts" => config.retry.max_attempts = Some(value.parse()?),
        "retry.delay_unit_ms" => config.retry.delay_unit_ms = Some(value.parse()?),
        _ => {
            anyhow::bail!(
                "Unknown config key: {}\n\n\
                 Available keys:\n  \
                 endpoint            - Control-plane API base URL\n  \
                 token               - Control-plane API token\n  \
                 zone_id             - Hosted zone holding the registry\n  \
                 record_name         - Registry record name\n  \
                 record_type         - Record type (default A)\n  \
                 ttl                 - Record TTL in seconds (default 60)\n  \
                 address_url         - URL returning this node's public address\n  \
                 output_format       - Default output format (pretty/json)\n  \
                 retry.max_attempts  - Attempts per control-plane call (default 25)\n  \
                 retry.delay_unit_ms - Backoff unit in milliseconds (default 1000)",
                key
            );
        }
    }

    Ok(())
}
