//! Command-line argument definitions using clap.

use clap::{ArgAction, Args, Parser, Subcommand};
use shardreg::ShardId;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Register this node in a sharded DNS registry
///
/// Each node advertises its own address under a shared record name,
/// spread over 100 weighted record sets. Run `add` on startup and
/// `remove` on shutdown.
#[derive(Parser, Debug)]
#[command(name = "shardreg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Path to the config file
    #[arg(long, env = "SHARDREG_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the registry lives. Unset values fall back to the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct RegistryArgs {
    /// Registry record name (e.g. svc.example.)
    #[arg(long, env = "SHARDREG_RECORD_NAME", global = true)]
    pub record_name: Option<String>,

    /// Record type of the registry entries
    #[arg(long, env = "SHARDREG_RECORD_TYPE", global = true)]
    pub record_type: Option<String>,

    /// Record TTL in seconds
    #[arg(long, env = "SHARDREG_TTL", global = true)]
    pub ttl: Option<u32>,

    /// Hosted zone holding the registry
    #[arg(long, env = "SHARDREG_ZONE_ID", global = true)]
    pub zone_id: Option<String>,

    /// Control-plane API base URL
    #[arg(long, env = "SHARDREG_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Control-plane API token
    #[arg(long, env = "SHARDREG_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register this node's address
    Add(AddressArgs),

    /// Deregister this node's address
    Remove(AddressArgs),

    /// Show the members of a shard
    Members(MembersArgs),

    /// Show which shard an address belongs to
    Shard(ShardArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Add / remove commands
// ============================================================================

#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Use this address instead of discovering the public one
    #[arg(long, visible_alias = "testing-ip")]
    pub address: Option<Ipv4Addr>,
}

// ============================================================================
// Members command
// ============================================================================

#[derive(Args, Debug)]
pub struct MembersArgs {
    /// Show the shard this address belongs to
    #[arg(long, conflicts_with = "shard")]
    pub address: Option<Ipv4Addr>,

    /// Show this shard (0-99)
    #[arg(long, value_parser = parse_shard)]
    pub shard: Option<ShardId>,
}

// ============================================================================
// Shard command
// ============================================================================

#[derive(Args, Debug)]
pub struct ShardArgs {
    /// Address to place (defaults to this node's public address)
    pub address: Option<Ipv4Addr>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Key to set (e.g., endpoint, zone_id, record_name)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show config file path
    Path,
}

fn parse_shard(value: &str) -> Result<ShardId, String> {
    let index: u32 = value
        .parse()
        .map_err(|_| format!("{value} is not a shard number"))?;
    ShardId::try_from(index)
}
