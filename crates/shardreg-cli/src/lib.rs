//! # shardreg-cli
//!
//! Command-line interface for registering nodes in a sharded DNS registry.
//!
//! ## Features
//!
//! - **Registration**: `add` on startup, `remove` on shutdown
//! - **Inspection**: `members` lists a shard, `shard` places an address
//! - **Configuration**: flags, `SHARDREG_*` environment variables, or a TOML file
//! - **Multiple output formats**: Pretty text or JSON

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
