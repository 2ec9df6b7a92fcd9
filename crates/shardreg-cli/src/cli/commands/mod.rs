//! Command implementations.

pub mod add;
pub mod config;
pub mod members;
pub mod remove;
pub mod shard;

use anyhow::{Context as _, Result};
use shardreg::{
    AddressResolver, ControlPlaneClient, RegistrationController, RegistryConfig,
    DEFAULT_ADDRESS_URL, DEFAULT_RECORD_TYPE, DEFAULT_TTL,
};
use std::net::Ipv4Addr;
use std::path::PathBuf;

use crate::cli::args::RegistryArgs;
use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Registry flags from the command line or environment
    pub registry: RegistryArgs,

    /// Values loaded from the config file
    pub config: Config,

    /// Where the config file lives
    pub config_path: PathBuf,

    /// Output format
    pub output_format: OutputFormat,
}

impl Context {
    /// Record name from flags or config, if any.
    pub fn record_name(&self) -> Option<&str> {
        self.registry
            .record_name
            .as_deref()
            .or(self.config.record_name.as_deref())
    }

    /// Build the registry configuration, returning an error if a value is missing.
    pub fn registry_config(&self) -> Result<RegistryConfig> {
        let record_name = self
            .record_name()
            .ok_or_else(|| missing("record name", "record-name", "record_name"))?;
        let zone_id = self
            .registry
            .zone_id
            .as_deref()
            .or(self.config.zone_id.as_deref())
            .ok_or_else(|| missing("zone id", "zone-id", "zone_id"))?;
        let record_type = self
            .registry
            .record_type
            .as_deref()
            .or(self.config.record_type.as_deref())
            .unwrap_or(DEFAULT_RECORD_TYPE);
        let ttl = self.registry.ttl.or(self.config.ttl).unwrap_or(DEFAULT_TTL);

        let config = RegistryConfig::new(record_name, zone_id)
            .record_type(record_type)
            .ttl(ttl);
        config.validate()?;
        Ok(config)
    }

    /// Create a control-plane client from flags or config.
    pub fn client(&self) -> Result<ControlPlaneClient> {
        let endpoint = self
            .registry
            .endpoint
            .as_deref()
            .or(self.config.endpoint.as_deref())
            .ok_or_else(|| missing("control-plane endpoint", "endpoint", "endpoint"))?;

        let mut builder = ControlPlaneClient::builder(endpoint);
        if let Some(token) = self.registry.token.as_deref().or(self.config.token.as_deref()) {
            builder = builder.token(token);
        }

        Ok(builder.build()?)
    }

    /// Create a registration controller for the configured registry.
    pub fn controller(&self) -> Result<RegistrationController<ControlPlaneClient>> {
        let controller = RegistrationController::new(self.client()?, self.registry_config()?)?
            .with_retry(self.config.retry.to_retry_config());
        Ok(controller)
    }

    /// The override if given, otherwise this node's public address.
    pub async fn address(&self, address: Option<Ipv4Addr>) -> Result<Ipv4Addr> {
        if let Some(address) = address {
            return Ok(address);
        }

        let url = self
            .config
            .address_url
            .as_deref()
            .unwrap_or(DEFAULT_ADDRESS_URL);
        let resolver = AddressResolver::with_url(url)?;
        resolver
            .resolve()
            .await
            .with_context(|| format!("Could not determine public address from {url} (use --address to set it)"))
    }
}

fn missing(what: &str, flag: &str, key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "No {what} configured.\n\n\
         Set it with one of:\n  \
         1. --{flag} <VALUE>\n  \
         2. SHARDREG_{env} environment variable\n  \
         3. shardreg config set {key} <VALUE>",
        env = key.to_uppercase()
    )
}
