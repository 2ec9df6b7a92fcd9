//! HTTP control-plane client for the shardreg node registry.
//!
//! This crate provides:
//!
//! - [`ControlPlaneClient`]: a [`RecordStore`](shardreg_core::RecordStore)
//!   backed by a hosted DNS control-plane API
//! - [`RetryExecutor`]: the bounded, quadratic-delay retry policy wrapped
//!   around every store call
//! - [`AddressResolver`]: discovery of this node's public IPv4 address

#![doc(html_root_url = "https://docs.rs/shardreg-client/0.3.0")]

mod address;
mod client;
mod config;
mod retry;
pub mod api;

pub use address::{AddressResolver, DEFAULT_ADDRESS_URL};
pub use client::{ControlPlaneClient, ControlPlaneClientBuilder};
pub use config::*;
pub use retry::RetryExecutor;
pub use shardreg_core::{RegistryError, Result};
