//! Coordinator-free node self-registration in sharded DNS record sets.
//!
//! Each node advertises its own address under a well-known record name.
//! Members are spread over 100 weighted record sets (shards) so no single
//! set grows without bound, and consumers discover membership by resolving
//! the name.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use shardreg::{ControlPlaneClient, RegistrationController, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> shardreg::Result<()> {
//!     let store = ControlPlaneClient::builder("https://dns.example.com/v1")
//!         .token("secret")
//!         .build()?;
//!     let config = RegistryConfig::new("svc.example.", "Z0123456789");
//!     let controller = RegistrationController::new(store, config)?;
//!
//!     let outcome = controller.add("10.0.0.5".parse().unwrap()).await?;
//!     println!("{outcome:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/shardreg/0.3.0")]

pub mod controller;

pub use controller::{AddOutcome, RegistrationController, RemoveOutcome};

// Re-export core types
pub use shardreg_core::*;

// Re-export client
pub use shardreg_client::{
    AddressResolver, ControlPlaneClient, ControlPlaneClientBuilder, RateLimitConfig, RetryConfig,
    RetryExecutor, DEFAULT_ADDRESS_URL,
};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
