//! Core types and traits for the shardreg node registry.
//!
//! This crate provides the foundational pieces shared by every shardreg crate:
//!
//! - **Shards**: Deterministic address-to-shard assignment ([`shard::assign`])
//! - **Types**: Record sets, membership values and the registry configuration
//! - **Store**: The [`RecordStore`] trait and an in-process [`MemoryStore`]
//! - **Errors**: Comprehensive error handling with [`RegistryError`]
//!
//! # Example
//!
//! ```rust
//! use shardreg_core::{shard, RecordSetKey};
//!
//! let shard = shard::assign("10.0.0.5".parse().unwrap());
//! assert_eq!(shard.get(), 65);
//!
//! let key = RecordSetKey::new("svc.example.", shard);
//! assert_eq!(key.set_identifier(), "svc.example._65");
//! ```

#![doc(html_root_url = "https://docs.rs/shardreg-core/0.3.0")]

mod error;
pub mod shard;
pub mod store;
pub mod types;

pub use error::{RegistryError, Result};
pub use shard::ShardId;
pub use store::{MemoryStore, RecordStore};
pub use types::*;
