mod config;
mod membership;
mod record;

pub use config::*;
pub use membership::*;
pub use record::*;
