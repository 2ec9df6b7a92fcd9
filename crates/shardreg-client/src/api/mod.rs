//! API endpoint modules.

mod record_sets;

pub use record_sets::{RecordSetsApi, MAX_PAGES};
