//! File manager for record files
//!
//! Owns open file handles and maps record numbers to byte offsets.

pub mod record_store;

pub use record_store::{RecordStore, StoreState};
