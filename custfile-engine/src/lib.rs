//! Custfile Engine - fixed-width record store
//!
//! This crate reads customer records from flat files of fixed-width,
//! space-padded ASCII records, addressed directly by record number.

pub mod error;
pub mod storage;
pub mod file_manager;

pub use error::{ErrorKind, StoreError, StoreResult};
pub use file_manager::{RecordStore, StoreState};
pub use storage::{decode, encode, try_decode, FieldSpec, Record, RecordLayout};
