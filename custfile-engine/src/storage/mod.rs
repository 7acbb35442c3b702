//! Storage layer for fixed-width record files
//!
//! This module handles the byte-level format of a record:
//! - Field layouts (names, widths, filler)
//! - Decoding and encoding of record blocks

pub mod layout;
pub mod record;

pub use layout::{FieldSpec, RecordLayout};
pub use record::{decode, encode, try_decode, Record};
