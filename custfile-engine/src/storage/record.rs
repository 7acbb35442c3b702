//! Records and the fixed-width record codec
//!
//! `decode` turns one record-sized block into a `Record` by slicing it per
//! the layout and trimming the space padding from each slice. `encode` is
//! the inverse: it pads every value with trailing spaces to its field width.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{StoreError, StoreResult};
use super::layout::RecordLayout;

/// A decoded record: field names mapped to trimmed values, in layout order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    /// Set a field value, replacing any previous value for the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder form of `insert`
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a field value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over (name, value) pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Decode one record block
///
/// # Panics
///
/// Panics if `bytes` is not exactly `layout.total_width()` long. Use
/// `try_decode` when the length is not already guaranteed.
pub fn decode(layout: &RecordLayout, bytes: &[u8]) -> Record {
    assert_eq!(
        bytes.len(),
        layout.total_width(),
        "record block length does not match layout"
    );

    let fields = layout
        .named_fields()
        .map(|(name, range)| {
            let raw = String::from_utf8_lossy(&bytes[range]);
            (name.to_string(), raw.trim_matches(' ').to_string())
        })
        .collect();

    Record { fields }
}

/// Decode one record block, checking its length first
pub fn try_decode(layout: &RecordLayout, bytes: &[u8]) -> StoreResult<Record> {
    if bytes.len() != layout.total_width() {
        return Err(StoreError::LengthMismatch {
            expected: layout.total_width(),
            actual: bytes.len(),
        });
    }
    Ok(decode(layout, bytes))
}

/// Encode a record into a space-padded block of `layout.total_width()` bytes
///
/// Fields missing from the record and filler are written as spaces.
pub fn encode(layout: &RecordLayout, record: &Record) -> StoreResult<Vec<u8>> {
    let mut block = vec![b' '; layout.total_width()];

    for (name, value) in record.iter() {
        let range = layout
            .field_range(name)
            .ok_or_else(|| StoreError::UnknownField(name.to_string()))?;

        let bytes = value.as_bytes();
        if bytes.len() > range.len() {
            return Err(StoreError::FieldOverflow {
                field: name.to_string(),
                width: range.len(),
                len: bytes.len(),
            });
        }

        block[range.start..range.start + bytes.len()].copy_from_slice(bytes);
    }

    Ok(block)
}
