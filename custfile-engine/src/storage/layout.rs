//! Record layouts: ordered field names and byte widths
//!
//! A layout describes how one fixed-width record is carved into fields.
//! Fields are packed back to back with no delimiters, so a field's offset
//! is the sum of the widths declared before it. Unnamed entries are filler:
//! they occupy bytes but are never decoded.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

use crate::error::{StoreError, StoreResult};

/// One entry of a record layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name (`None` for filler)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Width in bytes
    pub width: usize,
}

impl FieldSpec {
    /// Create a named field
    pub fn new(name: impl Into<String>, width: usize) -> Self {
        FieldSpec {
            name: Some(name.into()),
            width,
        }
    }

    /// Create a filler entry
    pub fn filler(width: usize) -> Self {
        FieldSpec { name: None, width }
    }

    /// Check if this entry is filler
    pub fn is_filler(&self) -> bool {
        self.name.is_none()
    }
}

/// Ordered field layout of a fixed-width record
///
/// Immutable once built. Share it between stores with `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct RecordLayout {
    fields: Vec<FieldSpec>,
    /// Byte offset of each entry in `fields`
    offsets: Vec<usize>,
    total_width: usize,
}

impl RecordLayout {
    /// Build a layout, rejecting empty, zero-width, unnamed-only and
    /// duplicate-name field lists
    pub fn new(fields: Vec<FieldSpec>) -> StoreResult<Self> {
        if fields.is_empty() {
            return Err(StoreError::InvalidLayout("layout has no fields".into()));
        }

        let mut seen = HashSet::new();
        for (i, field) in fields.iter().enumerate() {
            if field.width == 0 {
                return Err(StoreError::InvalidLayout(format!(
                    "field #{} has zero width",
                    i + 1
                )));
            }
            if let Some(name) = &field.name {
                if name.is_empty() {
                    return Err(StoreError::InvalidLayout(format!(
                        "field #{} has an empty name",
                        i + 1
                    )));
                }
                if !seen.insert(name.as_str()) {
                    return Err(StoreError::InvalidLayout(format!(
                        "duplicate field name {:?}",
                        name
                    )));
                }
            }
        }

        if seen.is_empty() {
            return Err(StoreError::InvalidLayout(
                "layout has only filler".into(),
            ));
        }

        fields
            .iter()
            .try_fold(0usize, |acc, f| acc.checked_add(f.width))
            .ok_or_else(|| StoreError::InvalidLayout("record width overflows".into()))?;

        Ok(Self::build(fields))
    }

    fn build(fields: Vec<FieldSpec>) -> Self {
        let mut offsets = Vec::with_capacity(fields.len());
        let mut total_width = 0;
        for field in &fields {
            offsets.push(total_width);
            total_width += field.width;
        }
        RecordLayout {
            fields,
            offsets,
            total_width,
        }
    }

    /// 100-byte customer record: id, name, address, city, 14 bytes filler
    pub fn customer() -> Self {
        Self::build(vec![
            FieldSpec::new("id", 6),
            FieldSpec::new("name", 30),
            FieldSpec::new("address", 30),
            FieldSpec::new("city", 20),
            FieldSpec::filler(14),
        ])
    }

    /// 100-byte customer record with narrow text fields and 39 bytes filler
    pub fn customer_compact() -> Self {
        Self::build(vec![
            FieldSpec::new("id", 6),
            FieldSpec::new("name", 20),
            FieldSpec::new("address", 20),
            FieldSpec::new("city", 15),
            FieldSpec::filler(39),
        ])
    }

    /// 103-byte customer record: the `customer` fields plus state, zip, phone
    pub fn customer_extended() -> Self {
        Self::build(vec![
            FieldSpec::new("id", 6),
            FieldSpec::new("name", 30),
            FieldSpec::new("address", 30),
            FieldSpec::new("city", 20),
            FieldSpec::new("state", 2),
            FieldSpec::new("zip", 5),
            FieldSpec::new("phone", 10),
        ])
    }

    /// Record size in bytes, filler included
    pub fn total_width(&self) -> usize {
        self.total_width
    }

    /// All entries in declared order, filler included
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Named fields with their byte ranges, in declared order
    pub fn named_fields(&self) -> impl Iterator<Item = (&str, Range<usize>)> + '_ {
        self.fields
            .iter()
            .zip(&self.offsets)
            .filter_map(|(field, &offset)| {
                field
                    .name
                    .as_deref()
                    .map(|name| (name, offset..offset + field.width))
            })
    }

    /// Byte range of a named field within a record
    pub fn field_range(&self, name: &str) -> Option<Range<usize>> {
        self.named_fields()
            .find(|(n, _)| *n == name)
            .map(|(_, range)| range)
    }

    /// Names of all non-filler fields, in declared order
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.named_fields().map(|(name, _)| name)
    }
}

impl TryFrom<Vec<FieldSpec>> for RecordLayout {
    type Error = StoreError;

    fn try_from(fields: Vec<FieldSpec>) -> StoreResult<Self> {
        RecordLayout::new(fields)
    }
}

impl From<RecordLayout> for Vec<FieldSpec> {
    fn from(layout: RecordLayout) -> Self {
        layout.fields
    }
}
