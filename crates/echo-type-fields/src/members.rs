// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Member store: count, positional name access, and name lookup.
//!
//! Both composite kinds expose their members through [`MemberSeq`], the small
//! capability the sort engine also runs on. Lookups read the list in whatever
//! order it currently holds; they never sort first.

use crate::datatype::{Datatype, EnumType, RecordType};
use crate::error::FieldsError;

/// Ordered, fixed-length member list.
///
/// `swap(j)` exchanges the members at `j` and `j + 1` as whole units (name,
/// key and any payload move together). Callers only pass `j + 1 < len()`.
/// Likewise `name_at` and `key_at` take `index < len()` and may panic
/// otherwise; bounds checks for caller input happen before these are reached.
pub(crate) trait MemberSeq {
    /// Position key: byte offset for records, raw value bytes for enumerations.
    type Key<'a>: Ord
    where
        Self: 'a;

    /// Number of members.
    fn len(&self) -> usize;

    /// Name of the member at `index`; requires `index < len()`.
    fn name_at(&self, index: usize) -> &str;

    /// Position key of the member at `index`; requires `index < len()`.
    fn key_at(&self, index: usize) -> Self::Key<'_>;

    /// Exchanges the members at `j` and `j + 1`.
    fn swap(&mut self, j: usize);
}

impl MemberSeq for RecordType {
    type Key<'a> = usize;

    fn len(&self) -> usize {
        self.members.len()
    }

    // Indexes directly: `index < len()` per the trait contract.
    fn name_at(&self, index: usize) -> &str {
        &self.members[index].name
    }

    fn key_at(&self, index: usize) -> usize {
        self.members[index].offset
    }

    fn swap(&mut self, j: usize) {
        self.members.swap(j, j + 1);
    }
}

impl MemberSeq for EnumType {
    // Slice ordering is unsigned and lexicographic, and all values share one
    // width, so this is memcmp over storage-order bytes.
    type Key<'a> = &'a [u8];

    fn len(&self) -> usize {
        self.names.len()
    }

    fn name_at(&self, index: usize) -> &str {
        &self.names[index]
    }

    fn key_at(&self, index: usize) -> &[u8] {
        let start = index * self.width;
        &self.values[start..start + self.width]
    }

    fn swap(&mut self, j: usize) {
        let width = self.width;
        assert!(
            width <= crate::MAX_ENUM_WIDTH,
            "enumeration width {width} exceeds swap scratch"
        );
        self.names.swap(j, j + 1);

        let lo = j * width;
        let mut scratch = [0u8; crate::MAX_ENUM_WIDTH];
        scratch[..width].copy_from_slice(&self.values[lo..lo + width]);
        self.values.copy_within(lo + width..lo + 2 * width, lo);
        self.values[lo + width..lo + 2 * width].copy_from_slice(&scratch[..width]);
    }
}

fn lookup<S: MemberSeq>(seq: &S, name: &str) -> Option<usize> {
    (0..seq.len()).find(|&i| seq.name_at(i) == name)
}

fn name_of<S: MemberSeq>(seq: &S, index: usize) -> Result<String, FieldsError> {
    if index >= seq.len() {
        return Err(FieldsError::InvalidIndex {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            count: seq.len(),
        });
    }
    Ok(seq.name_at(index).to_owned())
}

impl Datatype {
    /// Number of members.
    ///
    /// # Errors
    /// [`FieldsError::UnsupportedKind`] for anything but records and enumerations.
    pub fn member_count(&self) -> Result<usize, FieldsError> {
        match self {
            Self::Record(rec) => Ok(rec.len()),
            Self::Enum(en) => Ok(en.len()),
            Self::Atomic { class, .. } => Err(FieldsError::UnsupportedKind {
                class: class.type_class(),
            }),
        }
    }

    /// Owned copy of the name at `index` in the current order.
    ///
    /// # Errors
    /// [`FieldsError::InvalidIndex`] when `index >= member_count`;
    /// [`FieldsError::UnsupportedKind`] for non-composite descriptors.
    pub fn member_name(&self, index: usize) -> Result<String, FieldsError> {
        match self {
            Self::Record(rec) => name_of(rec, index),
            Self::Enum(en) => name_of(en, index),
            Self::Atomic { class, .. } => Err(FieldsError::UnsupportedKind {
                class: class.type_class(),
            }),
        }
    }

    /// Current index of the first member named `name`.
    ///
    /// Scans in current order and compares names byte for byte. With duplicate
    /// names the lowest current index wins, so the answer can change after a
    /// sort. Absence is `Ok(None)`, not an error.
    ///
    /// # Errors
    /// [`FieldsError::UnsupportedKind`] for non-composite descriptors.
    pub fn member_index(&self, name: &str) -> Result<Option<usize>, FieldsError> {
        match self {
            Self::Record(rec) => Ok(lookup(rec, name)),
            Self::Enum(en) => Ok(lookup(en, name)),
            Self::Atomic { class, .. } => Err(FieldsError::UnsupportedKind {
                class: class.type_class(),
            }),
        }
    }
}
