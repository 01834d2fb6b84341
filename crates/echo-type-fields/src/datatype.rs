// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Type descriptors: records, enumerations, and the atomic classes around them.
//!
//! A [`Datatype`] is exactly one kind. Only [`Datatype::Record`] and
//! [`Datatype::Enum`] own a member list; every member operation on any other
//! class fails with [`FieldsError::UnsupportedKind`].
//!
//! Member insertion lives here because descriptors have to be built somehow,
//! but it is the only code in the crate that grows a member list. Once a
//! descriptor is handed to the lookup and sort operations its member count is
//! fixed.

use serde::{Deserialize, Serialize};

use crate::error::FieldsError;

/// Widest enumeration value the sort scratch buffer can hold, in bytes.
pub const MAX_ENUM_WIDTH: usize = 32;

/// Datatype class tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TypeClass {
    /// Fixed-width integer.
    Integer,
    /// Floating point.
    Float,
    /// Date and time.
    Time,
    /// Character string.
    String,
    /// Bit field.
    Bitfield,
    /// Uninterpreted bytes.
    Opaque,
    /// Record of named fields at fixed offsets.
    Compound,
    /// Object or region reference.
    Reference,
    /// Named integer constants.
    Enum,
    /// Variable-length sequence.
    VarLen,
    /// Fixed-size array.
    Array,
}

/// Class of a descriptor without a member list.
///
/// The composite classes are absent, so an atomic descriptor can never claim
/// to be a record or an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AtomicClass {
    /// Fixed-width integer.
    Integer,
    /// Floating point.
    Float,
    /// Date and time.
    Time,
    /// Character string.
    String,
    /// Bit field.
    Bitfield,
    /// Uninterpreted bytes.
    Opaque,
    /// Object or region reference.
    Reference,
    /// Variable-length sequence.
    VarLen,
    /// Fixed-size array.
    Array,
}

impl AtomicClass {
    /// The general class tag for this class.
    pub const fn type_class(self) -> TypeClass {
        match self {
            Self::Integer => TypeClass::Integer,
            Self::Float => TypeClass::Float,
            Self::Time => TypeClass::Time,
            Self::String => TypeClass::String,
            Self::Bitfield => TypeClass::Bitfield,
            Self::Opaque => TypeClass::Opaque,
            Self::Reference => TypeClass::Reference,
            Self::VarLen => TypeClass::VarLen,
            Self::Array => TypeClass::Array,
        }
    }
}

impl TryFrom<TypeClass> for AtomicClass {
    type Error = FieldsError;

    fn try_from(class: TypeClass) -> Result<Self, Self::Error> {
        match class {
            TypeClass::Integer => Ok(Self::Integer),
            TypeClass::Float => Ok(Self::Float),
            TypeClass::Time => Ok(Self::Time),
            TypeClass::String => Ok(Self::String),
            TypeClass::Bitfield => Ok(Self::Bitfield),
            TypeClass::Opaque => Ok(Self::Opaque),
            TypeClass::Reference => Ok(Self::Reference),
            TypeClass::VarLen => Ok(Self::VarLen),
            TypeClass::Array => Ok(Self::Array),
            TypeClass::Compound | TypeClass::Enum => Err(FieldsError::CompositeClass { class }),
        }
    }
}

/// Which canonical order a member list is currently in.
///
/// `Unsorted` is the state after construction and after every insertion.
/// Only the sort engine moves a descriptor out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// No canonical order is known to hold.
    #[default]
    Unsorted,
    /// Ascending byte offset (records) or raw value bytes (enumerations).
    ByPosition,
    /// Ascending name, compared byte-wise.
    ByName,
}

/// A type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datatype {
    /// Any class without a member list.
    Atomic {
        /// Class tag.
        class: AtomicClass,
        /// Storage size in bytes.
        size: usize,
    },
    /// Record descriptor.
    Record(RecordType),
    /// Enumeration descriptor.
    Enum(EnumType),
}

impl Datatype {
    /// Builds a member-less descriptor of `class`.
    #[must_use]
    pub const fn atomic(class: AtomicClass, size: usize) -> Self {
        Self::Atomic { class, size }
    }

    /// Builds a member-less descriptor from a general class tag.
    ///
    /// # Errors
    /// [`FieldsError::CompositeClass`] for `Compound` and `Enum`: those
    /// descriptors are built as [`RecordType`] or [`EnumType`].
    pub fn try_atomic(class: TypeClass, size: usize) -> Result<Self, FieldsError> {
        Ok(Self::atomic(AtomicClass::try_from(class)?, size))
    }

    /// Class tag of this descriptor.
    pub const fn class(&self) -> TypeClass {
        match self {
            Self::Atomic { class, .. } => class.type_class(),
            Self::Record(_) => TypeClass::Compound,
            Self::Enum(_) => TypeClass::Enum,
        }
    }

    /// Storage size in bytes.
    pub const fn size(&self) -> usize {
        match self {
            Self::Atomic { size, .. } => *size,
            Self::Record(rec) => rec.size,
            Self::Enum(en) => en.width,
        }
    }

    /// Current member order, or `None` for descriptors without members.
    pub const fn sort_order(&self) -> Option<SortOrder> {
        match self {
            Self::Atomic { .. } => None,
            Self::Record(rec) => Some(rec.sorted),
            Self::Enum(en) => Some(en.sorted),
        }
    }
}

impl From<RecordType> for Datatype {
    fn from(rec: RecordType) -> Self {
        Self::Record(rec)
    }
}

impl From<EnumType> for Datatype {
    fn from(en: EnumType) -> Self {
        Self::Enum(en)
    }
}

/// One field of a record descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMember {
    pub(crate) name: String,
    pub(crate) offset: usize,
    pub(crate) member_type: Datatype,
}

impl RecordMember {
    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte offset of the field within the record.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Descriptor of the field's own type.
    pub const fn member_type(&self) -> &Datatype {
        &self.member_type
    }
}

/// Record descriptor: named fields at fixed byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    pub(crate) size: usize,
    pub(crate) members: Vec<RecordMember>,
    pub(crate) sorted: SortOrder,
}

impl RecordType {
    /// Creates an empty record of `size` bytes.
    #[must_use]
    pub const fn new(size: usize) -> Self {
        Self {
            size,
            members: Vec::new(),
            sorted: SortOrder::Unsorted,
        }
    }

    /// Appends a field and invalidates the current order.
    ///
    /// Offsets, overlaps and name uniqueness belong to layout validation and
    /// are not checked here.
    pub fn insert(&mut self, name: impl Into<String>, offset: usize, member_type: Datatype) {
        self.members.push(RecordMember {
            name: name.into(),
            offset,
            member_type,
        });
        self.sorted = SortOrder::Unsorted;
    }

    /// Record size in bytes.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Fields in their current order.
    pub fn members(&self) -> &[RecordMember] {
        &self.members
    }

    /// Field at `index`, if any.
    pub fn member(&self, index: usize) -> Option<&RecordMember> {
        self.members.get(index)
    }

    /// Current member order.
    pub const fn sort_order(&self) -> SortOrder {
        self.sorted
    }
}

/// Enumeration descriptor: named constants of one fixed width.
///
/// Values live in a single flat buffer, `width` bytes per member, in the byte
/// order the descriptor was built with. Nothing here reinterprets endianness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub(crate) width: usize,
    pub(crate) names: Vec<String>,
    pub(crate) values: Vec<u8>,
    pub(crate) sorted: SortOrder,
}

impl EnumType {
    /// Creates an empty enumeration with `width`-byte values.
    ///
    /// # Errors
    /// Returns [`FieldsError::EnumWidth`] unless `1 <= width <= MAX_ENUM_WIDTH`.
    pub fn new(width: usize) -> Result<Self, FieldsError> {
        if width == 0 || width > MAX_ENUM_WIDTH {
            return Err(FieldsError::EnumWidth { width });
        }
        Ok(Self {
            width,
            names: Vec::new(),
            values: Vec::new(),
            sorted: SortOrder::Unsorted,
        })
    }

    /// Appends a constant and invalidates the current order.
    ///
    /// # Errors
    /// Returns [`FieldsError::ValueWidth`] when `value` is not exactly
    /// `width` bytes; the descriptor is left unchanged.
    pub fn insert(&mut self, name: impl Into<String>, value: &[u8]) -> Result<(), FieldsError> {
        if value.len() != self.width {
            return Err(FieldsError::ValueWidth {
                expected: self.width,
                found: value.len(),
            });
        }
        self.names.push(name.into());
        self.values.extend_from_slice(value);
        self.sorted = SortOrder::Unsorted;
        Ok(())
    }

    /// Width of each value in bytes.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Names in their current order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Raw value bytes of the member at `index`, if any.
    pub fn value_at(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(self.width)?;
        let end = start.checked_add(self.width)?;
        self.values.get(start..end)
    }

    /// Current member order.
    pub const fn sort_order(&self) -> SortOrder {
        self.sorted
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn enum_width_bounds() {
        assert_eq!(EnumType::new(0), Err(FieldsError::EnumWidth { width: 0 }));
        assert_eq!(EnumType::new(33), Err(FieldsError::EnumWidth { width: 33 }));
        assert!(EnumType::new(1).is_ok());
        assert!(EnumType::new(MAX_ENUM_WIDTH).is_ok());
    }

    #[test]
    fn enum_insert_rejects_wrong_width_without_mutation() {
        let mut en = EnumType::new(2).unwrap();
        en.insert("A", &[0, 1]).unwrap();
        let err = en.insert("B", &[0, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            FieldsError::ValueWidth {
                expected: 2,
                found: 3
            }
        );
        assert_eq!(en.names().len(), 1);
        assert_eq!(en.value_at(0), Some(&[0u8, 1][..]));
        assert_eq!(en.value_at(1), None);
    }

    #[test]
    fn insert_resets_order() {
        let mut rec = RecordType::new(8);
        rec.sorted = SortOrder::ByName;
        rec.insert("x", 0, Datatype::atomic(AtomicClass::Float, 8));
        assert_eq!(rec.sort_order(), SortOrder::Unsorted);

        let mut en = EnumType::new(1).unwrap();
        en.sorted = SortOrder::ByPosition;
        en.insert("ON", &[1]).unwrap();
        assert_eq!(en.sort_order(), SortOrder::Unsorted);
    }

    #[test]
    fn class_and_size_follow_kind() {
        let rec = Datatype::from(RecordType::new(16));
        assert_eq!(rec.class(), TypeClass::Compound);
        assert_eq!(rec.size(), 16);
        assert_eq!(rec.sort_order(), Some(SortOrder::Unsorted));

        let en = Datatype::from(EnumType::new(4).unwrap());
        assert_eq!(en.class(), TypeClass::Enum);
        assert_eq!(en.size(), 4);

        let int = Datatype::atomic(AtomicClass::Integer, 2);
        assert_eq!(int.class(), TypeClass::Integer);
        assert_eq!(int.sort_order(), None);
    }

    #[test]
    fn composite_classes_cannot_be_atomic() {
        for class in [TypeClass::Compound, TypeClass::Enum] {
            assert_eq!(
                Datatype::try_atomic(class, 4),
                Err(FieldsError::CompositeClass { class })
            );
        }
        let time = Datatype::try_atomic(TypeClass::Time, 8).unwrap();
        assert_eq!(time, Datatype::atomic(AtomicClass::Time, 8));
        assert_eq!(time.class(), TypeClass::Time);
    }
}
