// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy for member access and ordering.

use thiserror::Error;

use crate::datatype::TypeClass;
use crate::registry::TypeHandle;

/// Errors produced by member lookup, sorting, and descriptor construction.
///
/// Every variant is local and synchronous: nothing here is transient or worth
/// retrying. Operations check for these conditions before mutating anything,
/// so a returned error always leaves the descriptor as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldsError {
    /// The descriptor is neither a record nor an enumeration type.
    #[error("[FIELDS_UNSUPPORTED_KIND] operation not supported for type class {class:?}")]
    UnsupportedKind {
        /// Class of the offending descriptor.
        class: TypeClass,
    },
    /// A composite class was given where an atomic class is required.
    #[error("[FIELDS_COMPOSITE_CLASS] {class:?} descriptors carry members and cannot be atomic")]
    CompositeClass {
        /// The rejected class.
        class: TypeClass,
    },
    /// Member position outside `[0, count)`.
    #[error("[FIELDS_INVALID_INDEX] invalid member number {index} (member count {count})")]
    InvalidIndex {
        /// Requested position; signed so negative wrapper input is representable.
        index: i64,
        /// Number of members in the descriptor.
        count: usize,
    },
    /// No member carries the requested name.
    ///
    /// The core lookup reports absence as `None`; only the handle layer turns
    /// it into this error.
    #[error("[FIELDS_NOT_FOUND] no member named {name:?}")]
    NotFound {
        /// The name that matched nothing.
        name: String,
    },
    /// The handle is unknown, closed, or does not refer to a datatype.
    #[error("[FIELDS_BAD_HANDLE] not a valid type handle: {handle}")]
    BadHandle {
        /// The rejected handle.
        handle: TypeHandle,
    },
    /// Caller-supplied permutation map does not match the member count.
    #[error("[FIELDS_PERMUTATION_LENGTH] permutation map has {found} slots, expected {expected}")]
    PermutationLength {
        /// Member count of the descriptor.
        expected: usize,
        /// Length of the supplied map.
        found: usize,
    },
    /// Enumeration width outside `1..=MAX_ENUM_WIDTH`.
    #[error("[FIELDS_ENUM_WIDTH] enumeration width {width} outside 1..=32")]
    EnumWidth {
        /// Requested width in bytes.
        width: usize,
    },
    /// Enumeration value length differs from the descriptor width.
    #[error("[FIELDS_VALUE_WIDTH] enumeration value is {found} bytes, descriptor width is {expected}")]
    ValueWidth {
        /// Descriptor width in bytes.
        expected: usize,
        /// Length of the supplied value.
        found: usize,
    },
}
