// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Member lists for record and enumeration type descriptors.
//!
//! A record descriptor holds named fields at fixed byte offsets; an
//! enumeration descriptor holds named constants of one underlying width. This
//! crate owns lookup over those member lists and brings them into one of two
//! canonical orders so encoders and decoders can rely on member order without
//! re-deriving it.
//!
//! # Canonical orders
//!
//! - [`SortOrder::ByPosition`]: ascending byte offset, or ascending raw value
//!   bytes (unsigned, storage order) for enumerations.
//! - [`SortOrder::ByName`]: ascending byte-wise name order.
//!
//! Sorting is memoized on the descriptor and is a no-op when the requested
//! order already holds, so it is safe to call before every order-sensitive
//! step. An optional permutation map reports where each member came from; see
//! [`reorder_by_permutation`].
//!
//! # Lookup
//!
//! [`Datatype::member_index`] returns the first match in the *current* order.
//! With duplicate names the result depends on whether and how the descriptor
//! has been sorted.
//!
//! # Concurrency
//!
//! Sorts take `&mut` and lookups take `&`, so the borrow checker rules out a
//! lookup racing a sort. Shared use across threads needs external locking.
#![forbid(unsafe_code)]

mod config;
mod datatype;
mod error;
mod members;
mod registry;
mod sort;

pub use config::{ConfigError, FieldsConfig};
pub use datatype::{
    AtomicClass, Datatype, EnumType, MAX_ENUM_WIDTH, RecordMember, RecordType, SortOrder, TypeClass,
};
pub use error::FieldsError;
pub use registry::{HandleKind, TypeHandle, TypeRegistry};
pub use sort::{SortOutcome, identity_map, reorder_by_permutation};
