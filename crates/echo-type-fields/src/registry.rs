// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Handle table and the public wrapper over member operations.
//!
//! Callers outside the type system hold opaque [`TypeHandle`]s. The registry
//! resolves a handle to its [`Datatype`], runs the member operation, and maps
//! every failure onto [`FieldsError`]:
//!
//! - unknown, closed, or wrong-kind handles: [`FieldsError::BadHandle`];
//! - negative member numbers: [`FieldsError::InvalidIndex`];
//! - a name lookup that matched nothing: [`FieldsError::NotFound`].
//!
//! Handles carry their entity kind in the top byte, so a handle minted for
//! some other kind of object never resolves here even if its serial collides.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, instrument};

use crate::config::FieldsConfig;
use crate::datatype::Datatype;
use crate::error::FieldsError;
use crate::sort::SortOutcome;

const KIND_SHIFT: u32 = 56;
const SERIAL_MASK: u64 = (1 << KIND_SHIFT) - 1;

/// Entity kind encoded in the top byte of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandleKind {
    /// Open file.
    File,
    /// Group.
    Group,
    /// Type descriptor.
    Datatype,
    /// Dataspace.
    Dataspace,
    /// Dataset.
    Dataset,
    /// Attribute.
    Attribute,
}

impl HandleKind {
    const fn tag(self) -> u8 {
        match self {
            Self::File => 1,
            Self::Group => 2,
            Self::Datatype => 3,
            Self::Dataspace => 4,
            Self::Dataset => 5,
            Self::Attribute => 6,
        }
    }

    const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::File),
            2 => Some(Self::Group),
            3 => Some(Self::Datatype),
            4 => Some(Self::Dataspace),
            5 => Some(Self::Dataset),
            6 => Some(Self::Attribute),
            _ => None,
        }
    }
}

/// Opaque handle: kind tag in the top byte, serial in the low 56 bits.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TypeHandle(u64);

impl TypeHandle {
    /// Builds a handle of `kind` with the given serial (truncated to 56 bits).
    pub fn new(kind: HandleKind, serial: u64) -> Self {
        Self((u64::from(kind.tag()) << KIND_SHIFT) | (serial & SERIAL_MASK))
    }

    /// Reinterprets a raw integer as a handle. No validation happens here.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw integer form.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Entity kind, or `None` for an unassigned tag.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn kind(self) -> Option<HandleKind> {
        HandleKind::from_tag((self.0 >> KIND_SHIFT) as u8)
    }

    const fn serial(self) -> u64 {
        self.0 & SERIAL_MASK
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Owns registered descriptors and resolves handles to them.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: BTreeMap<u64, Datatype>,
    next_serial: u64,
    config: FieldsConfig,
}

impl TypeRegistry {
    /// Creates an empty registry with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry whose sorts use `config`.
    #[must_use]
    pub fn with_config(config: FieldsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active settings.
    pub const fn config(&self) -> &FieldsConfig {
        &self.config
    }

    /// Number of open descriptors.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no descriptors are open.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Takes ownership of `datatype` and returns a fresh handle for it.
    ///
    /// Serials wrap at 2^56; after a wrap, serials still held by open
    /// descriptors are skipped so a live handle is never reassigned.
    pub fn register(&mut self, datatype: Datatype) -> TypeHandle {
        let mut serial = self.next_serial;
        while self.types.contains_key(&serial) {
            serial = (serial + 1) & SERIAL_MASK;
        }
        self.next_serial = (serial + 1) & SERIAL_MASK;
        let handle = TypeHandle::new(HandleKind::Datatype, serial);
        debug!(%handle, class = ?datatype.class(), "registered datatype");
        let displaced = self.types.insert(serial, datatype);
        debug_assert!(displaced.is_none(), "serial {serial:#x} already open");
        handle
    }

    /// Releases a handle and returns its descriptor.
    ///
    /// # Errors
    /// [`FieldsError::BadHandle`] if `handle` does not resolve.
    pub fn close(&mut self, handle: TypeHandle) -> Result<Datatype, FieldsError> {
        if handle.kind() != Some(HandleKind::Datatype) {
            return Err(FieldsError::BadHandle { handle });
        }
        self.types
            .remove(&handle.serial())
            .ok_or(FieldsError::BadHandle { handle })
    }

    /// Resolves a handle.
    ///
    /// # Errors
    /// [`FieldsError::BadHandle`] for unknown, closed, or non-datatype handles.
    pub fn get(&self, handle: TypeHandle) -> Result<&Datatype, FieldsError> {
        if handle.kind() != Some(HandleKind::Datatype) {
            return Err(FieldsError::BadHandle { handle });
        }
        self.types
            .get(&handle.serial())
            .ok_or(FieldsError::BadHandle { handle })
    }

    /// Resolves a handle for mutation.
    ///
    /// # Errors
    /// [`FieldsError::BadHandle`] for unknown, closed, or non-datatype handles.
    pub fn get_mut(&mut self, handle: TypeHandle) -> Result<&mut Datatype, FieldsError> {
        if handle.kind() != Some(HandleKind::Datatype) {
            return Err(FieldsError::BadHandle { handle });
        }
        self.types
            .get_mut(&handle.serial())
            .ok_or(FieldsError::BadHandle { handle })
    }

    /// Number of members of a record or enumeration.
    ///
    /// # Errors
    /// [`FieldsError::BadHandle`] or [`FieldsError::UnsupportedKind`].
    #[instrument(level = "trace", skip(self))]
    pub fn member_count(&self, handle: TypeHandle) -> Result<usize, FieldsError> {
        self.get(handle)?.member_count()
    }

    /// Owned copy of member `membno`'s name.
    ///
    /// # Errors
    /// [`FieldsError::BadHandle`], [`FieldsError::UnsupportedKind`], or
    /// [`FieldsError::InvalidIndex`] when `membno` is negative or not below the
    /// member count.
    #[instrument(level = "trace", skip(self))]
    pub fn member_name(&self, handle: TypeHandle, membno: i32) -> Result<String, FieldsError> {
        let datatype = self.get(handle)?;
        let count = datatype.member_count()?;
        let index = usize::try_from(membno).map_err(|_| FieldsError::InvalidIndex {
            index: i64::from(membno),
            count,
        })?;
        datatype.member_name(index)
    }

    /// Current index of the first member named `name`.
    ///
    /// # Errors
    /// [`FieldsError::BadHandle`], [`FieldsError::UnsupportedKind`], or
    /// [`FieldsError::NotFound`] when no member matches.
    #[instrument(level = "trace", skip(self))]
    pub fn member_index(&self, handle: TypeHandle, name: &str) -> Result<usize, FieldsError> {
        self.get(handle)?
            .member_index(name)?
            .ok_or_else(|| FieldsError::NotFound {
                name: name.to_owned(),
            })
    }

    /// Sorts the descriptor's members into position order.
    ///
    /// # Errors
    /// [`FieldsError::BadHandle`], [`FieldsError::UnsupportedKind`], or
    /// [`FieldsError::PermutationLength`]; the descriptor is untouched on error.
    #[instrument(level = "debug", skip(self, map))]
    pub fn sort_by_position(
        &mut self,
        handle: TypeHandle,
        map: Option<&mut [usize]>,
    ) -> Result<SortOutcome, FieldsError> {
        let config = self.config.clone();
        self.get_mut(handle)?.sort_by_position_with(map, &config)
    }

    /// Sorts the descriptor's members into name order.
    ///
    /// # Errors
    /// [`FieldsError::BadHandle`], [`FieldsError::UnsupportedKind`], or
    /// [`FieldsError::PermutationLength`]; the descriptor is untouched on error.
    #[instrument(level = "debug", skip(self, map))]
    pub fn sort_by_name(
        &mut self,
        handle: TypeHandle,
        map: Option<&mut [usize]>,
    ) -> Result<SortOutcome, FieldsError> {
        let config = self.config.clone();
        self.get_mut(handle)?.sort_by_name_with(map, &config)
    }
}
