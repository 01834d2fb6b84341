// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sort engine: brings a member list into position order or name order.
//!
//! Every entry point is memoized on the descriptor's [`SortOrder`]. Asking for
//! the order that already holds returns [`SortOutcome::Unchanged`] without
//! touching the members or the caller's map, so callers can sort
//! unconditionally before any order-sensitive step.
//!
//! The algorithm is an adjacent-transposition (bubble) sort that stops after
//! the first pass without swaps. Member lists are short and usually close to
//! sorted already, so the early exit dominates. Comparison is strict: equal
//! keys never swap.
//!
//! # Permutation map
//!
//! When a `map` slice is supplied it is swapped in lock-step with the members.
//! Seeded with `0..n`, it ends up holding, at each final position `k`, the
//! pre-sort index of the member now at `k`. [`reorder_by_permutation`] applies
//! such a map to a side array that was indexed by the old order.

use std::cmp::Ordering;

use tracing::{debug, trace, warn};

use crate::config::FieldsConfig;
use crate::datatype::{Datatype, SortOrder};
use crate::error::FieldsError;
use crate::members::MemberSeq;

/// Result of a sort request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOutcome {
    /// The requested order already held; nothing was read or written.
    Unchanged,
    /// The sort ran. `swaps` is the number of adjacent exchanges performed.
    Sorted {
        /// Adjacent exchanges performed (zero when the list was in order).
        swaps: usize,
    },
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Position,
    Name,
}

impl Target {
    const fn order(self) -> SortOrder {
        match self {
            Self::Position => SortOrder::ByPosition,
            Self::Name => SortOrder::ByName,
        }
    }
}

fn position_cmp<S: MemberSeq>(seq: &S, j: usize) -> Ordering {
    seq.key_at(j).cmp(&seq.key_at(j + 1))
}

fn name_cmp<S: MemberSeq>(seq: &S, j: usize) -> Ordering {
    seq.name_at(j).cmp(seq.name_at(j + 1))
}

/// Bubble sort with early exit. Returns the number of swaps.
fn bubble<S: MemberSeq>(
    seq: &mut S,
    mut map: Option<&mut [usize]>,
    cmp: fn(&S, usize) -> Ordering,
    trace_swaps: bool,
) -> usize {
    let mut swaps = 0;
    let mut end = seq.len().saturating_sub(1);
    let mut swapped = true;
    while end > 0 && swapped {
        swapped = false;
        for j in 0..end {
            if cmp(seq, j) == Ordering::Greater {
                seq.swap(j);
                if let Some(map) = map.as_deref_mut() {
                    map.swap(j, j + 1);
                }
                if trace_swaps {
                    trace!(position = j, "swapped adjacent members");
                }
                swapped = true;
                swaps += 1;
            }
        }
        end -= 1;
    }
    swaps
}

/// Post-sort check. Equal adjacent keys mean the descriptor was built with
/// duplicate offsets, values or names.
fn verify<S: MemberSeq>(seq: &S, cmp: fn(&S, usize) -> Ordering, target: Target) {
    for j in 0..seq.len().saturating_sub(1) {
        let ord = cmp(seq, j);
        debug_assert!(
            ord != Ordering::Greater,
            "members {j} and {} out of order after sort",
            j + 1
        );
        if ord == Ordering::Equal {
            warn!(
                ?target,
                position = j,
                name = seq.name_at(j),
                "adjacent members share a sort key"
            );
        }
    }
}

fn sort_seq<S: MemberSeq>(
    seq: &mut S,
    state: &mut SortOrder,
    target: Target,
    map: Option<&mut [usize]>,
    config: &FieldsConfig,
) -> Result<SortOutcome, FieldsError> {
    if let Some(map) = map.as_deref()
        && map.len() != seq.len()
    {
        return Err(FieldsError::PermutationLength {
            expected: seq.len(),
            found: map.len(),
        });
    }
    if *state == target.order() {
        return Ok(SortOutcome::Unchanged);
    }

    let cmp: fn(&S, usize) -> Ordering = match target {
        Target::Position => position_cmp::<S>,
        Target::Name => name_cmp::<S>,
    };
    let swaps = bubble(seq, map, cmp, config.trace_swaps);
    if config.verify_order {
        verify(seq, cmp, target);
    }
    *state = target.order();
    debug!(?target, members = seq.len(), swaps, "sorted member list");
    Ok(SortOutcome::Sorted { swaps })
}

impl Datatype {
    /// Sorts members by byte offset (records) or raw value bytes (enumerations).
    ///
    /// Uses [`FieldsConfig::default`]. See [`Datatype::sort_by_position_with`].
    ///
    /// # Errors
    /// Same as [`Datatype::sort_by_position_with`].
    pub fn sort_by_position(
        &mut self,
        map: Option<&mut [usize]>,
    ) -> Result<SortOutcome, FieldsError> {
        self.sort_to(Target::Position, map, &FieldsConfig::default())
    }

    /// Sorts members by name. Uses [`FieldsConfig::default`].
    ///
    /// # Errors
    /// Same as [`Datatype::sort_by_name_with`].
    pub fn sort_by_name(&mut self, map: Option<&mut [usize]>) -> Result<SortOutcome, FieldsError> {
        self.sort_to(Target::Name, map, &FieldsConfig::default())
    }

    /// Sorts members into position order.
    ///
    /// Enumeration values compare as unsigned bytes from the first byte in
    /// storage order. This is not a signed integer comparison, and on
    /// little-endian descriptors it is not numeric order either.
    ///
    /// # Errors
    /// [`FieldsError::UnsupportedKind`] for non-composite descriptors;
    /// [`FieldsError::PermutationLength`] when `map` is not `member_count`
    /// long. Both are reported before anything is mutated.
    pub fn sort_by_position_with(
        &mut self,
        map: Option<&mut [usize]>,
        config: &FieldsConfig,
    ) -> Result<SortOutcome, FieldsError> {
        self.sort_to(Target::Position, map, config)
    }

    /// Sorts members into byte-wise name order.
    ///
    /// # Errors
    /// [`FieldsError::UnsupportedKind`] for non-composite descriptors;
    /// [`FieldsError::PermutationLength`] when `map` is not `member_count`
    /// long.
    pub fn sort_by_name_with(
        &mut self,
        map: Option<&mut [usize]>,
        config: &FieldsConfig,
    ) -> Result<SortOutcome, FieldsError> {
        self.sort_to(Target::Name, map, config)
    }

    fn sort_to(
        &mut self,
        target: Target,
        map: Option<&mut [usize]>,
        config: &FieldsConfig,
    ) -> Result<SortOutcome, FieldsError> {
        match self {
            Self::Record(rec) => {
                let mut state = rec.sorted;
                let outcome = sort_seq(rec, &mut state, target, map, config)?;
                rec.sorted = state;
                Ok(outcome)
            }
            Self::Enum(en) => {
                let mut state = en.sorted;
                let outcome = sort_seq(en, &mut state, target, map, config)?;
                en.sorted = state;
                Ok(outcome)
            }
            Self::Atomic { class, .. } => Err(FieldsError::UnsupportedKind {
                class: class.type_class(),
            }),
        }
    }
}

/// Identity permutation `0..len`, the starting value for a tracking map.
pub fn identity_map(len: usize) -> Vec<usize> {
    (0..len).collect()
}

/// Rebuilds a side array in post-sort order: `out[k] = side[map[k]]`.
///
/// `side` is indexed by the pre-sort member order and `map` is the permutation
/// a sort wrote.
///
/// # Errors
/// [`FieldsError::PermutationLength`] when the lengths differ;
/// [`FieldsError::InvalidIndex`] when `map` names a slot outside `side`.
pub fn reorder_by_permutation<T: Clone>(side: &[T], map: &[usize]) -> Result<Vec<T>, FieldsError> {
    if side.len() != map.len() {
        return Err(FieldsError::PermutationLength {
            expected: side.len(),
            found: map.len(),
        });
    }
    map.iter()
        .map(|&from| {
            side.get(from).cloned().ok_or(FieldsError::InvalidIndex {
                index: i64::try_from(from).unwrap_or(i64::MAX),
                count: side.len(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::datatype::{AtomicClass, EnumType, MAX_ENUM_WIDTH, RecordType, TypeClass};

    fn int4() -> Datatype {
        Datatype::atomic(AtomicClass::Integer, 4)
    }

    fn record(fields: &[(&str, usize)]) -> Datatype {
        let mut rec = RecordType::new(64);
        for (name, offset) in fields {
            rec.insert(*name, *offset, int4());
        }
        Datatype::Record(rec)
    }

    fn names(dt: &Datatype) -> Vec<String> {
        let n = dt.member_count().unwrap();
        (0..n).map(|i| dt.member_name(i).unwrap()).collect()
    }

    // ── 1. short-circuit leaves map untouched ───────────────────────────

    #[test]
    fn repeated_sort_is_unchanged_and_skips_map() {
        let mut dt = record(&[("b", 8), ("a", 0)]);
        assert_eq!(
            dt.sort_by_position(None).unwrap(),
            SortOutcome::Sorted { swaps: 1 }
        );
        let mut map = [7, 7];
        assert_eq!(
            dt.sort_by_position(Some(&mut map[..])).unwrap(),
            SortOutcome::Unchanged
        );
        assert_eq!(map, [7, 7]);
    }

    // ── 2. ordered input takes one pass ─────────────────────────────────

    #[test]
    fn sorted_input_records_zero_swaps() {
        let mut dt = record(&[("a", 0), ("b", 4), ("c", 8)]);
        assert_eq!(
            dt.sort_by_position(None).unwrap(),
            SortOutcome::Sorted { swaps: 0 }
        );
        assert_eq!(dt.sort_order(), Some(SortOrder::ByPosition));
    }

    // ── 3. equal keys keep relative order ───────────────────────────────

    #[test]
    fn equal_offsets_are_stable() {
        let mut dt = record(&[("z", 4), ("y", 4), ("x", 0)]);
        let config = FieldsConfig {
            verify_order: true,
            trace_swaps: true,
        };
        dt.sort_by_position_with(None, &config).unwrap();
        assert_eq!(names(&dt), ["x", "z", "y"]);
    }

    // ── 4. failures leave the descriptor alone ──────────────────────────

    #[test]
    fn short_map_is_rejected_before_mutation() {
        let mut dt = record(&[("b", 8), ("a", 0)]);
        let before = dt.clone();
        let mut map = [0];
        assert_eq!(
            dt.sort_by_name(Some(&mut map[..])),
            Err(FieldsError::PermutationLength {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(dt, before);
        assert_eq!(map, [0]);
    }

    #[test]
    fn atomic_sort_is_unsupported() {
        let mut dt = Datatype::atomic(AtomicClass::Float, 8);
        assert_eq!(
            dt.sort_by_name(None),
            Err(FieldsError::UnsupportedKind {
                class: TypeClass::Float
            })
        );
    }

    // ── 5. enum values compare as raw bytes ─────────────────────────────

    #[test]
    fn enum_values_compare_unsigned_bytewise() {
        let mut en = EnumType::new(1).unwrap();
        en.insert("NEG", &[0xFF]).unwrap();
        en.insert("ZERO", &[0x00]).unwrap();
        en.insert("POS", &[0x7F]).unwrap();
        let mut dt = Datatype::Enum(en);
        dt.sort_by_position(None).unwrap();
        assert_eq!(names(&dt), ["ZERO", "POS", "NEG"]);
    }

    #[test]
    fn enum_values_follow_storage_byte_order() {
        // Little-endian 1 and 256: byte-wise, 256 (00 01) sorts first.
        let mut en = EnumType::new(2).unwrap();
        en.insert("ONE", &1u16.to_le_bytes()).unwrap();
        en.insert("BIG", &256u16.to_le_bytes()).unwrap();
        let mut dt = Datatype::Enum(en);
        dt.sort_by_position(None).unwrap();
        assert_eq!(names(&dt), ["BIG", "ONE"]);
    }

    #[test]
    fn full_width_values_sort_on_trailing_byte() {
        // Every value shares its first 31 bytes; only the last one differs.
        fn wide(last: u8) -> [u8; MAX_ENUM_WIDTH] {
            let mut value = [0u8; MAX_ENUM_WIDTH];
            for (i, byte) in value.iter_mut().enumerate() {
                *byte = u8::try_from(i).unwrap() ^ 0x5A;
            }
            value[MAX_ENUM_WIDTH - 1] = last;
            value
        }

        let members = [("GAMMA", 0x30), ("ALPHA", 0x10), ("DELTA", 0xF0), ("BETA", 0x20)];
        let mut en = EnumType::new(MAX_ENUM_WIDTH).unwrap();
        for (name, last) in members {
            en.insert(name, &wide(last)).unwrap();
        }
        let mut dt = Datatype::Enum(en);
        let mut map = identity_map(members.len());
        assert_eq!(
            dt.sort_by_position(Some(&mut map[..])).unwrap(),
            SortOutcome::Sorted { swaps: 3 }
        );
        assert_eq!(map, [1, 3, 0, 2]);

        let Datatype::Enum(en) = &dt else {
            unreachable!("sorting keeps the descriptor kind")
        };
        let expected = [("ALPHA", 0x10), ("BETA", 0x20), ("GAMMA", 0x30), ("DELTA", 0xF0)];
        assert_eq!(en.names(), expected.map(|(name, _)| name));
        for (i, (_, last)) in expected.into_iter().enumerate() {
            assert_eq!(en.value_at(i), Some(&wide(last)[..]));
        }
        assert_eq!(en.value_at(expected.len()), None);
    }

    // ── 6. permutation helpers ──────────────────────────────────────────

    #[test]
    fn reorder_follows_map() {
        let side = ["conv_b", "conv_a", "conv_c"];
        let out = reorder_by_permutation(&side, &[1, 2, 0]).unwrap();
        assert_eq!(out, ["conv_a", "conv_c", "conv_b"]);
        assert_eq!(identity_map(3), [0, 1, 2]);
    }

    #[test]
    fn reorder_rejects_bad_maps() {
        assert_eq!(
            reorder_by_permutation(&[1, 2], &[0]),
            Err(FieldsError::PermutationLength {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            reorder_by_permutation(&[1, 2], &[0, 5]),
            Err(FieldsError::InvalidIndex { index: 5, count: 2 })
        );
    }
}
