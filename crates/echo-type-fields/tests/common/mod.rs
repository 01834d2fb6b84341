// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use echo_type_fields::{AtomicClass, Datatype, EnumType, RecordMember, RecordType};

/// Record whose fields are all 4-byte integers at the given offsets.
pub fn record_of(fields: &[(&str, usize)]) -> Datatype {
    let size = fields.iter().map(|(_, off)| off + 4).max().unwrap_or(0);
    let mut rec = RecordType::new(size);
    for (name, offset) in fields {
        rec.insert(*name, *offset, Datatype::atomic(AtomicClass::Integer, 4));
    }
    Datatype::Record(rec)
}

/// Enumeration of `width`-byte values.
pub fn enum_of(width: usize, members: &[(&str, &[u8])]) -> Datatype {
    let mut en = EnumType::new(width).unwrap();
    for (name, value) in members {
        en.insert(*name, value).unwrap();
    }
    Datatype::Enum(en)
}

/// Member names in current order.
pub fn names(dt: &Datatype) -> Vec<String> {
    let count = dt.member_count().unwrap();
    (0..count).map(|i| dt.member_name(i).unwrap()).collect()
}

/// Record offsets in current order.
pub fn offsets(dt: &Datatype) -> Vec<usize> {
    match dt {
        Datatype::Record(rec) => rec.members().iter().map(RecordMember::offset).collect(),
        other => panic!("not a record: {other:?}"),
    }
}

/// Enumeration values in current order.
pub fn values(dt: &Datatype) -> Vec<Vec<u8>> {
    match dt {
        Datatype::Enum(en) => (0..en.names().len())
            .map(|i| en.value_at(i).unwrap().to_vec())
            .collect(),
        other => panic!("not an enum: {other:?}"),
    }
}
