//! Shard key scalar types and their order-preserving binary encodings.
//!
//! The storage layer persists a raw numeric tag identifying the scalar type
//! of a shard map's keys. [ShardKeyType] enumerates the tags this client
//! understands and [ShardKey] ties each tag to a concrete Rust scalar and a
//! binary encoding under which byte-wise comparison matches key order. Range
//! lookups operate over encoded keys, so the encoding must preserve order
//! exactly: for any two keys `a` and `b`, `a <= b` iff
//! `a.encode() <= b.encode()` lexicographically.

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use std::fmt::Debug;
use uuid::Uuid;

/// Scalar type of the keys in a shard map, as persisted by the storage layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShardKeyType {
    /// 32-bit signed integer keys.
    Int32 = 1,
    /// 64-bit signed integer keys.
    Int64 = 2,
    /// GUID keys.
    Guid = 3,
    /// Variable-length binary keys.
    Binary = 4,
    /// UTC date/time keys.
    DateTime = 5,
    /// Duration keys.
    TimeSpan = 6,
    /// Date/time keys carrying an offset from UTC.
    DateTimeOffset = 7,
}

impl ShardKeyType {
    /// Parses a raw persisted tag. Returns `None` for tags this client
    /// version does not know.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Self::Int32),
            2 => Some(Self::Int64),
            3 => Some(Self::Guid),
            4 => Some(Self::Binary),
            5 => Some(Self::DateTime),
            6 => Some(Self::TimeSpan),
            7 => Some(Self::DateTimeOffset),
            _ => None,
        }
    }

    /// The raw tag persisted for this key type.
    pub fn tag(&self) -> u32 {
        *self as u32
    }
}

/// A scalar usable as a shard key.
///
/// Implementations pair a concrete Rust type with the [ShardKeyType] tag the
/// storage layer records for it and an order-preserving binary encoding.
pub trait ShardKey: Clone + Debug + Ord + Send + Sync + 'static {
    /// Tag recorded by the storage layer for keys of this type.
    const KEY_TYPE: ShardKeyType;

    /// Encodes the key such that lexicographic comparison of encodings
    /// matches `Ord` on the keys themselves.
    fn encode(&self) -> Bytes;
}

// Two's-complement integers compare correctly as unsigned bytes once the
// sign bit is flipped.
fn encode_i32(value: i32) -> Bytes {
    Bytes::copy_from_slice(&((value as u32) ^ (1 << 31)).to_be_bytes())
}

fn encode_i64(value: i64) -> Bytes {
    Bytes::copy_from_slice(&((value as u64) ^ (1 << 63)).to_be_bytes())
}

// Twelve bytes: sign-flipped big-endian floor seconds, then big-endian
// subsecond nanoseconds. Lossless over the full representable range, unlike
// a single nanosecond count (which only spans roughly +/- 292 years around
// the epoch). Lexicographic comparison matches (seconds, nanos) order.
fn encode_seconds_nanos(secs: i64, nanos: u32) -> Bytes {
    let mut buf = [0u8; 12];
    buf[..8].copy_from_slice(&((secs as u64) ^ (1 << 63)).to_be_bytes());
    buf[8..].copy_from_slice(&nanos.to_be_bytes());
    Bytes::copy_from_slice(&buf)
}

fn encode_instant(value: &DateTime<Utc>) -> Bytes {
    // `timestamp` floors, so the subsecond part is always non-negative.
    encode_seconds_nanos(value.timestamp(), value.timestamp_subsec_nanos())
}

impl ShardKey for i32 {
    const KEY_TYPE: ShardKeyType = ShardKeyType::Int32;

    fn encode(&self) -> Bytes {
        encode_i32(*self)
    }
}

impl ShardKey for i64 {
    const KEY_TYPE: ShardKeyType = ShardKeyType::Int64;

    fn encode(&self) -> Bytes {
        encode_i64(*self)
    }
}

impl ShardKey for Uuid {
    const KEY_TYPE: ShardKeyType = ShardKeyType::Guid;

    // RFC 4122 byte order (not SQL Server's shuffled GUID collation): any
    // total, stable order works here because the consistency protocol that
    // assigns ranges lives behind the manager handle.
    fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ShardKey for Bytes {
    const KEY_TYPE: ShardKeyType = ShardKeyType::Binary;

    fn encode(&self) -> Bytes {
        self.clone()
    }
}

impl ShardKey for DateTime<Utc> {
    const KEY_TYPE: ShardKeyType = ShardKeyType::DateTime;

    fn encode(&self) -> Bytes {
        encode_instant(self)
    }
}

impl ShardKey for TimeDelta {
    const KEY_TYPE: ShardKeyType = ShardKeyType::TimeSpan;

    fn encode(&self) -> Bytes {
        // Normalize to floor seconds plus a non-negative subsecond part
        // (`num_seconds`/`subsec_nanos` truncate toward zero).
        let mut secs = self.num_seconds();
        let mut nanos = self.subsec_nanos();
        if nanos < 0 {
            secs -= 1;
            nanos += 1_000_000_000;
        }
        encode_seconds_nanos(secs, nanos as u32)
    }
}

impl ShardKey for DateTime<FixedOffset> {
    const KEY_TYPE: ShardKeyType = ShardKeyType::DateTimeOffset;

    // Encoded by UTC instant alone, matching chrono's ordering (two keys at
    // the same instant under different offsets compare equal).
    fn encode(&self) -> Bytes {
        encode_instant(&self.with_timezone(&Utc))
    }
}
