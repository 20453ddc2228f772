//! Shard-map descriptors, locations, and the typed List/Range map family.
//!
//! A [ShardMapDescriptor] is the immutable metadata record the storage layer
//! hands over; [crate::resolve] turns it into one variant of [ShardMap], the
//! closed sum over every supported (map kind, key type) pair. Each variant
//! wraps a [ListShardMap] or [RangeShardMap] parameterized by its key scalar
//! and holding a shared handle back to its owning manager for lookups. Which
//! mappings exist, and how they stay consistent, is the manager's business;
//! the maps only delegate over encoded keys.

use crate::{
    key::{ShardKey, ShardKeyType},
    manager::ShardMapManagerHandle,
};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use std::{
    fmt::{Debug, Display, Formatter},
    marker::PhantomData,
};
use uuid::Uuid;

/// Kind of a shard map, as persisted by the storage layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShardMapKind {
    /// Discrete key-to-shard bindings.
    List = 1,
    /// Contiguous key-range-to-shard bindings.
    Range = 2,
}

impl ShardMapKind {
    /// Parses a raw persisted tag.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Self::List),
            2 => Some(Self::Range),
            _ => None,
        }
    }

    /// The raw tag persisted for this kind.
    pub fn tag(&self) -> u32 {
        *self as u32
    }
}

/// Persisted metadata describing one shard map.
///
/// Immutable once read from storage. The key type is carried as the raw
/// persisted tag so the storage layer can hand over maps whose key type this
/// client version does not know (resolution then fails cleanly instead of
/// the record being unreadable).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardMapDescriptor {
    /// Identity of the map.
    pub id: Uuid,
    /// Name of the map.
    pub name: String,
    /// Map kind.
    pub kind: ShardMapKind,
    /// Raw key type tag (see [ShardKeyType::from_tag]).
    pub key_type: u32,
}

/// Location of one physical shard.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShardLocation {
    /// Server hosting the shard.
    pub server: String,
    /// Database holding the shard's data.
    pub database: String,
}

impl ShardLocation {
    /// Creates a new location.
    pub fn new(server: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
        }
    }
}

impl Display for ShardLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.server, self.database)
    }
}

/// A shard map with discrete key-to-shard bindings.
pub struct ListShardMap<K: ShardKey> {
    manager: ShardMapManagerHandle,
    descriptor: ShardMapDescriptor,
    _key: PhantomData<K>,
}

/// A shard map with contiguous key-range-to-shard bindings.
pub struct RangeShardMap<K: ShardKey> {
    manager: ShardMapManagerHandle,
    descriptor: ShardMapDescriptor,
    _key: PhantomData<K>,
}

macro_rules! impl_map_common {
    ($name:ident) => {
        impl<K: ShardKey> $name<K> {
            pub(crate) fn new(
                manager: ShardMapManagerHandle,
                descriptor: ShardMapDescriptor,
            ) -> Self {
                // The factory only constructs a map whose key parameter
                // matches the descriptor's tag.
                debug_assert_eq!(
                    ShardKeyType::from_tag(descriptor.key_type),
                    Some(K::KEY_TYPE)
                );
                Self {
                    manager,
                    descriptor,
                    _key: PhantomData,
                }
            }

            /// Name recorded in the descriptor.
            pub fn name(&self) -> &str {
                &self.descriptor.name
            }

            /// Identity recorded in the descriptor.
            pub fn id(&self) -> Uuid {
                self.descriptor.id
            }

            /// Scalar type of this map's keys.
            pub fn key_type(&self) -> ShardKeyType {
                K::KEY_TYPE
            }

            /// The descriptor this map was resolved from.
            pub fn descriptor(&self) -> &ShardMapDescriptor {
                &self.descriptor
            }

            /// Handle to the owning manager.
            pub fn manager(&self) -> &ShardMapManagerHandle {
                &self.manager
            }

            /// Location of the shard covering `key`, if a mapping exists.
            pub fn shard_for(&self, key: &K) -> Option<ShardLocation> {
                self.manager.find(&self.descriptor, &key.encode())
            }
        }

        impl<K: ShardKey> Debug for $name<K> {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("descriptor", &self.descriptor)
                    .finish_non_exhaustive()
            }
        }
    };
}

impl_map_common!(ListShardMap);
impl_map_common!(RangeShardMap);

macro_rules! shard_map_variants {
    ($(($list:ident, $range:ident, $key:ty, $key_type:ident)),+ $(,)?) => {
        /// A resolved shard map, typed by map kind and key scalar.
        ///
        /// One variant exists per supported (kind, key type) pair, so
        /// resolution is a closed, exhaustively-checked dispatch: callers
        /// match on the variant to recover the typed map.
        pub enum ShardMap {
            $(
                #[doc = concat!("List map keyed by `", stringify!($key), "`.")]
                $list(ListShardMap<$key>),
                #[doc = concat!("Range map keyed by `", stringify!($key), "`.")]
                $range(RangeShardMap<$key>),
            )+
        }

        impl ShardMap {
            /// Map kind of the resolved variant.
            pub fn kind(&self) -> ShardMapKind {
                match self {
                    $(
                        Self::$list(_) => ShardMapKind::List,
                        Self::$range(_) => ShardMapKind::Range,
                    )+
                }
            }

            /// Scalar type of the resolved variant's keys.
            pub fn key_type(&self) -> ShardKeyType {
                match self {
                    $(
                        Self::$list(_) | Self::$range(_) => ShardKeyType::$key_type,
                    )+
                }
            }

            /// Name recorded in the descriptor.
            pub fn name(&self) -> &str {
                match self {
                    $(
                        Self::$list(m) => m.name(),
                        Self::$range(m) => m.name(),
                    )+
                }
            }

            /// Identity recorded in the descriptor.
            pub fn id(&self) -> Uuid {
                match self {
                    $(
                        Self::$list(m) => m.id(),
                        Self::$range(m) => m.id(),
                    )+
                }
            }
        }

        impl Debug for ShardMap {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$list(m) => m.fmt(f),
                        Self::$range(m) => m.fmt(f),
                    )+
                }
            }
        }
    };
}

shard_map_variants!(
    (ListInt32, RangeInt32, i32, Int32),
    (ListInt64, RangeInt64, i64, Int64),
    (ListGuid, RangeGuid, Uuid, Guid),
    (ListBinary, RangeBinary, Bytes, Binary),
    (ListDateTime, RangeDateTime, DateTime<Utc>, DateTime),
    (ListTimeSpan, RangeTimeSpan, TimeDelta, TimeSpan),
    (ListDateTimeOffset, RangeDateTimeOffset, DateTime<FixedOffset>, DateTimeOffset),
);
