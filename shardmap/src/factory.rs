//! Resolution of persisted descriptors into typed shard maps.

use crate::{
    key::ShardKeyType,
    manager::ShardMapManagerHandle,
    map::{ListShardMap, RangeShardMap, ShardMap, ShardMapDescriptor, ShardMapKind},
    Error,
};
use tracing::debug;

/// Resolves a persisted descriptor into the shard map variant it describes.
///
/// Dispatch is an exhaustive match over (kind, key type): exactly one
/// variant exists per supported pair, so an ambiguous resolution is
/// unrepresentable. Unknown key type tags fail with
/// [Error::UnsupportedKeyType]. Performs no I/O; the descriptor is assumed
/// already loaded.
pub fn resolve(
    descriptor: &ShardMapDescriptor,
    manager: ShardMapManagerHandle,
) -> Result<ShardMap, Error> {
    let key_type = ShardKeyType::from_tag(descriptor.key_type)
        .ok_or(Error::UnsupportedKeyType(descriptor.key_type))?;
    let map = match (descriptor.kind, key_type) {
        (ShardMapKind::List, ShardKeyType::Int32) => {
            ShardMap::ListInt32(ListShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::List, ShardKeyType::Int64) => {
            ShardMap::ListInt64(ListShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::List, ShardKeyType::Guid) => {
            ShardMap::ListGuid(ListShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::List, ShardKeyType::Binary) => {
            ShardMap::ListBinary(ListShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::List, ShardKeyType::DateTime) => {
            ShardMap::ListDateTime(ListShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::List, ShardKeyType::TimeSpan) => {
            ShardMap::ListTimeSpan(ListShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::List, ShardKeyType::DateTimeOffset) => {
            ShardMap::ListDateTimeOffset(ListShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::Range, ShardKeyType::Int32) => {
            ShardMap::RangeInt32(RangeShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::Range, ShardKeyType::Int64) => {
            ShardMap::RangeInt64(RangeShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::Range, ShardKeyType::Guid) => {
            ShardMap::RangeGuid(RangeShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::Range, ShardKeyType::Binary) => {
            ShardMap::RangeBinary(RangeShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::Range, ShardKeyType::DateTime) => {
            ShardMap::RangeDateTime(RangeShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::Range, ShardKeyType::TimeSpan) => {
            ShardMap::RangeTimeSpan(RangeShardMap::new(manager, descriptor.clone()))
        }
        (ShardMapKind::Range, ShardKeyType::DateTimeOffset) => {
            ShardMap::RangeDateTimeOffset(RangeShardMap::new(manager, descriptor.clone()))
        }
    };
    debug!(
        name = %descriptor.name,
        kind = ?descriptor.kind,
        key_type = ?key_type,
        "resolved shard map"
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{key::ShardKey, map::ShardLocation, mocks::StaticStore};
    use std::sync::Arc;
    use uuid::Uuid;

    fn descriptor(kind: ShardMapKind, key_type: u32) -> ShardMapDescriptor {
        ShardMapDescriptor {
            id: Uuid::from_u128(1),
            name: "orders".to_string(),
            kind,
            key_type,
        }
    }

    fn handle() -> ShardMapManagerHandle {
        Arc::new(StaticStore::default())
    }

    #[test]
    fn test_resolve_all_supported_pairs() {
        for kind in [ShardMapKind::List, ShardMapKind::Range] {
            for key_type in [
                ShardKeyType::Int32,
                ShardKeyType::Int64,
                ShardKeyType::Guid,
                ShardKeyType::Binary,
                ShardKeyType::DateTime,
                ShardKeyType::TimeSpan,
                ShardKeyType::DateTimeOffset,
            ] {
                let map = resolve(&descriptor(kind, key_type.tag()), handle()).unwrap();
                assert_eq!(map.kind(), kind);
                assert_eq!(map.key_type(), key_type);
                assert_eq!(map.name(), "orders");
                assert_eq!(map.id(), Uuid::from_u128(1));
            }
        }
    }

    #[test]
    fn test_resolve_list_int32_variant() {
        let map = resolve(
            &descriptor(ShardMapKind::List, ShardKeyType::Int32.tag()),
            handle(),
        )
        .unwrap();
        assert!(matches!(map, ShardMap::ListInt32(_)));
    }

    #[test]
    fn test_resolve_range_guid_variant() {
        let map = resolve(
            &descriptor(ShardMapKind::Range, ShardKeyType::Guid.tag()),
            handle(),
        )
        .unwrap();
        assert!(matches!(map, ShardMap::RangeGuid(_)));
    }

    #[test]
    fn test_resolve_unknown_key_type() {
        let result = resolve(&descriptor(ShardMapKind::List, 99), handle());
        assert_eq!(result.unwrap_err(), Error::UnsupportedKeyType(99));
    }

    #[test]
    fn test_resolved_map_looks_up_through_manager() {
        let mut store = StaticStore::default();
        let shard = ShardLocation::new("server1", "db_a");
        store.bind_point(&10i32.encode(), shard.clone());

        let map = resolve(
            &descriptor(ShardMapKind::List, ShardKeyType::Int32.tag()),
            Arc::new(store),
        )
        .unwrap();
        let ShardMap::ListInt32(map) = map else {
            panic!("wrong variant");
        };
        assert_eq!(map.shard_for(&10), Some(shard));
    }
}
