//! Resolve persisted shard-map metadata into typed shard maps.
//!
//! A shard map is client-side metadata binding keys (or key ranges) to the
//! physical shards holding them. The storage layer persists each map as a
//! [ShardMapDescriptor] (map kind plus a raw key type tag); [resolve] turns
//! a descriptor into the matching variant of [ShardMap] without the caller
//! knowing ahead of time which variant exists. Resolution is a closed
//! dispatch over every supported (kind, key type) pair, so there is no
//! runtime ambiguity to guard against: unknown key type tags are the only
//! failure.
//!
//! Resolved maps hold a shared [ShardMapManagerHandle] back to their owning
//! manager and answer lookups through it over order-preserving key
//! encodings ([ShardKey]). The consistency protocol behind the handle is an
//! external collaborator; this crate performs no I/O.
//!
//! # Example
//!
//! ```rust
//! use multishard_shardmap::{
//!     resolve, MappingStore, ShardKeyType, ShardLocation, ShardMap, ShardMapDescriptor,
//!     ShardMapKind,
//! };
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! // The storage layer supplies the mapping store; an empty one suffices here.
//! struct Empty;
//! impl MappingStore for Empty {
//!     fn find(&self, _map: &ShardMapDescriptor, _key: &[u8]) -> Option<ShardLocation> {
//!         None
//!     }
//! }
//!
//! let descriptor = ShardMapDescriptor {
//!     id: Uuid::from_u128(1),
//!     name: "customers".to_string(),
//!     kind: ShardMapKind::List,
//!     key_type: ShardKeyType::Int32.tag(),
//! };
//! match resolve(&descriptor, Arc::new(Empty)).unwrap() {
//!     ShardMap::ListInt32(map) => assert!(map.shard_for(&42).is_none()),
//!     _ => unreachable!(),
//! }
//! ```

mod factory;
mod key;
mod manager;
mod map;
#[cfg(test)]
mod mocks;

pub use factory::resolve;
pub use key::{ShardKey, ShardKeyType};
pub use manager::{MappingStore, ShardMapManagerHandle};
pub use map::{
    ListShardMap, RangeShardMap, ShardLocation, ShardMap, ShardMapDescriptor, ShardMapKind,
};

use thiserror::Error;

/// Errors that can occur when resolving a shard map.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("unsupported key type tag: {0}")]
    UnsupportedKeyType(u32),
}
