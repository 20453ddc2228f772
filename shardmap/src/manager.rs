//! The narrow seam between resolved shard maps and their owning manager.

use crate::map::{ShardLocation, ShardMapDescriptor};
use std::sync::Arc;

/// Storage-facing operations a resolved shard map needs from its owning
/// manager.
///
/// The consistency protocol behind the lookup (caching, version stamps,
/// split/merge) is the implementation's business. Implementations must be
/// internally synchronized: a resolved map may be shared read-only across
/// concurrent lookups.
pub trait MappingStore: Send + Sync {
    /// Returns the location of the shard covering `key`, encoded per the
    /// map's key type, or `None` if no mapping covers it.
    ///
    /// For list maps the storage layer matches the key discretely; for range
    /// maps it matches the containing interval. Encodings preserve key order
    /// (see [crate::ShardKey::encode]), so interval containment can be
    /// checked byte-wise.
    fn find(&self, map: &ShardMapDescriptor, key: &[u8]) -> Option<ShardLocation>;
}

/// Opaque shared reference to a shard map manager, passed through unchanged
/// from the storage layer into every map it resolves.
pub type ShardMapManagerHandle = Arc<dyn MappingStore>;
