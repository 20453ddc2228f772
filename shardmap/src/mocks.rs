//! In-memory mapping store for tests.

use crate::{
    manager::MappingStore,
    map::{ShardLocation, ShardMapDescriptor, ShardMapKind},
};
use std::collections::{BTreeMap, HashMap};

/// A fixed set of bindings over encoded keys.
#[derive(Default)]
pub struct StaticStore {
    points: HashMap<Vec<u8>, ShardLocation>,
    // low (inclusive) -> (high (exclusive), location)
    ranges: BTreeMap<Vec<u8>, (Vec<u8>, ShardLocation)>,
}

impl StaticStore {
    pub fn bind_point(&mut self, key: &[u8], location: ShardLocation) {
        self.points.insert(key.to_vec(), location);
    }

    pub fn bind_range(&mut self, low: &[u8], high: &[u8], location: ShardLocation) {
        self.ranges
            .insert(low.to_vec(), (high.to_vec(), location));
    }
}

impl MappingStore for StaticStore {
    fn find(&self, map: &ShardMapDescriptor, key: &[u8]) -> Option<ShardLocation> {
        match map.kind {
            ShardMapKind::List => self.points.get(key).cloned(),
            ShardMapKind::Range => self
                .ranges
                .range(..=key.to_vec())
                .next_back()
                .filter(|(_, (high, _))| key < high.as_slice())
                .map(|(_, (_, location))| location.clone()),
        }
    }
}
