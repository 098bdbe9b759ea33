//! Node-partitioned cache state behind the dual-mode facades.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use ember_common::store::EntryStore;
use ember_common::value::{CacheEntry, CanonicalKey, DataValue};

/// Cluster-wide state of one named cache: one partition per node, keys
/// routed by their canonical hash.
#[derive(Debug)]
pub struct PartitionedCache {
    name: String,
    partitions: Vec<Arc<EntryStore>>,
}

impl PartitionedCache {
    pub fn new(name: impl Into<String>, partition_count: usize) -> Self {
        let partitions = (0..partition_count.max(1))
            .map(|_| Arc::new(EntryStore::new()))
            .collect();
        Self {
            name: name.into(),
            partitions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    fn partition_for(&self, key: &CanonicalKey) -> &EntryStore {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() % self.partitions.len() as u64) as usize;
        &self.partitions[index]
    }

    pub fn get(&self, key: &DataValue) -> Option<DataValue> {
        let key = CanonicalKey::new(key.clone());
        self.partition_for(&key).get(&key)
    }

    pub fn put(&self, key: DataValue, value: DataValue) {
        let key = CanonicalKey::new(key);
        let partition = self.partition_for(&key);
        partition.put(key, value);
    }

    pub fn get_and_put(&self, key: DataValue, value: DataValue) -> Option<DataValue> {
        let key = CanonicalKey::new(key);
        let partition = self.partition_for(&key);
        partition.get_and_put(key, value)
    }

    pub fn put_if_absent(&self, key: DataValue, value: DataValue) -> bool {
        let key = CanonicalKey::new(key);
        let partition = self.partition_for(&key);
        partition.put_if_absent(key, value)
    }

    pub fn get_and_put_if_absent(&self, key: DataValue, value: DataValue) -> Option<DataValue> {
        let key = CanonicalKey::new(key);
        let partition = self.partition_for(&key);
        partition.get_and_put_if_absent(key, value)
    }

    pub fn replace(&self, key: DataValue, value: DataValue) -> bool {
        let key = CanonicalKey::new(key);
        let partition = self.partition_for(&key);
        partition.replace(key, value)
    }

    pub fn replace_value(&self, key: DataValue, expected: &DataValue, value: DataValue) -> bool {
        let key = CanonicalKey::new(key);
        let partition = self.partition_for(&key);
        partition.replace_value(key, expected, value)
    }

    /// Upsert with previous-value return: always sets `value`, even when no
    /// prior entry existed.
    pub fn get_and_replace(&self, key: DataValue, value: DataValue) -> Option<DataValue> {
        self.get_and_put(key, value)
    }

    pub fn remove(&self, key: &DataValue) -> bool {
        let key = CanonicalKey::new(key.clone());
        self.partition_for(&key).remove(&key)
    }

    pub fn remove_value(&self, key: &DataValue, expected: &DataValue) -> bool {
        let key = CanonicalKey::new(key.clone());
        self.partition_for(&key).remove_value(&key, expected)
    }

    pub fn get_and_remove(&self, key: &DataValue) -> Option<DataValue> {
        let key = CanonicalKey::new(key.clone());
        self.partition_for(&key).get_and_remove(&key)
    }

    pub fn remove_all(&self, keys: &[DataValue]) {
        for key in keys {
            self.remove(key);
        }
    }

    /// Drop every entry in every partition.
    pub fn clear(&self) {
        debug!(cache = %self.name, "clearing all partitions");
        for partition in &self.partitions {
            partition.clear();
        }
    }

    pub fn put_all(&self, entries: Vec<CacheEntry>) {
        for entry in entries {
            self.put(entry.key, entry.value);
        }
    }

    /// Entries for the present keys, in request order.
    pub fn get_all(&self, keys: &[DataValue]) -> Vec<CacheEntry> {
        keys.iter()
            .filter_map(|key| {
                self.get(key)
                    .map(|value| CacheEntry::new(key.clone(), value))
            })
            .collect()
    }

    pub fn contains_key(&self, key: &DataValue) -> bool {
        let key = CanonicalKey::new(key.clone());
        self.partition_for(&key).contains_key(&key)
    }

    /// True only if every supplied key is present.
    pub fn contains_keys(&self, keys: &[DataValue]) -> bool {
        keys.iter().all(|key| self.contains_key(key))
    }

    /// Cluster-wide entry count.
    pub fn size(&self) -> u64 {
        self.partitions.iter().map(|partition| partition.len()).sum()
    }

    /// Entry count of one node's partition.
    pub fn local_size(&self, partition: usize) -> u64 {
        self.partitions
            .get(partition)
            .map(|store| store.len())
            .unwrap_or(0)
    }
}

/// Lazily-created named caches, shared by the engine, the client, and every
/// fragment context.
#[derive(Debug, Clone)]
pub struct CacheRegistry {
    partition_count: usize,
    caches: Arc<Mutex<HashMap<String, Arc<PartitionedCache>>>>,
}

impl CacheRegistry {
    pub fn new(partition_count: usize) -> Self {
        Self {
            partition_count,
            caches: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Handle to the named cache, creating it on first use.
    pub fn get_or_create(&self, name: &str) -> Arc<PartitionedCache> {
        let mut caches = self.caches.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(caches.entry(name.to_string()).or_insert_with(|| {
            debug!(cache = name, partitions = self.partition_count, "creating cache");
            Arc::new(PartitionedCache::new(name, self.partition_count))
        }))
    }
}
