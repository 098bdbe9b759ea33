//! Dual-mode cache facades.
//!
//! The same operation contracts are exposed through two distinct capability
//! interfaces: [`ClientCache`] is the asynchronous accessor used by the
//! orchestrating process, and [`FragmentCache`] is the blocking accessor
//! handed to fragment handlers running colocated with the data. Keys and
//! values are structured data compared by deep structural equality; each
//! operation is atomic with respect to its single key.

mod partitioned;

pub use partitioned::{CacheRegistry, PartitionedCache};

use std::sync::Arc;

use crate::error::GridResult;
use ember_common::value::{CacheEntry, DataValue};

/// Asynchronous client-side accessor for one named cache.
#[derive(Debug, Clone)]
pub struct ClientCache {
    backing: Arc<PartitionedCache>,
    local_partition: usize,
}

impl ClientCache {
    pub(crate) fn new(backing: Arc<PartitionedCache>, local_partition: usize) -> Self {
        Self {
            backing,
            local_partition,
        }
    }

    pub fn name(&self) -> &str {
        self.backing.name()
    }

    pub async fn get(&self, key: &DataValue) -> GridResult<Option<DataValue>> {
        Ok(self.backing.get(key))
    }

    pub async fn put(&self, key: DataValue, value: DataValue) -> GridResult<()> {
        self.backing.put(key, value);
        Ok(())
    }

    /// Upsert returning the previous value.
    pub async fn get_and_put(
        &self,
        key: DataValue,
        value: DataValue,
    ) -> GridResult<Option<DataValue>> {
        Ok(self.backing.get_and_put(key, value))
    }

    /// True iff an insert occurred; the stored value is unchanged on false.
    pub async fn put_if_absent(&self, key: DataValue, value: DataValue) -> GridResult<bool> {
        Ok(self.backing.put_if_absent(key, value))
    }

    /// Present: prior value, no mutation. Absent: insert, `None`.
    pub async fn get_and_put_if_absent(
        &self,
        key: DataValue,
        value: DataValue,
    ) -> GridResult<Option<DataValue>> {
        Ok(self.backing.get_and_put_if_absent(key, value))
    }

    /// Replace only if the key is present.
    pub async fn replace(&self, key: DataValue, value: DataValue) -> GridResult<bool> {
        Ok(self.backing.replace(key, value))
    }

    /// Replace only if the current value deep-equals `expected`.
    pub async fn replace_value(
        &self,
        key: DataValue,
        expected: &DataValue,
        value: DataValue,
    ) -> GridResult<bool> {
        Ok(self.backing.replace_value(key, expected, value))
    }

    /// Upsert with previous-value return; inserts when no prior entry
    /// existed.
    pub async fn get_and_replace(
        &self,
        key: DataValue,
        value: DataValue,
    ) -> GridResult<Option<DataValue>> {
        Ok(self.backing.get_and_replace(key, value))
    }

    /// True iff the key was present; an absent key returns false.
    pub async fn remove(&self, key: &DataValue) -> GridResult<bool> {
        Ok(self.backing.remove(key))
    }

    /// Remove only if the current value deep-equals `expected`.
    pub async fn remove_value(
        &self,
        key: &DataValue,
        expected: &DataValue,
    ) -> GridResult<bool> {
        Ok(self.backing.remove_value(key, expected))
    }

    pub async fn get_and_remove(&self, key: &DataValue) -> GridResult<Option<DataValue>> {
        Ok(self.backing.get_and_remove(key))
    }

    pub async fn remove_all(&self, keys: &[DataValue]) -> GridResult<()> {
        self.backing.remove_all(keys);
        Ok(())
    }

    /// Remove every entry of the cache.
    pub async fn clear(&self) -> GridResult<()> {
        self.backing.clear();
        Ok(())
    }

    pub async fn put_all(&self, entries: Vec<CacheEntry>) -> GridResult<()> {
        self.backing.put_all(entries);
        Ok(())
    }

    /// Entries for the present keys, in request order.
    pub async fn get_all(&self, keys: &[DataValue]) -> GridResult<Vec<CacheEntry>> {
        Ok(self.backing.get_all(keys))
    }

    pub async fn contains_key(&self, key: &DataValue) -> GridResult<bool> {
        Ok(self.backing.contains_key(key))
    }

    /// True only if every supplied key is present.
    pub async fn contains_keys(&self, keys: &[DataValue]) -> GridResult<bool> {
        Ok(self.backing.contains_keys(keys))
    }

    /// Cluster-wide entry count.
    pub async fn size(&self) -> GridResult<u64> {
        Ok(self.backing.size())
    }

    /// Entry count of the partition resident on the client's local node.
    pub async fn local_size(&self) -> GridResult<u64> {
        Ok(self.backing.local_size(self.local_partition))
    }
}

/// Blocking accessor available to a fragment handler, scoped to the node
/// the fragment is bound to.
#[derive(Debug, Clone)]
pub struct FragmentCache {
    backing: Arc<PartitionedCache>,
    local_partition: usize,
}

impl FragmentCache {
    pub(crate) fn new(backing: Arc<PartitionedCache>, local_partition: usize) -> Self {
        Self {
            backing,
            local_partition,
        }
    }

    pub fn name(&self) -> &str {
        self.backing.name()
    }

    pub fn get(&self, key: &DataValue) -> Option<DataValue> {
        self.backing.get(key)
    }

    pub fn put(&self, key: DataValue, value: DataValue) {
        self.backing.put(key, value);
    }

    pub fn get_and_put(&self, key: DataValue, value: DataValue) -> Option<DataValue> {
        self.backing.get_and_put(key, value)
    }

    pub fn put_if_absent(&self, key: DataValue, value: DataValue) -> bool {
        self.backing.put_if_absent(key, value)
    }

    pub fn get_and_put_if_absent(&self, key: DataValue, value: DataValue) -> Option<DataValue> {
        self.backing.get_and_put_if_absent(key, value)
    }

    pub fn replace(&self, key: DataValue, value: DataValue) -> bool {
        self.backing.replace(key, value)
    }

    pub fn replace_value(&self, key: DataValue, expected: &DataValue, value: DataValue) -> bool {
        self.backing.replace_value(key, expected, value)
    }

    pub fn get_and_replace(&self, key: DataValue, value: DataValue) -> Option<DataValue> {
        self.backing.get_and_replace(key, value)
    }

    pub fn remove(&self, key: &DataValue) -> bool {
        self.backing.remove(key)
    }

    pub fn remove_value(&self, key: &DataValue, expected: &DataValue) -> bool {
        self.backing.remove_value(key, expected)
    }

    pub fn get_and_remove(&self, key: &DataValue) -> Option<DataValue> {
        self.backing.get_and_remove(key)
    }

    pub fn remove_all(&self, keys: &[DataValue]) {
        self.backing.remove_all(keys);
    }

    pub fn clear(&self) {
        self.backing.clear();
    }

    pub fn put_all(&self, entries: Vec<CacheEntry>) {
        self.backing.put_all(entries);
    }

    pub fn get_all(&self, keys: &[DataValue]) -> Vec<CacheEntry> {
        self.backing.get_all(keys)
    }

    pub fn contains_key(&self, key: &DataValue) -> bool {
        self.backing.contains_key(key)
    }

    pub fn contains_keys(&self, keys: &[DataValue]) -> bool {
        self.backing.contains_keys(keys)
    }

    /// Cluster-wide entry count, visible from inside the fragment.
    pub fn size(&self) -> u64 {
        self.backing.size()
    }

    /// Entry count of the partition resident on this fragment's node.
    pub fn local_size(&self) -> u64 {
        self.backing.local_size(self.local_partition)
    }
}
