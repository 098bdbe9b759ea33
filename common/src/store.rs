//! Single-partition entry store.
//!
//! One `EntryStore` holds the entries of one cache partition. Every
//! mutating primitive is a single atomic compute on the owning key (the
//! moka entry API evaluates the closure exclusively per key), which is the
//! per-key atomicity the cache contract promises. The store is unbounded
//! and never evicts, so the entry count is tracked exactly.

use moka::ops::compute::Op;
use moka::sync::Cache as MokaCache;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::value::{CanonicalKey, DataValue};

/// Point-in-time statistics for one partition.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StoreStats {
    pub hit_count: u64,
    pub miss_count: u64,
    pub entry_count: u64,
}

impl StoreStats {
    /// Fraction of reads that found an entry.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// In-memory entry store with per-key atomic primitives.
#[derive(Debug)]
pub struct EntryStore {
    inner: MokaCache<CanonicalKey, DataValue>,
    len: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::with_initial_capacity(64)
    }

    pub fn with_initial_capacity(capacity: usize) -> Self {
        Self {
            inner: MokaCache::builder().initial_capacity(capacity).build(),
            len: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &CanonicalKey) -> Option<DataValue> {
        let result = self.inner.get(key);
        if result.is_some() {
            self.hits.fetch_add(1, Ordering::AcqRel);
        } else {
            self.misses.fetch_add(1, Ordering::AcqRel);
        }
        result
    }

    /// Unconditional upsert.
    pub fn put(&self, key: CanonicalKey, value: DataValue) {
        let _ = self.get_and_put(key, value);
    }

    /// Upsert returning the previous value, if any.
    pub fn get_and_put(&self, key: CanonicalKey, value: DataValue) -> Option<DataValue> {
        let mut previous = None;
        self.inner.entry(key).and_compute_with(|current| {
            previous = current.map(|entry| entry.into_value());
            Op::Put(value)
        });
        if previous.is_none() {
            self.len.fetch_add(1, Ordering::AcqRel);
        }
        previous
    }

    /// Insert only if absent. Returns true iff an insert occurred.
    pub fn put_if_absent(&self, key: CanonicalKey, value: DataValue) -> bool {
        let mut inserted = false;
        self.inner.entry(key).and_compute_with(|current| {
            if current.is_none() {
                inserted = true;
                Op::Put(value)
            } else {
                Op::Nop
            }
        });
        if inserted {
            self.len.fetch_add(1, Ordering::AcqRel);
        }
        inserted
    }

    /// Present: return the prior value without mutating. Absent: insert and
    /// return `None`.
    pub fn get_and_put_if_absent(&self, key: CanonicalKey, value: DataValue) -> Option<DataValue> {
        let mut previous = None;
        self.inner.entry(key).and_compute_with(|current| match current {
            Some(entry) => {
                previous = Some(entry.into_value());
                Op::Nop
            }
            None => Op::Put(value),
        });
        if previous.is_none() {
            self.len.fetch_add(1, Ordering::AcqRel);
        }
        previous
    }

    /// Replace only if the key is present. Returns true iff it mutated.
    pub fn replace(&self, key: CanonicalKey, value: DataValue) -> bool {
        let mut replaced = false;
        self.inner.entry(key).and_compute_with(|current| {
            if current.is_some() {
                replaced = true;
                Op::Put(value)
            } else {
                Op::Nop
            }
        });
        replaced
    }

    /// Replace only if the current value deep-equals `expected`.
    pub fn replace_value(
        &self,
        key: CanonicalKey,
        expected: &DataValue,
        value: DataValue,
    ) -> bool {
        let mut replaced = false;
        self.inner.entry(key).and_compute_with(|current| match current {
            Some(entry) if entry.value() == expected => {
                replaced = true;
                Op::Put(value)
            }
            _ => Op::Nop,
        });
        replaced
    }

    /// Remove the entry. Returns true iff the key was present.
    pub fn remove(&self, key: &CanonicalKey) -> bool {
        self.get_and_remove(key).is_some()
    }

    /// Remove the entry, returning the previous value if any.
    pub fn get_and_remove(&self, key: &CanonicalKey) -> Option<DataValue> {
        let mut previous = None;
        self.inner
            .entry(key.clone())
            .and_compute_with(|current| match current {
                Some(entry) => {
                    previous = Some(entry.into_value());
                    Op::Remove
                }
                None => Op::Nop,
            });
        if previous.is_some() {
            self.len.fetch_sub(1, Ordering::AcqRel);
        }
        previous
    }

    /// Remove only if the current value deep-equals `expected`. No mutation
    /// on mismatch.
    pub fn remove_value(&self, key: &CanonicalKey, expected: &DataValue) -> bool {
        let mut removed = false;
        self.inner
            .entry(key.clone())
            .and_compute_with(|current| match current {
                Some(entry) if entry.value() == expected => {
                    removed = true;
                    Op::Remove
                }
                _ => Op::Nop,
            });
        if removed {
            self.len.fetch_sub(1, Ordering::AcqRel);
        }
        removed
    }

    /// Structural presence check.
    pub fn contains_key(&self, key: &CanonicalKey) -> bool {
        self.inner.contains_key(key)
    }

    /// Exact number of entries in this partition.
    pub fn len(&self) -> u64 {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry, keeping the exact count in step.
    pub fn clear(&self) {
        let keys: Vec<_> = self.inner.iter().map(|(key, _)| key).collect();
        tracing::debug!(entries = keys.len(), "clearing partition");
        for key in keys {
            self.get_and_remove(&key);
        }
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            hit_count: self.hits.load(Ordering::Acquire),
            miss_count: self.misses.load(Ordering::Acquire),
            entry_count: self.len(),
        }
    }
}

impl Default for EntryStore {
    fn default() -> Self {
        Self::new()
    }
}
