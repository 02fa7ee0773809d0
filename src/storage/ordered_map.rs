// src/storage/ordered_map.rs
//! Ordered key/value table with per-entry and per-table byte budgets.
//!
//! Both registry tables sit on top of the [`OrderedMap`] contract:
//! - point lookup and existence checks
//! - insert/overwrite and remove as single atomic steps
//! - full enumeration in key order
//!
//! Sizes are measured on the JSON encoding of each key and value, the same
//! encoding [`FileMap`](super::FileMap) stores.

use crate::error::StorageError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Storage contract consumed by the issuer registry and credential store.
///
/// Writes fail when the entry does not fit the table's limits or the backing
/// medium rejects the write; a failed write leaves the table unchanged. Reads
/// fail only when the backing medium cannot be read.
pub trait OrderedMap<K, V>: Send {
    fn get(&self, key: &K) -> Result<Option<V>, StorageError>;

    fn contains_key(&self, key: &K) -> Result<bool, StorageError>;

    /// Inserts or overwrites `key`, returning the replaced value.
    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, StorageError>;

    /// Removes `key`. Removing an absent key is a no-op returning `None`.
    fn remove(&mut self, key: &K) -> Result<Option<V>, StorageError>;

    /// All keys in ascending order.
    fn keys(&self) -> Result<Vec<K>, StorageError>;

    /// All values in ascending key order.
    fn values(&self) -> Result<Vec<V>, StorageError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encoded bytes currently charged against the capacity budget.
    fn used_bytes(&self) -> usize;
}

/// Size ceilings for one table.
///
/// # Fields
/// - `max_key_bytes`: largest accepted encoded key
/// - `max_value_bytes`: largest accepted encoded value
/// - `capacity_bytes`: budget for the sum of all live entries (key + value)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapLimits {
    pub max_key_bytes: usize,
    pub max_value_bytes: usize,
    pub capacity_bytes: usize,
}

impl MapLimits {
    pub fn new(max_key_bytes: usize, max_value_bytes: usize, capacity_bytes: usize) -> Self {
        MapLimits {
            max_key_bytes,
            max_value_bytes,
            capacity_bytes,
        }
    }

    /// No ceilings at all.
    pub fn unbounded() -> Self {
        MapLimits::new(usize::MAX, usize::MAX, usize::MAX)
    }

    /// Checks an entry against the key and value ceilings.
    ///
    /// # Returns
    /// Encoded size of the entry (key + value)
    pub(crate) fn measure<K, V>(&self, key: &K, value: &V) -> Result<usize, StorageError>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        let key_size = encoded_len(key)?;
        if key_size > self.max_key_bytes {
            return Err(StorageError::KeyTooLarge {
                size: key_size,
                limit: self.max_key_bytes,
            });
        }

        let value_size = encoded_len(value)?;
        if value_size > self.max_value_bytes {
            return Err(StorageError::ValueTooLarge {
                size: value_size,
                limit: self.max_value_bytes,
            });
        }

        Ok(key_size + value_size)
    }

    /// Checks that replacing `freed` bytes with `requested` bytes fits the budget.
    ///
    /// # Returns
    /// The table's new used byte count
    pub(crate) fn admit(
        &self,
        used: usize,
        freed: usize,
        requested: usize,
    ) -> Result<usize, StorageError> {
        let remaining = used - freed;
        let available = self.capacity_bytes.saturating_sub(remaining);

        if requested > available {
            return Err(StorageError::CapacityExceeded {
                requested,
                available,
                capacity: self.capacity_bytes,
            });
        }
        Ok(remaining + requested)
    }
}

pub(crate) fn encoded_len<T: Serialize + ?Sized>(item: &T) -> Result<usize, StorageError> {
    Ok(serde_json::to_vec(item)?.len())
}

/// In-memory [`OrderedMap`] backed by a `BTreeMap`.
///
/// Used for ephemeral registries and tests.
#[derive(Debug, Clone)]
pub struct MemoryMap<K, V> {
    entries: BTreeMap<K, V>,
    limits: MapLimits,
    used_bytes: usize,
}

impl<K, V> MemoryMap<K, V>
where
    K: Ord + Clone + Serialize,
    V: Clone + Serialize,
{
    pub fn new(limits: MapLimits) -> Self {
        MemoryMap {
            entries: BTreeMap::new(),
            limits,
            used_bytes: 0,
        }
    }

    pub fn limits(&self) -> MapLimits {
        self.limits
    }

    fn stored_size(&self, key: &K) -> Result<usize, StorageError> {
        match self.entries.get(key) {
            Some(value) => Ok(encoded_len(key)? + encoded_len(value)?),
            None => Ok(0),
        }
    }
}

impl<K, V> OrderedMap<K, V> for MemoryMap<K, V>
where
    K: Ord + Clone + Serialize + Send,
    V: Clone + Serialize + Send,
{
    fn get(&self, key: &K) -> Result<Option<V>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn contains_key(&self, key: &K) -> Result<bool, StorageError> {
        Ok(self.entries.contains_key(key))
    }

    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, StorageError> {
        let requested = self.limits.measure(&key, &value)?;
        let freed = self.stored_size(&key)?;
        self.used_bytes = self.limits.admit(self.used_bytes, freed, requested)?;
        Ok(self.entries.insert(key, value))
    }

    fn remove(&mut self, key: &K) -> Result<Option<V>, StorageError> {
        let freed = self.stored_size(key)?;
        let removed = self.entries.remove(key);
        self.used_bytes -= freed;
        Ok(removed)
    }

    fn keys(&self) -> Result<Vec<K>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn values(&self) -> Result<Vec<V>, StorageError> {
        Ok(self.entries.values().cloned().collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn used_bytes(&self) -> usize {
        self.used_bytes
    }
}
