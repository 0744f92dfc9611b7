use ahash::{AHashMap, RandomState};
use dashmap::DashMap;

use crate::decimal::Decimal;
use crate::stat::StatRecord;

/// Key → [`StatRecord`] table shared by every worker of a run.
///
/// Each merge runs under the lock of the shard that owns its key, so two
/// merges on the same key serialize and no reader sees a half-applied update.
/// Keys living in different shards never contend.
pub struct AggregationMap {
    stats: DashMap<Box<str>, StatRecord, RandomState>,
}

impl AggregationMap {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stats: DashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Fold one value into `key`'s record.
    pub fn merge(&self, key: &str, value: Decimal) {
        // Fast path: existing key, no allocation
        if let Some(mut slot) = self.stats.get_mut(key) {
            *slot = slot.with_value(value);
            return;
        }
        self.stats
            .entry(key.into())
            .and_modify(|slot| *slot = slot.with_value(value))
            .or_insert_with(|| StatRecord::of(value));
    }

    /// Fold a whole record (e.g. a worker's local result) into `key`.
    pub fn merge_stat(&self, key: &str, record: StatRecord) {
        if record.is_empty() {
            return;
        }
        if let Some(mut slot) = self.stats.get_mut(key) {
            *slot = slot.combine(record);
            return;
        }
        self.stats
            .entry(key.into())
            .and_modify(|slot| *slot = slot.combine(record))
            .or_insert(record);
    }

    pub fn absorb(&self, local: LocalTable) {
        for (key, record) in local.stats {
            self.merge_stat(&key, record);
        }
    }

    pub fn get(&self, key: &str) -> Option<StatRecord> {
        self.stats.get(key).map(|slot| *slot)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Freeze the table. Taking `self` by value means no worker can still
    /// hold a reference to it.
    pub fn into_snapshot(self) -> Snapshot {
        let mut entries: Vec<(Box<str>, StatRecord)> = self.stats.into_iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        Snapshot { entries }
    }
}

impl Default for AggregationMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Worker-private table, folded into the shared map once the worker is done.
#[derive(Default)]
pub struct LocalTable {
    stats: AHashMap<Box<str>, StatRecord>,
}

impl LocalTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stats: AHashMap::with_capacity(capacity),
        }
    }

    pub fn merge(&mut self, key: &str, value: Decimal) {
        match self.stats.get_mut(key) {
            Some(slot) => *slot = slot.with_value(value),
            None => {
                self.stats.insert(key.into(), StatRecord::of(value));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Read-only result of a run, keys in ascending byte order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<(Box<str>, StatRecord)>,
}

impl Snapshot {
    pub fn get(&self, key: &str) -> Option<&StatRecord> {
        self.entries
            .binary_search_by(|(k, _)| (**k).cmp(key))
            .ok()
            .map(|i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatRecord)> {
        self.entries.iter().map(|(k, r)| (&**k, r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
