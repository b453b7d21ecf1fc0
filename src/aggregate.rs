//! Frequency counts over records, by one key or cross-tabulated by two.

use std::collections::BTreeMap;

/// Count of records per key.
///
/// Only observed keys are present. Enumeration follows the key's `Ord`, which
/// keeps output deterministic; the counts always sum to [`FrequencyTable::total`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<K> {
    counts: BTreeMap<K, usize>,
    total: usize,
}

impl<K: Ord> FrequencyTable<K> {
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count for `key`, zero when it was never observed
    pub fn get(&self, key: &K) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Share of `key` in the table as a percentage (0-100)
    pub fn percentage(&self, key: &K) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.get(key) as f64 * 100.0 / self.total as f64
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.counts.iter().map(|(key, count)| (key, *count))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.counts.keys()
    }
}

impl<K: Ord> FromIterator<K> for FrequencyTable<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut counts = BTreeMap::new();
        let mut total = 0;
        for key in iter {
            *counts.entry(key).or_insert(0) += 1;
            total += 1;
        }
        Self { counts, total }
    }
}

/// Counts `records` grouped by `key`.
pub fn aggregate<R, K, F>(records: impl IntoIterator<Item = R>, key: F) -> FrequencyTable<K>
where
    K: Ord,
    F: Fn(&R) -> K,
{
    records.into_iter().map(|record| key(&record)).collect()
}

/// Counts `records` grouped by the pair `(primary, secondary)`.
pub fn aggregate_by<R, K1, K2, F1, F2>(
    records: impl IntoIterator<Item = R>,
    primary: F1,
    secondary: F2,
) -> FrequencyTable<(K1, K2)>
where
    K1: Ord,
    K2: Ord,
    F1: Fn(&R) -> K1,
    F2: Fn(&R) -> K2,
{
    aggregate(records, |record| (primary(record), secondary(record)))
}
