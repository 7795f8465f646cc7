//! Bounded, append-only table of completed measurement records.
//!
//! Backed by a fixed-capacity `heapless::Vec`, so no allocation ever happens.
//! Once full, appends are dropped (no FIFO eviction): the oldest data of a run
//! is the one that survives.

use heapless::Vec;

use crate::config::MAX_RECORDS;
use crate::record::MeasurementRecord;

/// Record table with capacity `N` (defaults to `MAX_RECORDS`).
pub struct RecordStore<const N: usize = MAX_RECORDS> {
    records: Vec<MeasurementRecord, N>,
}

impl<const N: usize> RecordStore<N> {
    /// Create an empty store.
    pub const fn new() -> Self { Self { records: Vec::new() } }

    /// Append a record. Returns `false` if the store is full and the record was dropped.
    pub fn log(
        &mut self,
        record: MeasurementRecord,
    ) -> bool {
        if self.records.push(record).is_err() {
            log_warn!("record store full ({}), dropping block {}", N, record.block_id);
            return false;
        }
        true
    }

    /// Remove all records.
    pub fn clear(&mut self) { self.records.clear(); }

    /// Stored records in insertion order.
    #[inline]
    pub fn records(&self) -> &[MeasurementRecord] { &self.records }

    /// Number of stored records.
    #[inline]
    pub fn len(&self) -> usize { self.records.len() }

    /// Check if store is empty.
    #[inline]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Check if further appends will be dropped.
    #[inline]
    pub fn is_full(&self) -> bool { self.records.is_full() }

    /// Maximum number of records.
    #[inline]
    pub const fn capacity(&self) -> usize { N }
}

impl<const N: usize> Default for RecordStore<N> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: u32) -> MeasurementRecord { MeasurementRecord::new(id, 512, 256, 100, 200) }

    #[test]
    fn test_new_store_empty() {
        let store: RecordStore = RecordStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.capacity(), MAX_RECORDS);
    }

    #[test]
    fn test_log_preserves_order() {
        let mut store: RecordStore = RecordStore::new();
        assert!(store.log(rec(1)));
        assert!(store.log(rec(2)));
        assert!(store.log(rec(3)));

        let ids: std::vec::Vec<u32> = store.records().iter().map(|r| r.block_id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn test_capacity_two_drops_third() {
        let mut store: RecordStore<2> = RecordStore::new();
        assert!(store.log(rec(1)));
        assert!(store.log(rec(2)));
        assert!(!store.log(rec(3)));

        assert_eq!(store.records(), &[rec(1), rec(2)]);
    }

    #[test]
    fn test_count_capped_at_capacity() {
        let mut store: RecordStore = RecordStore::new();
        let accepted = (0..MAX_RECORDS as u32 + 5).filter(|&i| store.log(rec(i))).count();

        assert_eq!(accepted, MAX_RECORDS);
        assert_eq!(store.len(), MAX_RECORDS);
        assert!(store.is_full());
        // First records survive, no eviction
        assert_eq!(store.records()[0].block_id, 0);
        assert_eq!(store.records()[MAX_RECORDS - 1].block_id, MAX_RECORDS as u32 - 1);
    }

    #[test]
    fn test_clear() {
        let mut store: RecordStore<4> = RecordStore::new();
        for i in 0..4 {
            store.log(rec(i));
        }
        store.clear();
        assert!(store.is_empty());
        assert!(store.log(rec(9)));
        assert_eq!(store.records(), &[rec(9)]);
    }
}
