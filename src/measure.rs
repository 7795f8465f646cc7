//! Measurement façade: cycle clock, record store and TX slots behind one API.
//!
//! The store and the slot table share a single `reset()`: a slot left Armed
//! across a reset must never complete into the next run's records.
//!
//! # Usage
//!
//! ```ignore
//! let mut meas = Measurements::new(Dwt::new());
//! meas.init();
//! meas.set_cpu_hz(150_000_000);
//!
//! meas.comp_start();
//! let out_len = compress(block, &mut out);
//! let comp_us = meas.comp_end();
//!
//! meas.tx_start(0, id, block.len() as u32, out_len, comp_us);
//! // ... start DMA write, completion context calls:
//! meas.tx_stop(0);
//! ```

use crate::clock::{CycleClock, CycleCounter};
use crate::config::{MAX_RECORDS, MAX_SLOT};
use crate::record::MeasurementRecord;
use crate::slots::SlotTracker;
use crate::store::RecordStore;

/// Measurement state for one run, holding up to `N` records.
pub struct Measurements<C, const N: usize = MAX_RECORDS> {
    clock: CycleClock<C>,
    store: RecordStore<N>,
    slots: SlotTracker<MAX_SLOT>,
}

impl<C: CycleCounter, const N: usize> Measurements<C, N> {
    /// Create an empty measurement state. Call `init` before measuring.
    pub const fn new(counter: C) -> Self {
        Self {
            clock: CycleClock::new(counter),
            store: RecordStore::new(),
            slots: SlotTracker::new(),
        }
    }

    // =========================================================================
    // System
    // =========================================================================

    /// Enable and zero the cycle counter.
    pub fn init(&mut self) { self.clock.init(); }

    /// Set the reference frequency for cycle conversions.
    pub fn set_cpu_hz(
        &mut self,
        hz: u32,
    ) {
        self.clock.set_frequency(hz);
    }

    #[inline]
    pub const fn cpu_hz(&self) -> u32 { self.clock.frequency() }

    #[inline]
    pub const fn clock(&self) -> &CycleClock<C> { &self.clock }

    /// Clear all records and return every slot to Idle.
    pub fn reset(&mut self) {
        self.store.clear();
        self.slots.disarm_all();
    }

    /// Borrow the stored records. Do not hold across `reset`.
    #[inline]
    pub fn snapshot(&self) -> &[MeasurementRecord] { self.store.records() }

    /// Number of stored records.
    #[inline]
    pub fn count(&self) -> usize { self.store.len() }

    /// Check whether `slot` has a transmission in flight.
    #[inline]
    pub fn is_armed(
        &self,
        slot: u8,
    ) -> bool {
        self.slots.is_armed(slot)
    }

    // =========================================================================
    // Computation
    // =========================================================================

    /// Start timing a computation.
    pub fn comp_start(&mut self) { self.clock.comp_start(); }

    /// Microseconds since `comp_start`.
    pub fn comp_end(&self) -> u32 { self.clock.comp_end() }

    // =========================================================================
    // Transmission
    // =========================================================================

    /// Append a fully formed record. Returns `false` if the store is full.
    pub fn log(
        &mut self,
        record: MeasurementRecord,
    ) -> bool {
        self.store.log(record)
    }

    /// Log a blocking transfer whose duration was measured in raw cycles.
    pub fn log_blocking(
        &mut self,
        block_id: u32,
        input_len: u32,
        output_len: u32,
        comp_time_us: u32,
        duration_cycles: u32,
    ) -> bool {
        let tx_time_us = self.clock.to_micros(duration_cycles);
        self.log(MeasurementRecord::new(block_id, input_len, output_len, comp_time_us, tx_time_us))
    }

    /// Snapshot block metadata and start the TX timer for `slot`.
    ///
    /// Call immediately before issuing the non-blocking write.
    pub fn tx_start(
        &mut self,
        slot: u8,
        block_id: u32,
        input_len: u32,
        output_len: u32,
        comp_time_us: u32,
    ) {
        let now = self.clock.now();
        self.slots.start(slot, block_id, input_len, output_len, comp_time_us, now);
    }

    /// Stop the TX timer for `slot` and store the completed record.
    ///
    /// Call from the write-completion context. Returns `true` only when a record
    /// was appended; Idle/invalid slots and a full store return `false`.
    pub fn tx_stop(
        &mut self,
        slot: u8,
    ) -> bool {
        let Some(tx) = self.slots.take(slot) else {
            log_debug!("tx_stop on idle slot {}", slot);
            return false;
        };
        let tx_time_us = self.clock.micros_since(tx.tx_start);
        self.log(MeasurementRecord::new(
            tx.block_id,
            tx.input_len,
            tx.output_len,
            tx.comp_time_us,
            tx_time_us,
        ))
    }
}
