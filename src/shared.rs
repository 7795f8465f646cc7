//! Critical-section guarded measurement state.
//!
//! `tx_stop` runs from the UART write-completion context while `log`, `reset`
//! and frame encoding run from the main flow. Every read-modify-write of the
//! record table goes through a `CriticalSectionRawMutex`, so no record is lost
//! or duplicated even on a preemptible or multi-core target.
//!
//! Keep closures passed to `with` short: interrupts are masked while they run.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::clock::CycleCounter;
use crate::config::MAX_RECORDS;
use crate::measure::Measurements;
use crate::record::MeasurementRecord;

/// `Measurements` behind a critical-section mutex, usable from a `static`.
pub struct SharedMeasurements<C, const N: usize = MAX_RECORDS> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Measurements<C, N>>>,
}

impl<C: CycleCounter, const N: usize> SharedMeasurements<C, N> {
    pub const fn new(counter: C) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Measurements::new(counter))),
        }
    }

    /// Run `f` with exclusive access inside a critical section.
    pub fn with<R>(
        &self,
        f: impl FnOnce(&mut Measurements<C, N>) -> R,
    ) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    pub fn log(
        &self,
        record: MeasurementRecord,
    ) -> bool {
        self.with(|m| m.log(record))
    }

    pub fn tx_start(
        &self,
        slot: u8,
        block_id: u32,
        input_len: u32,
        output_len: u32,
        comp_time_us: u32,
    ) {
        self.with(|m| m.tx_start(slot, block_id, input_len, output_len, comp_time_us));
    }

    pub fn tx_stop(
        &self,
        slot: u8,
    ) -> bool {
        self.with(|m| m.tx_stop(slot))
    }

    /// Run `drain` outside the critical section, then close `slot` if it succeeded.
    ///
    /// `drain` waits until the last byte has left the wire; on error the slot
    /// stays Armed and no record is produced.
    pub fn tx_stop_after<E>(
        &self,
        slot: u8,
        drain: impl FnOnce() -> Result<(), E>,
    ) -> Result<bool, E> {
        drain()?;
        Ok(self.tx_stop(slot))
    }

    pub fn reset(&self) { self.with(|m| m.reset()); }

    pub fn count(&self) -> usize { self.with(|m| m.count()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualCounter;

    #[test]
    fn test_shared_start_stop() {
        let counter = ManualCounter::new();
        let shared: SharedMeasurements<ManualCounter> = SharedMeasurements::new(counter.clone());
        shared.with(|m| m.init());

        shared.tx_start(0, 42, 512, 128, 10);
        counter.advance(72_000);
        assert!(shared.tx_stop(0));
        assert!(!shared.tx_stop(0));

        assert_eq!(shared.count(), 1);
        let rec = shared.with(|m| m.snapshot()[0]);
        assert_eq!(rec, MeasurementRecord::new(42, 512, 128, 10, 1000));
    }

    #[test]
    fn test_shared_reset() {
        let shared: SharedMeasurements<ManualCounter, 4> = SharedMeasurements::new(ManualCounter::new());
        shared.log(MeasurementRecord::new(1, 1, 1, 1, 1));
        shared.tx_start(1, 2, 2, 2, 2);

        shared.reset();
        assert_eq!(shared.count(), 0);
        assert!(!shared.with(|m| m.is_armed(1)));
        assert!(!shared.tx_stop(1));
    }

    #[test]
    fn test_tx_stop_after_counts_drain_time() {
        let counter = ManualCounter::new();
        let shared: SharedMeasurements<ManualCounter> = SharedMeasurements::new(counter.clone());
        shared.with(|m| m.init());

        shared.tx_start(1, 7, 512, 512, 3);
        // DMA hand-off to the FIFO
        counter.advance(36_000);
        let drained = shared.tx_stop_after(1, || {
            counter.advance(36_000);
            Ok::<(), ()>(())
        });

        assert_eq!(drained, Ok(true));
        let rec = shared.with(|m| m.snapshot()[0]);
        assert_eq!(rec.tx_time_us, 1000);
    }

    #[test]
    fn test_tx_stop_after_failed_drain_keeps_slot_armed() {
        let shared: SharedMeasurements<ManualCounter> = SharedMeasurements::new(ManualCounter::new());
        shared.tx_start(0, 1, 1, 1, 1);

        assert_eq!(shared.tx_stop_after(0, || Err("bus")), Err("bus"));
        assert!(shared.with(|m| m.is_armed(0)));
        assert_eq!(shared.count(), 0);
    }
}
