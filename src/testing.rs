//! Host test doubles for the hardware collaborators.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

// Host critical-section implementation (`std` feature) for SharedMeasurements
use critical_section as _;

use crate::clock::CycleCounter;
use crate::frame::{Transmit, TxError};

/// Cycle counter whose value is set by the test.
///
/// Clones share state, so a test can keep a handle after moving one into a clock.
#[derive(Clone, Default)]
pub struct ManualCounter {
    now: Rc<Cell<u32>>,
    enabled: Rc<Cell<bool>>,
}

impl ManualCounter {
    pub fn new() -> Self { Self::default() }

    pub fn set(
        &self,
        cycles: u32,
    ) {
        self.now.set(cycles);
    }

    pub fn advance(
        &self,
        cycles: u32,
    ) {
        self.now.set(self.now.get().wrapping_add(cycles));
    }

    pub fn is_enabled(&self) -> bool { self.enabled.get() }
}

impl CycleCounter for ManualCounter {
    fn enable(&mut self) { self.enabled.set(true); }

    fn reset(&mut self) { self.now.set(0); }

    fn read(&self) -> u32 { self.now.get() }
}

/// Transmitter that records every frame and replies with a preset result.
#[derive(Clone, Default)]
pub struct RecordingTx {
    frames: Rc<RefCell<Vec<Vec<u8>>>>,
    timeouts: Rc<RefCell<Vec<u32>>>,
    fail_with: Rc<Cell<Option<TxError>>>,
}

impl RecordingTx {
    pub fn new() -> Self { Self::default() }

    pub fn fail_with(
        &self,
        error: TxError,
    ) {
        self.fail_with.set(Some(error));
    }

    pub fn frames(&self) -> Vec<Vec<u8>> { self.frames.borrow().clone() }

    pub fn timeouts(&self) -> Vec<u32> { self.timeouts.borrow().clone() }
}

impl Transmit for RecordingTx {
    fn transmit(
        &mut self,
        bytes: &[u8],
        timeout_ms: u32,
    ) -> Result<(), TxError> {
        self.frames.borrow_mut().push(bytes.to_vec());
        self.timeouts.borrow_mut().push(timeout_ms);
        match self.fail_with.get() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
