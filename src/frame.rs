//! Measurement frame encoder.
//!
//! Serializes the record store into one length-prefixed frame and hands it to
//! a blocking transmitter. The store is reset after every attempt, successful
//! or not: there is no retry and no acknowledgment.
//!
//! # Frame Format (little-endian)
//!
//! | Offset | Size     | Field   | Value                          |
//! |--------|----------|---------|--------------------------------|
//! | 0      | 1        | sync0   | `0xA5`                         |
//! | 1      | 1        | sync1   | `0x5A`                         |
//! | 2      | 1        | type    | `0x01` (measurements)          |
//! | 3      | 2        | length  | payload bytes (records × 20)   |
//! | 5      | length   | payload | packed `MeasurementRecord`s    |
//!
//! The transmit call blocks and shares the UART with slot-tracked writes, so
//! only flush once every slot is Idle.

use crate::clock::CycleCounter;
use crate::config::{MAX_RECORDS, TX_TIMEOUT_MS};
use crate::measure::Measurements;
use crate::record::{MeasurementRecord, RECORD_SIZE};
use crate::shared::SharedMeasurements;

/// First sync byte.
pub const SYNC0: u8 = 0xA5;
/// Second sync byte.
pub const SYNC1: u8 = 0x5A;
/// Sync (2) + type (1) + length (2).
pub const HEADER_LEN: usize = 5;
/// Largest payload a frame can carry.
pub const MAX_PAYLOAD_SIZE: usize = MAX_RECORDS * RECORD_SIZE;
/// Largest complete frame.
pub const FRAME_CAPACITY: usize = HEADER_LEN + MAX_PAYLOAD_SIZE;

// Payload length must fit the u16 length field
const _: () = assert!(MAX_PAYLOAD_SIZE <= u16::MAX as usize);

/// Frame type byte.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum FrameType {
    Measurements = 0x01,
}

/// Transmit failure reported by the UART collaborator.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum TxError {
    /// Deadline passed before all bytes were written.
    Timeout,
    /// Peripheral reported an error.
    Bus,
}

/// Blocking byte transmitter (UART).
pub trait Transmit {
    /// Write all of `bytes`, giving up after `timeout_ms`.
    fn transmit(
        &mut self,
        bytes: &[u8],
        timeout_ms: u32,
    ) -> Result<(), TxError>;
}

/// Result of a `send_measurements` call. Informational only.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum SendOutcome {
    /// No transmitter configured, nothing sent, store untouched.
    NotConfigured,
    /// No records, nothing sent.
    Empty,
    /// Frame with `records` records handed to the transmitter.
    Sent { records: usize },
    /// Transmitter failed; the records are lost.
    Failed { records: usize, error: TxError },
}

/// Encode `records` into `buf`, returning the frame length.
///
/// At most `MAX_RECORDS` records are encoded; any beyond that are ignored.
pub fn encode_frame(
    records: &[MeasurementRecord],
    buf: &mut [u8; FRAME_CAPACITY],
) -> usize {
    let count = records.len().min(MAX_RECORDS);
    let payload_len = count * RECORD_SIZE;
    let len_bytes = (payload_len as u16).to_le_bytes();

    buf[0] = SYNC0;
    buf[1] = SYNC1;
    buf[2] = FrameType::Measurements as u8;
    buf[3] = len_bytes[0];
    buf[4] = len_bytes[1];

    let payload = &mut buf[HEADER_LEN..HEADER_LEN + payload_len];
    for (chunk, record) in payload.chunks_exact_mut(RECORD_SIZE).zip(records) {
        chunk.copy_from_slice(&record.to_le_bytes());
    }

    HEADER_LEN + payload_len
}

/// Frame encoder owning the frame buffer and the transmit collaborator.
pub struct FrameEncoder<T> {
    tx: Option<T>,
    buf: [u8; FRAME_CAPACITY],
    timeout_ms: u32,
}

impl<T: Transmit> FrameEncoder<T> {
    /// Create an encoder with no transmitter. Sends are no-ops until `set_transmitter`.
    pub const fn new() -> Self {
        Self {
            tx: None,
            buf: [0u8; FRAME_CAPACITY],
            timeout_ms: TX_TIMEOUT_MS,
        }
    }

    /// Assign the transmitter used for frames.
    pub fn set_transmitter(
        &mut self,
        tx: T,
    ) {
        self.tx = Some(tx);
    }

    /// Remove and return the transmitter.
    pub fn take_transmitter(&mut self) -> Option<T> { self.tx.take() }

    /// Check whether a transmitter is assigned.
    #[inline]
    pub const fn is_configured(&self) -> bool { self.tx.is_some() }

    /// Encode all stored records, transmit them, then reset `meas`.
    pub fn send_measurements<C: CycleCounter, const N: usize>(
        &mut self,
        meas: &mut Measurements<C, N>,
    ) -> SendOutcome {
        if self.tx.is_none() {
            return SendOutcome::NotConfigured;
        }
        let records = meas.count().min(MAX_RECORDS);
        if records == 0 {
            return SendOutcome::Empty;
        }
        let len = encode_frame(meas.snapshot(), &mut self.buf);
        let outcome = self.transmit_frame(len, records);
        meas.reset();
        outcome
    }

    /// Same as `send_measurements` for critical-section guarded state.
    ///
    /// Encoding happens inside the critical section; the blocking transmit
    /// happens outside it so completion interrupts keep running.
    pub fn send_shared<C: CycleCounter, const N: usize>(
        &mut self,
        shared: &SharedMeasurements<C, N>,
    ) -> SendOutcome {
        if self.tx.is_none() {
            return SendOutcome::NotConfigured;
        }
        let buf = &mut self.buf;
        let (len, records) = shared.with(|m| {
            let records = m.count().min(MAX_RECORDS);
            (encode_frame(m.snapshot(), buf), records)
        });
        if records == 0 {
            return SendOutcome::Empty;
        }
        let outcome = self.transmit_frame(len, records);
        shared.reset();
        outcome
    }

    fn transmit_frame(
        &mut self,
        len: usize,
        records: usize,
    ) -> SendOutcome {
        let Some(tx) = self.tx.as_mut() else {
            return SendOutcome::NotConfigured;
        };
        match tx.transmit(&self.buf[..len], self.timeout_ms) {
            Ok(()) => {
                log_info!("measurement frame sent: {} records, {} bytes", records, len);
                SendOutcome::Sent { records }
            }
            Err(error) => {
                log_warn!("measurement frame dropped: {} records, {}", records, error);
                SendOutcome::Failed { records, error }
            }
        }
    }
}

impl<T: Transmit> Default for FrameEncoder<T> {
    fn default() -> Self { Self::new() }
}
