//! Async tasks for the benchmark firmware.
//!
//! - `block_tx`: Slot-tracked DMA transmission of processed blocks (absent with `blocking-tx`)

use embassy_rp::uart::{Async, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use uart_measure::config::{BLOCK_HEADER_LEN, BLOCK_SIZE};

#[cfg(not(feature = "blocking-tx"))]
pub mod block_tx;

#[cfg(not(feature = "blocking-tx"))]
pub use block_tx::{TX_QUEUE, TxRequest, block_tx_task};

/// Length prefix plus the largest block payload.
pub const RESPONSE_CAPACITY: usize = BLOCK_HEADER_LEN + BLOCK_SIZE;

// =============================================================================
// Main loop <-> block writer synchronization
// =============================================================================

/// Signal carrying the id of the last block whose write finished.
pub static TX_DONE: Signal<CriticalSectionRawMutex, u32> = Signal::new();

/// UART transmitter shared by block writes and the measurement frame flush.
pub static UART_TX: Mutex<CriticalSectionRawMutex, Option<UartTx<'static, Async>>> = Mutex::new(None);
