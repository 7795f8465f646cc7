//! Blocking UART transmitter for measurement frames.
//!
//! Writes in small chunks so the deadline is checked while the TX FIFO drains.
//! At 38400 baud one chunk takes ~4 ms, which bounds the timeout overshoot.

use embassy_rp::uart::{Async, UartTx};
use embassy_time::{Duration, Instant};
use uart_measure::{Transmit, TxError};

/// Bytes written between deadline checks.
const CHUNK_LEN: usize = 16;

/// Borrowed UART transmitter implementing `Transmit`.
pub struct BlockingUart<'a> {
    tx: &'a mut UartTx<'static, Async>,
}

impl<'a> BlockingUart<'a> {
    pub fn new(tx: &'a mut UartTx<'static, Async>) -> Self { Self { tx } }
}

impl Transmit for BlockingUart<'_> {
    fn transmit(
        &mut self,
        bytes: &[u8],
        timeout_ms: u32,
    ) -> Result<(), TxError> {
        let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));

        for chunk in bytes.chunks(CHUNK_LEN) {
            if Instant::now() >= deadline {
                return Err(TxError::Timeout);
            }
            self.tx.blocking_write(chunk).map_err(|_| TxError::Bus)?;
        }

        self.tx.blocking_flush().map_err(|_| TxError::Bus)
    }
}
