//! Block transmission task.
//!
//! Receives processed blocks from the main loop and writes them to the UART via
//! DMA while the main loop keeps reading and processing the next block. Each
//! write is bracketed by `tx_start` right before the DMA request and `tx_stop`
//! once the UART is no longer busy. DMA completion only means the last byte
//! reached the TX FIFO, so the FIFO is drained before the timer stops.

use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use uart_measure::config::{BLOCK_HEADER_LEN, MAX_SLOT};

use super::{RESPONSE_CAPACITY, TX_DONE, UART_TX};
use crate::MEASUREMENTS;

/// A processed block waiting for transmission.
pub struct TxRequest {
    /// Slot tracking this transfer (`block_id % MAX_SLOT`).
    pub slot: u8,
    pub block_id: u32,
    pub input_len: u32,
    pub comp_time_us: u32,
    /// `[len: u16 LE][payload]` as sent on the wire.
    pub response: Vec<u8, RESPONSE_CAPACITY>,
}

impl TxRequest {
    /// Payload length without the length prefix.
    pub fn output_len(&self) -> u32 { self.response.len().saturating_sub(BLOCK_HEADER_LEN) as u32 }
}

/// Pending blocks, at most one per slot.
pub static TX_QUEUE: Channel<CriticalSectionRawMutex, TxRequest, MAX_SLOT> = Channel::new();

/// Block TX task - runs in parallel with block processing.
#[embassy_executor::task]
pub async fn block_tx_task() {
    info!("Block TX task started");

    loop {
        let request = TX_QUEUE.receive().await;

        {
            let mut guard = UART_TX.lock().await;
            if let Some(tx) = guard.as_mut() {
                MEASUREMENTS.tx_start(
                    request.slot,
                    request.block_id,
                    request.input_len,
                    request.output_len(),
                    request.comp_time_us,
                );

                let result = match tx.write(&request.response).await {
                    Ok(()) => MEASUREMENTS.tx_stop_after(request.slot, || tx.blocking_flush()),
                    Err(e) => Err(e),
                };
                // Slot stays armed until the next reset
                if let Err(e) = result {
                    warn!("block {} write failed: {}", request.block_id, e);
                }
            } else {
                warn!("UART not ready, block {} dropped", request.block_id);
            }
        }

        TX_DONE.signal(request.block_id);
    }
}
