//! UART Compute/Transmit Benchmark Firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Receives a file from the PC in fixed-size blocks, processes each block and
//! returns it, timing the computation and the transmission of every block with
//! the DWT cycle counter. After the last block a single measurement frame is
//! sent back for the PC-side report.
//!
//! # Protocol
//!
//! ```text
//! PC  -> MCU: total_size (u32 LE)
//! PC  -> MCU: block (BLOCK_SIZE bytes, last one may be shorter)   ┐ repeated
//! MCU -> PC : out_len (u16 LE) + payload                          ┘
//! MCU -> PC : measurement frame [A5 5A 01 len_lo len_hi records...]
//! ```
//!
//! # Architecture
//!
//! - Main task: reads and processes blocks, queues responses for the TX task
//! - TX task: writes responses via DMA, one measurement slot per in-flight block
//!
//! With the `blocking-tx` feature the main task writes responses itself and logs
//! the measured cycles through the direct logging path instead.

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]

// Modules only used in the binary (not testable on host)
#[cfg(target_arch = "arm")]
mod link;
#[cfg(target_arch = "arm")]
mod tasks;

#[cfg(target_arch = "arm")]
use defmt::{info, warn};
#[cfg(target_arch = "arm")]
use embassy_executor::Spawner;
#[cfg(target_arch = "arm")]
use embassy_rp::bind_interrupts;
#[cfg(target_arch = "arm")]
use embassy_rp::peripherals::UART0;
#[cfg(target_arch = "arm")]
use embassy_rp::uart::{self, Uart};
#[cfg(target_arch = "arm")]
use heapless::Vec;
#[cfg(target_arch = "arm")]
use uart_measure::config::{BAUD_RATE, BLOCK_SIZE, CPU_FREQ_HZ};
#[cfg(target_arch = "arm")]
use uart_measure::{Dwt, FrameEncoder, SharedMeasurements};
#[cfg(target_arch = "arm")]
use {defmt_rtt as _, panic_probe as _};

#[cfg(target_arch = "arm")]
use crate::link::BlockingUart;
#[cfg(target_arch = "arm")]
use crate::tasks::{RESPONSE_CAPACITY, TX_DONE, UART_TX};

#[cfg(target_arch = "arm")]
bind_interrupts!(struct Irqs {
    UART0_IRQ => uart::InterruptHandler<UART0>;
});

/// Measurement state shared by the main loop and the TX completion path.
#[cfg(target_arch = "arm")]
pub static MEASUREMENTS: SharedMeasurements<Dwt> = SharedMeasurements::new(Dwt::new());

// Program metadata for `picotool info`
#[cfg(target_arch = "arm")]
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"uart-bench"),
    embassy_rp::binary_info::rp_program_description!(c"UART compute/transmit benchmark with DWT timing"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

#[cfg(target_arch = "arm")]
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("UART benchmark starting...");

    let p = embassy_rp::init(Default::default());

    // Initialize DWT cycle counter with the actual system clock
    let cpu_freq_hz = embassy_rp::clocks::clk_sys_freq();
    if cpu_freq_hz != CPU_FREQ_HZ {
        warn!("clk_sys {} Hz differs from expected {} Hz", cpu_freq_hz, CPU_FREQ_HZ);
    }
    let cpu_hz = MEASUREMENTS.with(|m| {
        m.init();
        m.set_cpu_hz(cpu_freq_hz);
        m.cpu_hz()
    });
    info!("DWT cycle counter initialized at {} MHz", cpu_hz / 1_000_000);

    // UART0 on GP0 (TX) / GP1 (RX), 8N1
    let mut config = uart::Config::default();
    config.baudrate = BAUD_RATE;
    let uart = Uart::new(p.UART0, p.PIN_0, p.PIN_1, Irqs, p.DMA_CH0, p.DMA_CH1, config);
    let (tx, mut rx) = uart.split();
    *UART_TX.lock().await = Some(tx);
    info!("UART initialized at {} baud", BAUD_RATE);

    #[cfg(not(feature = "blocking-tx"))]
    {
        spawner.spawn(tasks::block_tx_task()).unwrap();
        info!("Block TX task spawned");
    }
    #[cfg(feature = "blocking-tx")]
    {
        let _ = spawner;
        info!("Blocking TX mode, no TX task");
    }

    loop {
        let mut header = [0u8; 4];
        if let Err(e) = rx.read(&mut header).await {
            warn!("header read failed: {}", e);
            continue;
        }
        let total = u32::from_le_bytes(header) as usize;
        info!("Run started: {} bytes", total);

        MEASUREMENTS.reset();
        TX_DONE.reset();

        let mut remaining = total;
        let mut block_id: u32 = 0;
        let mut last_queued: Option<u32> = None;
        let mut input = [0u8; BLOCK_SIZE];

        while remaining > 0 {
            let len = remaining.min(BLOCK_SIZE);
            if let Err(e) = rx.read(&mut input[..len]).await {
                warn!("block {} read failed: {}", block_id, e);
                break;
            }

            MEASUREMENTS.with(|m| m.comp_start());
            let response = process_block(&input[..len]);
            let comp_time_us = MEASUREMENTS.with(|m| m.comp_end());

            send_block(block_id, len as u32, comp_time_us, response).await;
            last_queued = Some(block_id);

            remaining -= len;
            block_id += 1;
        }

        // All block writes must be finished before the frame uses the UART
        if let Some(last) = last_queued {
            while TX_DONE.wait().await != last {}
        }

        let mut guard = UART_TX.lock().await;
        if let Some(tx) = guard.as_mut() {
            let mut encoder = FrameEncoder::new();
            encoder.set_transmitter(BlockingUart::new(tx));
            let outcome = encoder.send_shared(&MEASUREMENTS);
            info!("Run complete: {} blocks, {}", block_id, outcome);
        }
    }
}

/// Process one block into its `[len: u16 LE][payload]` response.
///
/// The block codec is pass-through: the payload is the input unchanged.
#[cfg(target_arch = "arm")]
fn process_block(input: &[u8]) -> Vec<u8, RESPONSE_CAPACITY> {
    let mut response = Vec::new();
    // Capacity covers BLOCK_HEADER_LEN + BLOCK_SIZE, input is at most BLOCK_SIZE
    response.extend_from_slice(&(input.len() as u16).to_le_bytes()).ok();
    response.extend_from_slice(input).ok();
    response
}

/// Queue a block for the TX task (slot-tracked DMA write).
#[cfg(all(target_arch = "arm", not(feature = "blocking-tx")))]
async fn send_block(
    block_id: u32,
    input_len: u32,
    comp_time_us: u32,
    response: Vec<u8, RESPONSE_CAPACITY>,
) {
    use uart_measure::config::MAX_SLOT;

    use crate::tasks::{TX_QUEUE, TxRequest};

    TX_QUEUE
        .send(TxRequest {
            slot: (block_id % MAX_SLOT as u32) as u8,
            block_id,
            input_len,
            comp_time_us,
            response,
        })
        .await;
}

/// Write a block with a blocking UART write and log the measured cycles.
#[cfg(all(target_arch = "arm", feature = "blocking-tx"))]
async fn send_block(
    block_id: u32,
    input_len: u32,
    comp_time_us: u32,
    response: Vec<u8, RESPONSE_CAPACITY>,
) {
    use uart_measure::clock::elapsed;
    use uart_measure::config::BLOCK_HEADER_LEN;

    {
        let mut guard = UART_TX.lock().await;
        if let Some(tx) = guard.as_mut() {
            let start = MEASUREMENTS.with(|m| m.clock().now());
            let result = tx.blocking_write(&response).and_then(|()| tx.blocking_flush());
            let duration_cycles = elapsed(start, MEASUREMENTS.with(|m| m.clock().now()));

            match result {
                Ok(()) => {
                    let output_len = (response.len() - BLOCK_HEADER_LEN) as u32;
                    MEASUREMENTS.with(|m| m.log_blocking(block_id, input_len, output_len, comp_time_us, duration_cycles));
                }
                Err(e) => warn!("block {} write failed: {}", block_id, e),
            }
        }
    }
    TX_DONE.signal(block_id);
}

#[cfg(not(target_arch = "arm"))]
fn main() {
    eprintln!("uart-bench is RP2350 firmware, build it with --target thumbv8m.main-none-eabihf");
}
