//! UART measurement library - cycle-accurate timing and telemetry framing.
//!
//! This library contains the measurement core that can be tested on the host machine.
//! The binary (`main.rs`) uses this library and adds the RP2350-specific UART glue.
//!
//! # Data Flow
//!
//! ```text
//! application -> CycleClock -> SlotTracker / log() -> RecordStore -> FrameEncoder -> UART
//! ```
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p uart-measure --lib --target x86_64-unknown-linux-gnu  # Linux/macOS
//! cargo test -p uart-measure --lib --target x86_64-pc-windows-msvc    # Windows
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

// Logging macros must be declared before the modules that use them
#[macro_use]
mod log;

// Configuration
pub mod config;

// Measurement core
pub mod clock;
pub mod measure;
pub mod record;
pub mod shared;
pub mod slots;
pub mod store;

// Wire framing
pub mod frame;

#[cfg(test)]
pub(crate) mod testing;

// Re-export at top level for existing imports
pub use clock::{CycleClock, CycleCounter, Dwt};
pub use frame::{FrameEncoder, SendOutcome, Transmit, TxError};
pub use measure::Measurements;
pub use record::MeasurementRecord;
pub use shared::SharedMeasurements;
