//! Measurement and link configuration constants.
//!
//! All state is volatile and re-initialized at boot, so every tunable lives here
//! as a compile-time constant.

// =============================================================================
// Measurement Storage
// =============================================================================

/// Maximum number of completed records held until the next frame flush.
/// Appends beyond this are dropped silently.
pub const MAX_RECORDS: usize = 24;

/// Number of in-flight transmission slots (one per TX buffer).
pub const MAX_SLOT: usize = 2;

// =============================================================================
// Clock
// =============================================================================

/// Reference frequency used for cycle conversion until `set_frequency` is called.
pub const DEFAULT_CPU_HZ: u32 = 72_000_000;

/// RP2350 stock system clock, applied by the firmware at boot.
pub const CPU_FREQ_HZ: u32 = 150_000_000;

// =============================================================================
// UART Link
// =============================================================================

/// Blocking transmit deadline for a measurement frame.
pub const TX_TIMEOUT_MS: u32 = 1000;

/// Baud rate shared with the PC-side benchmark tool.
pub const BAUD_RATE: u32 = 38_400;

/// Input block size sent by the host (last block of a file may be shorter).
pub const BLOCK_SIZE: usize = 512;

/// Length prefix in front of each returned block.
pub const BLOCK_HEADER_LEN: usize = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(MAX_RECORDS, 24);
        assert_eq!(MAX_SLOT, 2);
        assert_eq!(DEFAULT_CPU_HZ, 72_000_000);
        // Block length must fit the u16 length prefix
        assert!(BLOCK_SIZE <= u16::MAX as usize);
    }
}
