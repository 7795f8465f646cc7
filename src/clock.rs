//! Cycle clock adapter over the Cortex-M33 DWT cycle counter.
//!
//! Converts raw cycle deltas to microseconds using a configurable reference
//! frequency, and keeps the "computation start" reference point.
//!
//! # Overflow Handling
//!
//! CYCCNT is a 32-bit free-running counter that wraps at different intervals:
//! - 72 MHz: wraps every ~59.6 seconds (2^32 / 72M)
//! - 150 MHz: wraps every ~28.6 seconds (stock RP2350)
//!
//! Elapsed time uses `wrapping_sub`, which is correct across a single wrap.
//! If more than one full wrap occurs between start and end the result is
//! silently wrong. Callers must keep measured intervals well below the wrap period.

use crate::config::DEFAULT_CPU_HZ;

/// Hardware free-running cycle counter.
pub trait CycleCounter {
    /// Enable counting. Re-enabling an already running counter is harmless.
    fn enable(&mut self);

    /// Reset the counter to zero.
    fn reset(&mut self);

    /// Read the current cycle count (32-bit, wraps).
    fn read(&self) -> u32;
}

/// DWT CYCCNT cycle counter.
///
/// On non-ARM builds every read returns 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dwt;

impl Dwt {
    /// DCB DEMCR register - TRCENA (bit 24) gates the whole DWT block.
    #[cfg(target_arch = "arm")]
    const DEMCR: *mut u32 = 0xE000_EDFC as *mut u32;
    /// DWT CTRL register - CYCCNTENA is bit 0.
    #[cfg(target_arch = "arm")]
    const DWT_CTRL: *mut u32 = 0xE000_1000 as *mut u32;
    /// DWT CYCCNT register.
    #[cfg(target_arch = "arm")]
    const DWT_CYCCNT: *mut u32 = 0xE000_1004 as *mut u32;

    pub const fn new() -> Self { Self }
}

impl CycleCounter for Dwt {
    fn enable(&mut self) {
        // DEMCR.TRCENA must be set first, then DWT.CTRL.CYCCNTENA
        #[cfg(target_arch = "arm")]
        unsafe {
            use core::ptr::{read_volatile, write_volatile};

            let demcr_val = read_volatile(Self::DEMCR);
            write_volatile(Self::DEMCR, demcr_val | (1 << 24));

            let ctrl_val = read_volatile(Self::DWT_CTRL);
            write_volatile(Self::DWT_CTRL, ctrl_val | 1);
        }
    }

    fn reset(&mut self) {
        #[cfg(target_arch = "arm")]
        unsafe {
            core::ptr::write_volatile(Self::DWT_CYCCNT, 0);
        }
    }

    #[inline]
    fn read(&self) -> u32 {
        #[cfg(target_arch = "arm")]
        unsafe {
            core::ptr::read_volatile(Self::DWT_CYCCNT)
        }
        #[cfg(not(target_arch = "arm"))]
        {
            0 // Placeholder for host builds
        }
    }
}

/// Elapsed cycles between two counter readings, correct across one wrap.
#[inline]
pub const fn elapsed(
    start: u32,
    end: u32,
) -> u32 {
    end.wrapping_sub(start)
}

/// Convert a cycle count to microseconds at `cpu_hz`.
///
/// Uses 64-bit intermediates: `u32::MAX * 1_000_000` fits comfortably in u64.
/// Results that do not fit u32 (only possible below 1 MHz) saturate.
/// Returns 0 for a zero frequency.
#[inline]
pub fn cycles_to_us(
    cycles: u32,
    cpu_hz: u32,
) -> u32 {
    if cpu_hz == 0 {
        return 0;
    }
    let us = (u64::from(cycles) * 1_000_000) / u64::from(cpu_hz);
    u32::try_from(us).unwrap_or(u32::MAX)
}

/// Cycle clock: counter access, frequency and computation timer.
pub struct CycleClock<C> {
    counter: C,
    cpu_hz: u32,
    comp_start: u32,
}

impl<C: CycleCounter> CycleClock<C> {
    /// Create a clock at `DEFAULT_CPU_HZ`. The counter is not touched until `init`.
    pub const fn new(counter: C) -> Self {
        Self {
            counter,
            cpu_hz: DEFAULT_CPU_HZ,
            comp_start: 0,
        }
    }

    /// Enable the counter and reset it to zero.
    ///
    /// Must be called once before any measurement. Safe to call multiple times.
    pub fn init(&mut self) {
        self.counter.enable();
        self.counter.reset();
        log_debug!("cycle counter enabled, {} Hz", self.cpu_hz);
    }

    /// Set the reference frequency for all subsequent conversions.
    ///
    /// A zero frequency is ignored and the previous value kept.
    pub fn set_frequency(
        &mut self,
        hz: u32,
    ) {
        if hz == 0 {
            log_warn!("ignoring zero cpu frequency, keeping {} Hz", self.cpu_hz);
            return;
        }
        self.cpu_hz = hz;
        log_info!("cpu frequency set to {} MHz", hz / 1_000_000);
    }

    /// Current reference frequency in Hz.
    #[inline]
    pub const fn frequency(&self) -> u32 { self.cpu_hz }

    /// Current raw counter value.
    #[inline]
    pub fn now(&self) -> u32 { self.counter.read() }

    /// Convert elapsed cycles to microseconds at the current frequency.
    #[inline]
    pub fn to_micros(
        &self,
        delta_cycles: u32,
    ) -> u32 {
        cycles_to_us(delta_cycles, self.cpu_hz)
    }

    /// Microseconds elapsed since the `start` reading.
    #[inline]
    pub fn micros_since(
        &self,
        start: u32,
    ) -> u32 {
        self.to_micros(elapsed(start, self.now()))
    }

    /// Snapshot the computation start point.
    pub fn comp_start(&mut self) { self.comp_start = self.now(); }

    /// Microseconds since the last `comp_start`.
    pub fn comp_end(&self) -> u32 { self.micros_since(self.comp_start) }
}

// =============================================================================
// Unit Tests (run on host with: cargo test --lib --target <host-triple>)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualCounter;

    #[test]
    fn test_elapsed_normal() {
        assert_eq!(elapsed(100, 200), 100);
        assert_eq!(elapsed(0, 1000), 1000);
    }

    #[test]
    fn test_elapsed_wrap() {
        // Wrap from near max to near zero
        assert_eq!(elapsed(u32::MAX - 100, 100), 201);
    }

    #[test]
    fn test_cycles_to_us_known_values() {
        assert_eq!(cycles_to_us(72_000_000, 72_000_000), 1_000_000);
        assert_eq!(cycles_to_us(72_000, 72_000_000), 1000);
        assert_eq!(cycles_to_us(150, 150_000_000), 1);
        assert_eq!(cycles_to_us(0, 72_000_000), 0);
    }

    #[test]
    fn test_cycles_to_us_floors() {
        // 71 cycles at 72 MHz is 0.986us
        assert_eq!(cycles_to_us(71, 72_000_000), 0);
        // 100 cycles at 72 MHz is 1.388us
        assert_eq!(cycles_to_us(100, 72_000_000), 1);
    }

    #[test]
    fn test_cycles_to_us_no_overflow_near_max() {
        // floor((2^32 - 1) * 1e6 / 72e6) = 59_652_323
        assert_eq!(cycles_to_us(u32::MAX, 72_000_000), 59_652_323);
    }

    #[test]
    fn test_cycles_to_us_saturates_and_zero_hz() {
        assert_eq!(cycles_to_us(u32::MAX, 1), u32::MAX);
        assert_eq!(cycles_to_us(1000, 0), 0);
    }

    #[test]
    fn test_init_enables_and_resets() {
        let counter = ManualCounter::new();
        counter.set(12_345);
        let mut clock = CycleClock::new(counter.clone());

        clock.init();
        assert!(counter.is_enabled());
        assert_eq!(clock.now(), 0);

        // Idempotent
        clock.init();
        assert!(counter.is_enabled());
    }

    #[test]
    fn test_set_frequency() {
        let mut clock = CycleClock::new(ManualCounter::new());
        assert_eq!(clock.frequency(), DEFAULT_CPU_HZ);

        clock.set_frequency(150_000_000);
        assert_eq!(clock.frequency(), 150_000_000);
        assert_eq!(clock.to_micros(150_000), 1000);

        clock.set_frequency(0);
        assert_eq!(clock.frequency(), 150_000_000);
    }

    #[test]
    fn test_comp_timer() {
        let counter = ManualCounter::new();
        let mut clock = CycleClock::new(counter.clone());
        clock.init();

        counter.set(1_000);
        clock.comp_start();
        counter.advance(720_000);
        assert_eq!(clock.comp_end(), 10_000);
    }

    #[test]
    fn test_comp_timer_across_wrap() {
        let counter = ManualCounter::new();
        let mut clock = CycleClock::new(counter.clone());

        counter.set(u32::MAX - 35_999);
        clock.comp_start();
        counter.advance(72_000);
        assert_eq!(clock.comp_end(), 1000);
    }

    #[test]
    fn test_frequency_change_not_retroactive() {
        let counter = ManualCounter::new();
        let mut clock = CycleClock::new(counter.clone());
        clock.comp_start();
        counter.advance(72_000);
        let before = clock.comp_end();

        clock.set_frequency(144_000_000);
        assert_eq!(before, 1000);
        assert_eq!(clock.comp_end(), 500);
    }
}
