//! In-flight transmission slots.
//!
//! A slot bridges a "start" issued right before a non-blocking UART write and a
//! "stop" issued from the write-completion context. Each slot is either Idle or
//! Armed:
//!
//! ```text
//!            start                 stop
//!   Idle ─────────────> Armed ─────────────> Idle
//!                        │ ^
//!                        └─┘ start (overwrites, in-flight data lost)
//! ```
//!
//! Out-of-range indices and stops on an Idle slot are ignored, which also
//! absorbs duplicate completion callbacks.

use crate::config::MAX_SLOT;

/// Metadata and TX start point for one in-flight transmission.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct TxSlot {
    pub block_id: u32,
    pub input_len: u32,
    pub output_len: u32,
    /// Computation time snapshotted at start.
    pub comp_time_us: u32,
    /// Cycle counter reading at start.
    pub tx_start: u32,
    pub active: bool,
}

impl TxSlot {
    const IDLE: Self = Self {
        block_id: 0,
        input_len: 0,
        output_len: 0,
        comp_time_us: 0,
        tx_start: 0,
        active: false,
    };
}

/// Fixed table of `S` transmission slots (defaults to `MAX_SLOT`).
pub struct SlotTracker<const S: usize = MAX_SLOT> {
    slots: [TxSlot; S],
}

impl<const S: usize> SlotTracker<S> {
    /// Create a tracker with every slot Idle.
    pub const fn new() -> Self { Self { slots: [TxSlot::IDLE; S] } }

    /// Arm `slot` with block metadata and the current cycle reading.
    ///
    /// Out-of-range indices are ignored. Re-arming an Armed slot overwrites it.
    /// Returns whether the slot was armed.
    pub fn start(
        &mut self,
        slot: u8,
        block_id: u32,
        input_len: u32,
        output_len: u32,
        comp_time_us: u32,
        tx_start: u32,
    ) -> bool {
        let Some(entry) = self.slots.get_mut(usize::from(slot)) else {
            log_warn!("tx_start on invalid slot {}", slot);
            return false;
        };
        if entry.active {
            log_warn!("slot {} re-armed, block {} lost", slot, entry.block_id);
        }
        *entry = TxSlot {
            block_id,
            input_len,
            output_len,
            comp_time_us,
            tx_start,
            active: true,
        };
        true
    }

    /// Disarm `slot` and hand back its contents.
    ///
    /// Returns `None` for out-of-range indices and Idle slots.
    pub fn take(
        &mut self,
        slot: u8,
    ) -> Option<TxSlot> {
        let entry = self.slots.get_mut(usize::from(slot))?;
        if !entry.active {
            return None;
        }
        entry.active = false;
        Some(*entry)
    }

    /// Check whether `slot` is Armed. Out-of-range indices are never Armed.
    #[inline]
    pub fn is_armed(
        &self,
        slot: u8,
    ) -> bool {
        self.slots.get(usize::from(slot)).is_some_and(|s| s.active)
    }

    /// Number of Armed slots.
    pub fn armed_count(&self) -> usize { self.slots.iter().filter(|s| s.active).count() }

    /// Return every slot to Idle.
    pub fn disarm_all(&mut self) {
        for slot in &mut self.slots {
            slot.active = false;
        }
    }
}

impl<const S: usize> Default for SlotTracker<S> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_idle() {
        let tracker: SlotTracker = SlotTracker::new();
        assert_eq!(tracker.armed_count(), 0);
        assert!(!tracker.is_armed(0));
        assert!(!tracker.is_armed(1));
    }

    #[test]
    fn test_start_then_take() {
        let mut tracker: SlotTracker = SlotTracker::new();
        assert!(tracker.start(1, 7, 512, 300, 40, 1234));
        assert!(tracker.is_armed(1));
        assert!(!tracker.is_armed(0));

        let slot = tracker.take(1).unwrap();
        assert_eq!(slot.block_id, 7);
        assert_eq!(slot.input_len, 512);
        assert_eq!(slot.output_len, 300);
        assert_eq!(slot.comp_time_us, 40);
        assert_eq!(slot.tx_start, 1234);
        assert!(!tracker.is_armed(1));
    }

    #[test]
    fn test_take_idle_is_none() {
        let mut tracker: SlotTracker = SlotTracker::new();
        assert!(tracker.take(0).is_none());

        // Duplicate completion
        tracker.start(0, 1, 1, 1, 1, 0);
        assert!(tracker.take(0).is_some());
        assert!(tracker.take(0).is_none());
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut tracker: SlotTracker = SlotTracker::new();
        assert!(!tracker.start(MAX_SLOT as u8, 1, 1, 1, 1, 0));
        assert!(!tracker.start(u8::MAX, 1, 1, 1, 1, 0));
        assert!(tracker.take(MAX_SLOT as u8).is_none());
        assert!(!tracker.is_armed(u8::MAX));
        assert_eq!(tracker.armed_count(), 0);
    }

    #[test]
    fn test_restart_overwrites() {
        let mut tracker: SlotTracker = SlotTracker::new();
        tracker.start(0, 1, 10, 10, 1, 100);
        tracker.start(0, 2, 20, 20, 2, 200);

        let slot = tracker.take(0).unwrap();
        assert_eq!(slot.block_id, 2);
        assert_eq!(slot.tx_start, 200);
        assert!(tracker.take(0).is_none());
    }

    #[test]
    fn test_disarm_all() {
        let mut tracker: SlotTracker = SlotTracker::new();
        tracker.start(0, 1, 1, 1, 1, 0);
        tracker.start(1, 2, 2, 2, 2, 0);
        assert_eq!(tracker.armed_count(), 2);

        tracker.disarm_all();
        assert_eq!(tracker.armed_count(), 0);
        assert!(tracker.take(0).is_none());
        assert!(tracker.take(1).is_none());
    }
}
