//! Measurement record and its wire layout.
//!
//! The PC-side decoder reads records as five packed little-endian `u32` fields
//! (`<IIIII`), so each field is written at a fixed offset instead of relying on
//! the in-memory layout of the struct.

/// Size of one encoded record in bytes.
pub const RECORD_SIZE: usize = 20;

/// One completed compute + transmit measurement.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct MeasurementRecord {
    /// Identifier of the data block the measurement pertains to.
    pub block_id: u32,
    /// Bytes fed into the computation.
    pub input_len: u32,
    /// Bytes produced by the computation.
    pub output_len: u32,
    /// Wall time spent computing.
    pub comp_time_us: u32,
    /// Wall time spent transmitting.
    pub tx_time_us: u32,
}

impl MeasurementRecord {
    pub const fn new(
        block_id: u32,
        input_len: u32,
        output_len: u32,
        comp_time_us: u32,
        tx_time_us: u32,
    ) -> Self {
        Self {
            block_id,
            input_len,
            output_len,
            comp_time_us,
            tx_time_us,
        }
    }

    /// Encode as 20 little-endian bytes in field order.
    pub fn to_le_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        let fields = [
            self.block_id,
            self.input_len,
            self.output_len,
            self.comp_time_us,
            self.tx_time_us,
        ];
        for (chunk, field) in out.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        out
    }
}
