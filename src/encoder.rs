//! Packet encoder for chunk writes and the mode switch
//!
//! A chunk write is `header | record * chunk_size | zero padding`, where the
//! header is the profile's write prefix followed by the little-endian byte
//! address of the chunk, and each record is `(slot, r, g, b)`.
//!
//! ```text
//! 00 AA 24 38 lo hi 00 00 00 | s r g b | s r g b | ... (65 bytes)
//! ```

use tracing::trace;
use zerocopy::{Immutable, IntoBytes, KnownLayout};

use crate::color::Rgb;
use crate::memory::{ChunkBase, MemoryLayout};
use crate::profile::DeviceProfile;

/// Size of one slot record on the wire
pub const RECORD_LEN: usize = 4;

/// One slot record as it appears in a write report
#[derive(Debug, Clone, Copy, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
struct SlotRecord {
    slot: u8,
    r: u8,
    g: u8,
    b: u8,
}

impl SlotRecord {
    fn new(slot: usize, color: Rgb) -> Self {
        Self {
            // Profile validation keeps every chunk slot below 256
            slot: slot as u8,
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

/// Builds fixed-length reports for one device profile
#[derive(Debug, Clone)]
pub struct PacketEncoder {
    layout: MemoryLayout,
    write_prefix: Vec<u8>,
    header_len: usize,
    report_len: usize,
    mode_switch: Vec<u8>,
}

impl PacketEncoder {
    /// Encoder for a validated profile
    pub fn new(profile: &DeviceProfile, layout: MemoryLayout) -> Self {
        Self {
            layout,
            write_prefix: profile.write_prefix.clone(),
            header_len: profile.write_header_len,
            report_len: profile.report_len,
            mode_switch: profile.mode_switch.clone(),
        }
    }

    /// Length of every report this encoder produces
    pub fn report_len(&self) -> usize {
        self.report_len
    }

    /// The mode switch control report, zero padded
    pub fn mode_switch(&self) -> Vec<u8> {
        let mut report = vec![0u8; self.report_len];
        report[..self.mode_switch.len()].copy_from_slice(&self.mode_switch);
        report
    }

    /// Encode the write report for the chunk at `base`.
    ///
    /// `colors` is slot-indexed; slots it does not cover (including slots past
    /// the end of memory in an overrunning last chunk) are sent black.
    pub fn encode_chunk(&self, base: ChunkBase, colors: &[Rgb]) -> Vec<u8> {
        debug_assert_eq!(base % self.layout.chunk_size(), 0);

        let mut report = vec![0u8; self.report_len];
        let prefix_len = self.write_prefix.len();
        report[..prefix_len].copy_from_slice(&self.write_prefix);

        let address = self.layout.byte_address(base) as u16;
        report[prefix_len..prefix_len + 2].copy_from_slice(&address.to_le_bytes());

        let records: Vec<SlotRecord> = self
            .layout
            .chunk_slots(base)
            .map(|slot| SlotRecord::new(slot, colors.get(slot).copied().unwrap_or_default()))
            .collect();
        let payload = records.as_bytes();
        report[self.header_len..self.header_len + payload.len()].copy_from_slice(payload);

        trace!("Encoded chunk {} at 0x{:04X}", base, address);
        report
    }
}
