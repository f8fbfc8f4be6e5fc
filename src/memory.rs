//! Lighting memory model
//!
//! The controller exposes `slot_count` slots of `bytes_per_slot` bytes each
//! (index byte + R + G + B). Writes happen in chunks of `chunk_size`
//! consecutive slots; chunk bases are multiples of `chunk_size`.

use std::ops::Range;

use crate::error::ConfigError;
use crate::topology::Topology;

/// Slot index of the first slot in a chunk
pub type ChunkBase = usize;

/// Slot indices travel as one byte on the wire
pub const MAX_SLOTS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLayout {
    slot_count: usize,
    chunk_size: usize,
    bytes_per_slot: usize,
}

impl MemoryLayout {
    pub fn new(
        slot_count: usize,
        chunk_size: usize,
        bytes_per_slot: usize,
    ) -> Result<Self, ConfigError> {
        if slot_count == 0 || chunk_size == 0 || bytes_per_slot == 0 {
            return Err(ConfigError::InvalidProfile(format!(
                "slot_count ({slot_count}), chunk_size ({chunk_size}) and \
                 bytes_per_slot ({bytes_per_slot}) must all be non-zero"
            )));
        }
        if slot_count > MAX_SLOTS {
            return Err(ConfigError::InvalidProfile(format!(
                "slot_count {slot_count} exceeds the {MAX_SLOTS} addressable slots"
            )));
        }
        if chunk_size > slot_count {
            return Err(ConfigError::InvalidProfile(format!(
                "chunk_size {chunk_size} is larger than the memory ({slot_count} slots)"
            )));
        }
        Ok(Self {
            slot_count,
            chunk_size,
            bytes_per_slot,
        })
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn bytes_per_slot(&self) -> usize {
        self.bytes_per_slot
    }

    /// Number of chunks covering the whole memory (last one may overrun)
    pub fn chunk_count(&self) -> usize {
        self.slot_count.div_ceil(self.chunk_size)
    }

    /// All chunk bases in ascending order
    pub fn chunk_bases(&self) -> impl Iterator<Item = ChunkBase> + '_ {
        (0..self.chunk_count()).map(move |i| i * self.chunk_size)
    }

    /// Base of the chunk holding `slot`, or `None` past the end of memory
    pub fn chunk_containing(&self, slot: usize) -> Option<ChunkBase> {
        (slot < self.slot_count).then(|| slot - slot % self.chunk_size)
    }

    /// Slot indices a chunk covers, including any past `slot_count`
    pub fn chunk_slots(&self, base: ChunkBase) -> Range<usize> {
        base..base.saturating_add(self.chunk_size)
    }

    /// Byte address of a chunk in device memory
    pub fn byte_address(&self, base: ChunkBase) -> usize {
        base.saturating_mul(self.bytes_per_slot)
    }

    /// Chunk bases holding at least one mapped slot, ascending.
    ///
    /// Fails if any key maps outside the memory.
    pub fn active_chunks(&self, topology: &Topology) -> Result<Vec<ChunkBase>, ConfigError> {
        let mut active = vec![false; self.chunk_count()];
        for key in topology.keys() {
            let base = self
                .chunk_containing(key.slot)
                .ok_or_else(|| ConfigError::SlotOutOfRange {
                    key: key.name.clone(),
                    slot: key.slot,
                    slot_count: self.slot_count,
                })?;
            active[base / self.chunk_size] = true;
        }

        Ok(active
            .iter()
            .enumerate()
            .filter_map(|(i, &used)| used.then_some(i * self.chunk_size))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::KeyMapping;

    fn g67_layout() -> MemoryLayout {
        MemoryLayout::new(128, 14, 4).unwrap()
    }

    #[test]
    fn test_chunk_partition() {
        let layout = g67_layout();
        assert_eq!(layout.chunk_count(), 10);
        let bases: Vec<_> = layout.chunk_bases().collect();
        assert_eq!(bases, vec![0, 14, 28, 42, 56, 70, 84, 98, 112, 126]);
    }

    #[test]
    fn test_chunk_containing() {
        let layout = g67_layout();
        assert_eq!(layout.chunk_containing(0), Some(0));
        assert_eq!(layout.chunk_containing(13), Some(0));
        assert_eq!(layout.chunk_containing(14), Some(14));
        assert_eq!(layout.chunk_containing(108), Some(98));
        assert_eq!(layout.chunk_containing(127), Some(126));
        assert_eq!(layout.chunk_containing(128), None);
    }

    #[test]
    fn test_byte_address() {
        let layout = g67_layout();
        assert_eq!(layout.byte_address(0), 0);
        assert_eq!(layout.byte_address(98), 392);
        assert_eq!(layout.chunk_slots(126), 126..140);
    }

    #[test]
    fn test_g67_active_chunks() {
        let layout = g67_layout();
        let active = layout.active_chunks(&Topology::g67()).unwrap();
        assert_eq!(active, vec![0, 14, 28, 42, 56, 70, 84, 98]);
        // Navigation cluster sits entirely in the last active chunk
        for slot in [104, 105, 107, 108] {
            assert!(layout.chunk_slots(98).contains(&slot));
        }
    }

    #[test]
    fn test_active_chunks_properties() {
        let layout = MemoryLayout::new(50, 7, 4).unwrap();
        let topo = Topology::new(vec![
            KeyMapping::new("a", 48, 0, 0),
            KeyMapping::new("b", 3, 1, 0),
            KeyMapping::new("c", 20, 2, 0),
            KeyMapping::new("d", 15, 3, 0),
        ])
        .unwrap();
        let active = layout.active_chunks(&topo).unwrap();
        assert_eq!(active, vec![0, 14, 42]);

        assert!(active.windows(2).all(|w| w[0] < w[1]));
        assert!(active.iter().all(|b| b % 7 == 0));
        for key in topo.keys() {
            assert!(active
                .iter()
                .any(|&b| layout.chunk_slots(b).contains(&key.slot)));
        }
    }

    #[test]
    fn test_slot_out_of_range() {
        let layout = MemoryLayout::new(16, 8, 4).unwrap();
        let topo = Topology::new(vec![KeyMapping::new("Far", 16, 0, 0)]).unwrap();
        let err = layout.active_chunks(&topo).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SlotOutOfRange { slot: 16, slot_count: 16, .. }
        ));
    }

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(MemoryLayout::new(0, 14, 4).is_err());
        assert!(MemoryLayout::new(128, 0, 4).is_err());
        assert!(MemoryLayout::new(128, 14, 0).is_err());
    }

    #[test]
    fn test_oversized_geometry_rejected() {
        assert!(MemoryLayout::new(256, 14, 4).is_ok());
        assert!(matches!(
            MemoryLayout::new(257, 14, 4),
            Err(ConfigError::InvalidProfile(_))
        ));
        assert!(matches!(
            MemoryLayout::new(128, 129, 4),
            Err(ConfigError::InvalidProfile(_))
        ));
        assert!(MemoryLayout::new(128, usize::MAX / 2, 4).is_err());
    }
}
