//! Update scheduling: which chunks go out on a given tick
//!
//! Three policies share one encoder and color store:
//!
//! - `Full`: every active chunk, every tick.
//! - `RoundRobin`: the next `chunks_per_tick` active chunks from a rotating
//!   cursor. The batch stops at the end of the list, so a full cycle takes
//!   `ceil(active / chunks_per_tick)` ticks and every chunk appears once.
//! - `Dirty`: chunks where a mapped slot differs from what was last sent.
//!
//! Only active chunks (those holding a mapped key) are ever selected.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::ConfigError;
use crate::memory::{ChunkBase, MemoryLayout};
use crate::topology::Topology;

/// Chunk selection policy, fixed for the life of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum UpdatePolicy {
    /// Transmit every active chunk on every tick
    Full,
    /// Transmit `chunks_per_tick` chunks per tick in rotation
    RoundRobin {
        #[serde(default = "default_chunks_per_tick")]
        chunks_per_tick: usize,
    },
    /// Transmit only chunks whose mapped slots changed
    Dirty,
}

fn default_chunks_per_tick() -> usize {
    1
}

impl Default for UpdatePolicy {
    /// One chunk per tick: the G67 drops reports when sent more than one per frame
    fn default() -> Self {
        Self::RoundRobin { chunks_per_tick: 1 }
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::RoundRobin { chunks_per_tick } => write!(f, "round-robin ({chunks_per_tick}/tick)"),
            Self::Dirty => write!(f, "dirty"),
        }
    }
}

impl UpdatePolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::RoundRobin { chunks_per_tick: 0 } => Err(ConfigError::InvalidConfig(
                "round-robin needs at least one chunk per tick".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveChunk {
    base: ChunkBase,
    /// Chunk slots that exist in memory
    slots: Range<usize>,
    /// Mapped slots, ascending
    mapped: Vec<usize>,
}

/// Per-session chunk selection state
#[derive(Debug, Clone)]
pub struct Scheduler {
    policy: UpdatePolicy,
    chunks: Vec<ActiveChunk>,
    /// Round-robin position in `chunks`
    cursor: usize,
    /// Last transmitted color per slot (dirty policy only)
    transmitted: Option<Vec<Rgb>>,
}

impl Scheduler {
    pub fn new(
        policy: UpdatePolicy,
        layout: &MemoryLayout,
        topology: &Topology,
    ) -> Result<Self, ConfigError> {
        policy.validate()?;

        let chunks = layout
            .active_chunks(topology)?
            .into_iter()
            .map(|base| {
                let slots = layout.chunk_slots(base);
                let mut mapped: Vec<usize> = topology
                    .keys()
                    .iter()
                    .map(|k| k.slot)
                    .filter(|slot| slots.contains(slot))
                    .collect();
                mapped.sort_unstable();
                ActiveChunk {
                    base,
                    slots: slots.start..slots.end.min(layout.slot_count()),
                    mapped,
                }
            })
            .collect();

        let transmitted =
            matches!(policy, UpdatePolicy::Dirty).then(|| vec![Rgb::BLACK; layout.slot_count()]);

        Ok(Self {
            policy,
            chunks,
            cursor: 0,
            transmitted,
        })
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    /// Active chunk bases, ascending
    pub fn active_chunks(&self) -> Vec<ChunkBase> {
        self.chunks.iter().map(|c| c.base).collect()
    }

    /// Current round-robin cursor (index into `active_chunks`)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Forget all cross-tick state
    pub fn reset(&mut self) {
        self.cursor = 0;
        if let Some(transmitted) = self.transmitted.as_mut() {
            transmitted.fill(Rgb::BLACK);
        }
    }

    /// Chunks to transmit this tick, in ascending base order.
    ///
    /// Advances the round-robin cursor; the dirty snapshot only moves when
    /// `record_transmitted` is called for a chunk that actually went out.
    pub fn select(&mut self, colors: &[Rgb]) -> Vec<ChunkBase> {
        match self.policy {
            UpdatePolicy::Full => self.active_chunks(),
            UpdatePolicy::RoundRobin { chunks_per_tick } => {
                if self.chunks.is_empty() {
                    return Vec::new();
                }
                let end = (self.cursor + chunks_per_tick).min(self.chunks.len());
                let batch: Vec<ChunkBase> = self.chunks[self.cursor..end]
                    .iter()
                    .map(|c| c.base)
                    .collect();
                self.cursor = if end == self.chunks.len() { 0 } else { end };
                batch
            }
            UpdatePolicy::Dirty => self
                .chunks
                .iter()
                .filter(|c| self.is_dirty(c, colors))
                .map(|c| c.base)
                .collect(),
        }
    }

    /// Note that the chunk at `base` was sent with `colors`
    pub fn record_transmitted(&mut self, base: ChunkBase, colors: &[Rgb]) {
        let Some(transmitted) = self.transmitted.as_mut() else {
            return;
        };
        if let Some(chunk) = self.chunks.iter().find(|c| c.base == base) {
            for slot in chunk.slots.clone() {
                transmitted[slot] = colors.get(slot).copied().unwrap_or_default();
            }
        }
    }

    /// Last transmitted color of a slot (dirty policy only)
    pub fn transmitted(&self, slot: usize) -> Option<Rgb> {
        self.transmitted.as_ref()?.get(slot).copied()
    }

    fn is_dirty(&self, chunk: &ActiveChunk, colors: &[Rgb]) -> bool {
        let Some(transmitted) = self.transmitted.as_ref() else {
            return true;
        };
        chunk.mapped.iter().any(|&slot| {
            colors.get(slot).copied().unwrap_or_default() != transmitted[slot]
        })
    }
}
