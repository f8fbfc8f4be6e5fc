//! Lighting session lifecycle
//!
//! ```text
//! Uninitialized --initialize--> ModeSwitching --> Streaming --shutdown--> ShuttingDown --> Closed
//! ```
//!
//! The host drives the session: one `initialize`, one `render_tick` per
//! frame, one `shutdown`. Every call runs to completion on the caller's
//! thread; the only deliberate waits are the handshake and shutdown pauses.

use std::fmt;
use std::time::Duration;

use g67_transport::BoxedTransport;
use tracing::{debug, info, warn};

use crate::color::{ColorProvider, ColorStore, Rgb};
use crate::encoder::PacketEncoder;
use crate::error::DriverError;
use crate::memory::{ChunkBase, MemoryLayout};
use crate::profile::DeviceProfile;
use crate::scheduler::{Scheduler, UpdatePolicy};
use crate::topology::Topology;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    ModeSwitching,
    Streaming,
    ShuttingDown,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::ModeSwitching => "mode switching",
            Self::Streaming => "streaming",
            Self::ShuttingDown => "shutting down",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// What one tick sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Slots whose desired color changed this tick
    pub changed_slots: usize,
    /// Chunks written, in order
    pub sent: Vec<ChunkBase>,
}

/// Per-key lighting session over one transport
pub struct LightingSession {
    profile: DeviceProfile,
    layout: MemoryLayout,
    topology: Topology,
    encoder: PacketEncoder,
    colors: ColorStore,
    scheduler: Scheduler,
    transport: BoxedTransport,
    state: SessionState,
    ticks: u64,
}

impl LightingSession {
    /// Build a session; all configuration errors surface here.
    pub fn new(
        profile: DeviceProfile,
        policy: UpdatePolicy,
        transport: BoxedTransport,
    ) -> Result<Self, DriverError> {
        profile.validate()?;
        let layout = profile.layout()?;
        let topology = profile.topology()?;
        let scheduler = Scheduler::new(policy, &layout, &topology)?;
        let encoder = PacketEncoder::new(&profile, layout);

        debug!(
            "Session for {}: {} keys, {} active chunks, policy {}",
            profile.name,
            topology.len(),
            scheduler.active_chunks().len(),
            policy
        );

        Ok(Self {
            colors: ColorStore::new(layout.slot_count()),
            profile,
            layout,
            topology,
            encoder,
            scheduler,
            transport,
            state: SessionState::Uninitialized,
            ticks: 0,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn layout(&self) -> &MemoryLayout {
        &self.layout
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.scheduler.policy()
    }

    pub fn active_chunks(&self) -> Vec<ChunkBase> {
        self.scheduler.active_chunks()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Desired color per slot
    pub fn colors(&self) -> &[Rgb] {
        self.colors.snapshot()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Switch the keyboard into host-driven mode.
    ///
    /// The mode switch is sent `handshake.repeats` times since the device
    /// sometimes misses the first writes and never acknowledges. A failed
    /// attempt is logged; only if every attempt fails does this return an
    /// error, leaving the session `Uninitialized` so the host may retry.
    pub fn initialize(&mut self) -> Result<(), DriverError> {
        if self.state != SessionState::Uninitialized {
            return Err(DriverError::InvalidState {
                operation: "initialize",
                state: self.state,
            });
        }
        self.state = SessionState::ModeSwitching;

        let timing = self.profile.handshake;
        let report = self.encoder.mode_switch();
        let mut delivered = 0;
        let mut last_error = None;

        for attempt in 0..timing.repeats {
            match self.transport.write_report(&report) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!("Mode switch attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
            let wait = if attempt + 1 == timing.repeats {
                timing.settle_ms
            } else {
                timing.gap_ms
            };
            if let Err(e) = self.transport.pause(Duration::from_millis(wait)) {
                warn!("Pause after mode switch attempt {} failed: {}", attempt + 1, e);
            }
        }

        if delivered == 0 {
            self.state = SessionState::Uninitialized;
            return Err(last_error
                .map(DriverError::from)
                .unwrap_or(DriverError::InvalidState {
                    operation: "initialize",
                    state: SessionState::ModeSwitching,
                }));
        }

        self.scheduler.reset();
        self.ticks = 0;
        self.state = SessionState::Streaming;
        info!(
            "Streaming to {} ({}/{} mode switch writes delivered)",
            self.profile.name, delivered, timing.repeats
        );
        Ok(())
    }

    /// Pull host colors, pick chunks and send them.
    ///
    /// A transport failure aborts the rest of this tick and is returned; the
    /// session stays `Streaming` and the next tick carries on. Chunks that
    /// did not go out stay dirty under the dirty policy.
    pub fn render_tick<P>(&mut self, provider: &mut P) -> Result<TickReport, DriverError>
    where
        P: ColorProvider + ?Sized,
    {
        if self.state != SessionState::Streaming {
            return Err(DriverError::InvalidState {
                operation: "render a tick",
                state: self.state,
            });
        }
        self.ticks += 1;

        let changed_slots = self.colors.update(&self.topology, provider)?;
        let selected = self.scheduler.select(self.colors.snapshot());

        let mut report = TickReport {
            changed_slots,
            sent: Vec::with_capacity(selected.len()),
        };
        for base in selected {
            self.send_chunk(base)?;
            report.sent.push(base);
        }
        Ok(report)
    }

    /// Blank every active chunk and close the session.
    ///
    /// All active chunks are written regardless of policy. Write failures are
    /// logged and the remaining chunks are still attempted; the first error
    /// is returned once the session is `Closed`.
    pub fn shutdown(&mut self) -> Result<(), DriverError> {
        match self.state {
            SessionState::Closed => return Ok(()),
            SessionState::Uninitialized => {
                // Device never left its own mode: nothing to blank
                self.state = SessionState::Closed;
                return Ok(());
            }
            _ => {}
        }
        self.state = SessionState::ShuttingDown;
        info!("Blanking {} and closing", self.profile.name);

        self.colors.clear();
        let gap = Duration::from_millis(self.profile.shutdown_gap_ms);
        let mut first_error = None;

        for base in self.scheduler.active_chunks() {
            let result = self
                .send_chunk(base)
                .and_then(|()| self.transport.pause(gap).map_err(DriverError::from));
            if let Err(e) = result {
                warn!("Failed to blank chunk {}: {}", base, e);
                first_error.get_or_insert(e);
            }
        }

        self.state = SessionState::Closed;
        first_error.map_or(Ok(()), Err)
    }

    fn send_chunk(&mut self, base: ChunkBase) -> Result<(), DriverError> {
        let report = self.encoder.encode_chunk(base, self.colors.snapshot());
        debug!("Chunk {} -> {:02X?}", base, &report[..self.profile.write_header_len]);
        self.transport.write_report(&report)?;
        self.scheduler
            .record_transmitted(base, self.colors.snapshot());
        Ok(())
    }
}
