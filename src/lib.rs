//! Per-key RGB lighting driver for the Onikuma G67
//!
//! Turns host-supplied per-key colors into chunked writes against the
//! keyboard's lighting memory:
//!
//! ```text
//! Topology -> ColorStore -> Scheduler -> PacketEncoder -> Transport
//! ```
//!
//! `LightingSession` owns the pipeline and the mode-switch / blank-on-exit
//! lifecycle. Transports come from the `g67-transport` crate.

pub mod color;
pub mod config;
pub mod encoder;
pub mod error;
pub mod memory;
pub mod profile;
pub mod scheduler;
pub mod session;
pub mod topology;

pub use color::{ColorProvider, ColorStore, Rgb};
pub use config::DriverConfig;
pub use encoder::PacketEncoder;
pub use error::{ConfigError, DriverError};
pub use memory::{ChunkBase, MemoryLayout};
pub use profile::{DeviceProfile, HandshakeTiming};
pub use scheduler::{Scheduler, UpdatePolicy};
pub use session::{LightingSession, SessionState, TickReport};
pub use topology::{KeyMapping, Topology};
