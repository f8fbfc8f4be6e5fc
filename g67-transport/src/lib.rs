//! Transport abstraction layer for Onikuma G67 lighting
//!
//! The keyboard's lighting interface only accepts fixed-size output reports
//! and never answers, so a transport here is write-only:
//!
//! - HID Wired (direct USB connection via hidapi)
//! - Loopback (in-memory recorder for dry runs and tests)
//!
//! `PrinterTransport` wraps either one and prints every report it forwards.

pub mod device_registry;
pub mod error;
pub mod protocol;
pub mod types;

mod discovery;
mod hid_wired;
mod loopback;
mod printer;

pub use device_registry::{PID_G67, VENDOR_ID};
pub use discovery::HidDiscovery;
pub use error::TransportError;
pub use hid_wired::HidWiredTransport;
pub use loopback::{LoopbackEvent, LoopbackTransport};
pub use printer::{PrinterConfig, PrinterTransport};
pub use types::{DiscoveredDevice, TransportDeviceInfo, TransportType};

use std::sync::Arc;
use std::time::Duration;

/// The core transport trait - all backends implement this
///
/// Calls block until the report has been handed to the device (or failed).
/// No timeout is imposed here; backends are expected to return promptly.
pub trait Transport: Send + Sync {
    /// Write one complete output report (report ID included)
    fn write_report(&self, report: &[u8]) -> Result<(), TransportError>;

    /// Wait between writes to respect device-side timing
    fn pause(&self, duration: Duration) -> Result<(), TransportError> {
        std::thread::sleep(duration);
        Ok(())
    }

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;
}

/// Type alias for a shared transport
pub type BoxedTransport = Arc<dyn Transport>;
