//! HID Wired transport implementation for direct USB connection

use hidapi::HidDevice;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::TransportError;
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// HID transport for wired USB connection
///
/// Writes vendor output reports on the lighting interface.
pub struct HidWiredTransport {
    /// Lighting interface
    device: Mutex<HidDevice>,
    /// Device information
    info: TransportDeviceInfo,
}

impl HidWiredTransport {
    /// Create a new wired transport from an opened HID device
    pub fn new(device: HidDevice, info: TransportDeviceInfo) -> Self {
        Self {
            device: Mutex::new(device),
            info,
        }
    }
}

impl Transport for HidWiredTransport {
    fn write_report(&self, report: &[u8]) -> Result<(), TransportError> {
        debug!(
            "Writing report: {:02X?}",
            &report[..report.len().min(9)]
        );
        let device = self.device.lock();
        let written = device.write(report)?;
        if written < report.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: report.len(),
            });
        }
        Ok(())
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }
}
