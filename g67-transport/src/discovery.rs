//! Device discovery

use std::sync::Arc;

use hidapi::HidApi;
use tracing::debug;

use crate::device_registry::{LIGHTING_INTERFACE, SUPPORTED_DEVICES};
use crate::error::TransportError;
use crate::hid_wired::HidWiredTransport;
use crate::printer::{PrinterConfig, PrinterTransport};
use crate::types::{DiscoveredDevice, TransportDeviceInfo, TransportType};
use crate::Transport;

/// HID device discovery for wired connections
pub struct HidDiscovery {
    /// Known VID/PID pairs to look for
    known_devices: Vec<(u16, u16)>,
    /// Interface number carrying the lighting reports
    interface_number: i32,
    /// Optional printer config for monitoring mode - wraps transports automatically
    printer_config: Option<PrinterConfig>,
}

impl Default for HidDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl HidDiscovery {
    /// Create a new HID discovery instance
    pub fn new() -> Self {
        Self {
            known_devices: SUPPORTED_DEVICES.to_vec(),
            interface_number: LIGHTING_INTERFACE,
            printer_config: None,
        }
    }

    /// Look for a specific identity instead of the builtin list
    pub fn for_identity(vid: u16, pid: u16, interface_number: i32) -> Self {
        Self {
            known_devices: vec![(vid, pid)],
            interface_number,
            printer_config: None,
        }
    }

    /// Set printer config on an existing discovery.
    /// All transports opened via open_device() will be wrapped with Printer
    pub fn printer_config(mut self, config: Option<PrinterConfig>) -> Self {
        self.printer_config = config;
        self
    }

    /// Check if a device matches our known devices
    fn is_known_device(&self, vid: u16, pid: u16) -> bool {
        self.known_devices.contains(&(vid, pid))
    }

    /// List every matching lighting interface currently connected
    pub fn list_devices(&self) -> Result<Vec<DiscoveredDevice>, TransportError> {
        let api = HidApi::new()?;
        let mut devices = Vec::new();

        for device_info in api.device_list() {
            let vid = device_info.vendor_id();
            let pid = device_info.product_id();

            if !self.is_known_device(vid, pid)
                || device_info.interface_number() != self.interface_number
            {
                continue;
            }

            let path = device_info.path().to_string_lossy().to_string();
            debug!(
                "Found device: VID={:04X} PID={:04X} if={} path={}",
                vid,
                pid,
                device_info.interface_number(),
                path
            );

            devices.push(DiscoveredDevice {
                info: TransportDeviceInfo {
                    vid,
                    pid,
                    interface_number: device_info.interface_number(),
                    transport_type: TransportType::HidWired,
                    device_path: path,
                    serial: device_info.serial_number().map(|s| s.to_string()),
                    product_name: device_info.product_string().map(|s| s.to_string()),
                },
            });
        }

        // hidapi can report the same interface twice on some hosts
        devices.dedup_by(|a, b| a.info.device_path == b.info.device_path);
        Ok(devices)
    }

    /// Open a discovered device
    pub fn open_device(
        &self,
        device: &DiscoveredDevice,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        let api = HidApi::new()?;
        let path = std::ffi::CString::new(device.info.device_path.clone())
            .map_err(|e| TransportError::Internal(e.to_string()))?;
        let hid = api.open_path(&path)?;

        let transport: Arc<dyn Transport> =
            Arc::new(HidWiredTransport::new(hid, device.info.clone()));

        Ok(match &self.printer_config {
            Some(config) => PrinterTransport::wrap(transport, config.clone()),
            None => transport,
        })
    }

    /// Open the first matching device
    pub fn open_first(&self) -> Result<Arc<dyn Transport>, TransportError> {
        let devices = self.list_devices()?;
        let device = devices.first().ok_or_else(|| {
            TransportError::DeviceNotFound(format!(
                "no interface {} on {}",
                self.interface_number,
                self.describe_known()
            ))
        })?;
        self.open_device(device)
    }

    fn describe_known(&self) -> String {
        self.known_devices
            .iter()
            .map(|(vid, pid)| format!("{vid:04X}:{pid:04X}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_registry;

    #[test]
    fn test_default_knows_g67() {
        let discovery = HidDiscovery::new();
        assert!(discovery.is_known_device(device_registry::VENDOR_ID, device_registry::PID_G67));
        assert_eq!(discovery.interface_number, 2);
    }

    #[test]
    fn test_for_identity_replaces_list() {
        let discovery = HidDiscovery::for_identity(0x1234, 0x5678, 1);
        assert!(discovery.is_known_device(0x1234, 0x5678));
        assert!(!discovery.is_known_device(device_registry::VENDOR_ID, device_registry::PID_G67));
        assert_eq!(discovery.describe_known(), "1234:5678");
    }
}
