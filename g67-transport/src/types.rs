//! Common types for transport layer

/// Transport type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportType {
    /// Direct USB HID connection
    HidWired,
    /// In-memory loopback (dry run, tests)
    Loopback,
}

/// Device identification information
#[derive(Debug, Clone)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// USB interface number the transport is bound to
    pub interface_number: i32,
    /// Transport type
    pub transport_type: TransportType,
    /// Device path or identifier (transport-specific)
    pub device_path: String,
    /// Serial number if available
    pub serial: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
}

impl TransportDeviceInfo {
    /// Info for a transport that is not backed by hardware
    pub fn loopback(vid: u16, pid: u16, interface_number: i32) -> Self {
        Self {
            vid,
            pid,
            interface_number,
            transport_type: TransportType::Loopback,
            device_path: "loopback".to_string(),
            serial: None,
            product_name: None,
        }
    }
}

/// Discovered device that can be opened
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// Device information
    pub info: TransportDeviceInfo,
}
