//! Device registry - supported keyboard identities
//!
//! The lighting protocol is only exposed on one USB interface; the keyboard
//! enumerates several (boot keyboard, media keys, vendor).

/// Sonix vendor ID (used by the Onikuma G67 controller)
pub const VENDOR_ID: u16 = 0x0C45;

/// Onikuma G67 product ID
pub const PID_G67: u16 = 0x8043;

/// Interface carrying the vendor lighting reports
pub const LIGHTING_INTERFACE: i32 = 2;

/// Known (VID, PID) pairs
pub const SUPPORTED_DEVICES: &[(u16, u16)] = &[(VENDOR_ID, PID_G67)];
