//! Device profiles
//!
//! Everything protocol-specific about a keyboard lives here as plain data:
//! identity, memory geometry, the raw control bytes and the key table.
//! Profiles are either builtin or loaded from JSON at startup.

use std::path::Path;

use g67_transport::{device_registry, protocol};
use serde::{Deserialize, Serialize};

use crate::encoder::RECORD_LEN;
use crate::error::ConfigError;
use crate::memory::MemoryLayout;
use crate::topology::{KeyMapping, Topology};

/// Largest HID output report (1024 bytes) plus the report ID
const MAX_REPORT_LEN: usize = 1025;

/// Mode switch timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeTiming {
    /// Number of mode switch reports sent
    pub repeats: u32,
    /// Pause between repetitions (ms)
    pub gap_ms: u64,
    /// Pause after the last repetition (ms)
    pub settle_ms: u64,
}

impl Default for HandshakeTiming {
    fn default() -> Self {
        Self {
            repeats: protocol::timing::MODE_SWITCH_REPEATS,
            gap_ms: protocol::timing::MODE_SWITCH_GAP_MS,
            settle_ms: protocol::timing::MODE_SWITCH_SETTLE_MS,
        }
    }
}

/// Device profile, loaded from JSON or builtin
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    pub name: String,
    pub vid: u16,
    pub pid: u16,
    pub interface_number: i32,
    pub slot_count: usize,
    pub chunk_size: usize,
    #[serde(default = "default_bytes_per_slot")]
    pub bytes_per_slot: usize,
    #[serde(default = "default_report_len")]
    pub report_len: usize,
    /// Mode switch report, unpadded
    pub mode_switch: Vec<u8>,
    /// Bytes before the address in a chunk write
    pub write_prefix: Vec<u8>,
    /// Offset of the first record in a chunk write
    #[serde(default = "default_write_header_len")]
    pub write_header_len: usize,
    #[serde(default)]
    pub handshake: HandshakeTiming,
    #[serde(default = "default_shutdown_gap_ms")]
    pub shutdown_gap_ms: u64,
    pub keys: Vec<KeyMapping>,
}

fn default_bytes_per_slot() -> usize {
    4
}

fn default_report_len() -> usize {
    protocol::REPORT_SIZE
}

fn default_write_header_len() -> usize {
    protocol::WRITE_HEADER_LEN
}

fn default_shutdown_gap_ms() -> u64 {
    protocol::timing::SHUTDOWN_GAP_MS
}

impl DeviceProfile {
    /// Builtin Onikuma G67 profile
    pub fn g67() -> Self {
        let mut mode_switch = vec![
            protocol::REPORT_ID,
            protocol::MAGIC,
            protocol::cmd::MODE_SWITCH,
            protocol::REGION_LIGHTING,
        ];
        mode_switch.extend_from_slice(&[0x00; 5]);
        mode_switch.push(0x80);
        mode_switch.extend_from_slice(&[0x00; 8]);
        mode_switch.extend_from_slice(&[0x05, 0x03, 0x00, 0x00, 0x00, 0xAA, 0x55]);

        Self {
            name: "Onikuma G67".to_string(),
            vid: device_registry::VENDOR_ID,
            pid: device_registry::PID_G67,
            interface_number: device_registry::LIGHTING_INTERFACE,
            slot_count: 128,
            chunk_size: 14,
            bytes_per_slot: 4,
            report_len: protocol::REPORT_SIZE,
            mode_switch,
            write_prefix: vec![
                protocol::REPORT_ID,
                protocol::MAGIC,
                protocol::cmd::WRITE_SLOTS,
                protocol::REGION_LIGHTING,
            ],
            write_header_len: protocol::WRITE_HEADER_LEN,
            handshake: HandshakeTiming::default(),
            shutdown_gap_ms: protocol::timing::SHUTDOWN_GAP_MS,
            keys: Topology::g67().keys().to_vec(),
        }
    }

    /// Load and validate a profile from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let profile: Self = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        profile.validate()?;
        Ok(profile)
    }

    /// Memory geometry
    pub fn layout(&self) -> Result<MemoryLayout, ConfigError> {
        MemoryLayout::new(self.slot_count, self.chunk_size, self.bytes_per_slot)
    }

    /// Validated key table
    pub fn topology(&self) -> Result<Topology, ConfigError> {
        Topology::new(self.keys.clone())
    }

    /// Check that every report this profile describes can be encoded
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = self.layout()?;
        let invalid =
            |msg: String| -> Result<(), ConfigError> { Err(ConfigError::InvalidProfile(msg)) };

        if self.write_header_len < self.write_prefix.len() + 2 {
            return invalid(format!(
                "write header ({} bytes) too short for prefix ({}) + address",
                self.write_header_len,
                self.write_prefix.len()
            ));
        }
        if self.bytes_per_slot != RECORD_LEN {
            return invalid(format!(
                "bytes_per_slot must match the {RECORD_LEN}-byte slot record, got {}",
                self.bytes_per_slot
            ));
        }
        if self.report_len > MAX_REPORT_LEN {
            return invalid(format!(
                "report length {} exceeds {MAX_REPORT_LEN} bytes",
                self.report_len
            ));
        }
        let write_len = self
            .chunk_size
            .checked_mul(RECORD_LEN)
            .and_then(|records| records.checked_add(self.write_header_len));
        match write_len {
            Some(len) if len <= self.report_len => {}
            _ => {
                return invalid(format!(
                    "chunk write ({} byte header + {} records) does not fit a {} byte report",
                    self.write_header_len, self.chunk_size, self.report_len
                ))
            }
        }
        if self.mode_switch.len() > self.report_len {
            return invalid(format!(
                "mode switch is {} bytes, report is {}",
                self.mode_switch.len(),
                self.report_len
            ));
        }
        // Record index bytes cover every slot of every chunk
        let last_slot = layout.chunk_count() * layout.chunk_size() - 1;
        if last_slot > u8::MAX as usize {
            return invalid(format!("slot index {last_slot} does not fit in one byte"));
        }
        let last_base = (layout.chunk_count() - 1) * layout.chunk_size();
        if layout.byte_address(last_base) > u16::MAX as usize {
            return invalid(format!("chunk {last_base} address does not fit in 16 bits"));
        }
        if self.handshake.repeats == 0 {
            return invalid("handshake must send at least one mode switch".to_string());
        }

        let topology = self.topology()?;
        layout.active_chunks(&topology)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profile_is_valid() {
        let profile = DeviceProfile::g67();
        profile.validate().unwrap();
        assert_eq!(profile.mode_switch.len(), 25);
        assert_eq!(profile.keys.len(), 67);
        assert_eq!(profile.handshake.repeats, 3);
    }

    #[test]
    fn test_json_round_trip_fields() {
        let json = serde_json::to_string(&DeviceProfile::g67()).unwrap();
        assert!(json.contains("\"slotCount\":128"));
        assert!(json.contains("\"writeHeaderLen\":9"));

        let parsed: DeviceProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.chunk_size, 14);
        assert_eq!(parsed.keys, DeviceProfile::g67().keys);
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "name": "Tiny",
            "vid": 1, "pid": 2, "interfaceNumber": 0,
            "slotCount": 8, "chunkSize": 4,
            "modeSwitch": [0, 170, 35, 56],
            "writePrefix": [0, 170, 36, 56],
            "keys": [{ "name": "A", "slot": 5, "column": 0, "row": 0 }]
        }"#;
        let profile: DeviceProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.report_len, 65);
        assert_eq!(profile.bytes_per_slot, 4);
        assert_eq!(profile.handshake, HandshakeTiming::default());
        assert_eq!(profile.shutdown_gap_ms, 20);
        profile.validate().unwrap();
    }

    #[test]
    fn test_chunk_too_large_for_report() {
        let mut profile = DeviceProfile::g67();
        profile.chunk_size = 15; // 9 + 60 > 65
        assert!(matches!(
            profile.validate(),
            Err(ConfigError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_key_outside_memory_rejected() {
        let mut profile = DeviceProfile::g67();
        profile.keys.push(KeyMapping::new("Ghost", 128, 20, 0));
        assert!(matches!(
            profile.validate(),
            Err(ConfigError::SlotOutOfRange { slot: 128, .. })
        ));
    }

    #[test]
    fn test_huge_geometry_is_an_error() {
        let mut profile = DeviceProfile::g67();
        profile.chunk_size = usize::MAX / 2;
        assert!(matches!(
            profile.validate(),
            Err(ConfigError::InvalidProfile(_))
        ));

        let mut profile = DeviceProfile::g67();
        profile.write_header_len = usize::MAX;
        assert!(matches!(
            profile.validate(),
            Err(ConfigError::InvalidProfile(_))
        ));

        let mut profile = DeviceProfile::g67();
        profile.report_len = usize::MAX;
        assert!(matches!(
            profile.validate(),
            Err(ConfigError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_bytes_per_slot_must_match_record() {
        let mut profile = DeviceProfile::g67();
        profile.bytes_per_slot = 3;
        assert!(matches!(
            profile.validate(),
            Err(ConfigError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_slot_index_must_fit_byte() {
        let mut profile = DeviceProfile::g67();
        profile.slot_count = 300;
        assert!(matches!(
            profile.validate(),
            Err(ConfigError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = DeviceProfile::load(Path::new("/nonexistent/g67.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
