//! Protocol constants and report decoding for the G67 lighting interface
//!
//! Every transaction is one 65-byte output report: report ID 0x00 followed by
//! 64 bytes. Bytes 1..=3 select the operation, bytes 4..=5 carry a
//! little-endian byte address into the lighting memory.

/// Output report size including the leading report ID byte
pub const REPORT_SIZE: usize = 65;

/// Report ID used for all vendor output reports
pub const REPORT_ID: u8 = 0x00;

/// Leading magic byte of every vendor command
pub const MAGIC: u8 = 0xAA;

/// Lighting memory region selector (byte 3)
pub const REGION_LIGHTING: u8 = 0x38;

/// Command bytes (byte 2)
pub mod cmd {
    /// Switch firmware into host-driven per-key mode
    pub const MODE_SWITCH: u8 = 0x23;
    /// Write slot records at an address
    pub const WRITE_SLOTS: u8 = 0x24;

    /// Get human-readable name for command byte
    pub fn name(cmd: u8) -> &'static str {
        match cmd {
            MODE_SWITCH => "MODE_SWITCH",
            WRITE_SLOTS => "WRITE_SLOTS",
            _ => "UNKNOWN",
        }
    }
}

/// Device-side timing
pub mod timing {
    /// Number of times the mode switch is sent
    pub const MODE_SWITCH_REPEATS: u32 = 3;
    /// Pause between mode switch repetitions (ms)
    pub const MODE_SWITCH_GAP_MS: u64 = 50;
    /// Pause after the last repetition before streaming (ms)
    pub const MODE_SWITCH_SETTLE_MS: u64 = 500;
    /// Pause after each blanking write at shutdown (ms)
    pub const SHUTDOWN_GAP_MS: u64 = 20;
}

/// Offset of the first slot record in a write report
pub const WRITE_HEADER_LEN: usize = 9;

/// Decoded view of an outgoing report, for monitoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedReport {
    /// Mode switch control write
    ModeSwitch,
    /// Slot write starting at `address` (bytes) with the records it carries
    WriteSlots {
        address: u16,
        records: Vec<[u8; 4]>,
    },
    /// Anything else
    Unknown { cmd: u8 },
}

/// Decode an outgoing report.
///
/// Trailing all-zero records (report padding) are not reported.
pub fn decode_report(report: &[u8]) -> DecodedReport {
    if report.len() < WRITE_HEADER_LEN || report[1] != MAGIC || report[3] != REGION_LIGHTING {
        return DecodedReport::Unknown {
            cmd: report.get(2).copied().unwrap_or(0),
        };
    }

    match report[2] {
        cmd::MODE_SWITCH => DecodedReport::ModeSwitch,
        cmd::WRITE_SLOTS => {
            let address = u16::from_le_bytes([report[4], report[5]]);
            let records = report[WRITE_HEADER_LEN..]
                .chunks_exact(4)
                .map(|c| [c[0], c[1], c[2], c[3]])
                .collect::<Vec<_>>();
            // Strip padding: records past the last non-zero one are filler
            let used = records
                .iter()
                .rposition(|r| r.iter().any(|&b| b != 0))
                .map_or(0, |i| i + 1);
            DecodedReport::WriteSlots {
                address,
                records: records[..used].to_vec(),
            }
        }
        other => DecodedReport::Unknown { cmd: other },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mode_switch() {
        let mut report = [0u8; REPORT_SIZE];
        report[..4].copy_from_slice(&[0x00, 0xAA, 0x23, 0x38]);
        assert_eq!(decode_report(&report), DecodedReport::ModeSwitch);
    }

    #[test]
    fn test_decode_write_address() {
        let mut report = [0u8; REPORT_SIZE];
        // base slot 98 -> byte address 392 = 0x0188
        report[..6].copy_from_slice(&[0x00, 0xAA, 0x24, 0x38, 0x88, 0x01]);
        report[9..13].copy_from_slice(&[98, 255, 0, 0]);
        report[13..17].copy_from_slice(&[99, 0, 0, 0]);

        match decode_report(&report) {
            DecodedReport::WriteSlots { address, records } => {
                assert_eq!(address, 392);
                assert_eq!(records, vec![[98, 255, 0, 0], [99, 0, 0, 0]]);
            }
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn test_decode_foreign_report() {
        let report = [0x00, 0x55, 0x24, 0x38, 0, 0, 0, 0, 0];
        assert_eq!(decode_report(&report), DecodedReport::Unknown { cmd: 0x24 });
        assert_eq!(decode_report(&[0x00]), DecodedReport::Unknown { cmd: 0 });
    }

    #[test]
    fn test_cmd_names() {
        assert_eq!(cmd::name(0x23), "MODE_SWITCH");
        assert_eq!(cmd::name(0x24), "WRITE_SLOTS");
        assert_eq!(cmd::name(0x99), "UNKNOWN");
    }
}
