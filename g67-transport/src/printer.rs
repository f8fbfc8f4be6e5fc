//! PrinterTransport middleware for monitoring outgoing reports
//!
//! Wraps any Transport implementation and prints every report passing
//! through it.
//!
//! # Example
//!
//! ```ignore
//! use g67_transport::{HidDiscovery, PrinterConfig, PrinterTransport};
//!
//! let transport = HidDiscovery::new().open_first()?;
//! let monitored = PrinterTransport::wrap(transport, PrinterConfig::default());
//! ```

use std::sync::Arc;
use std::time::Duration;

use crossterm::style::Stylize;

use crate::protocol::{cmd, decode_report, DecodedReport};
use crate::{Transport, TransportDeviceInfo, TransportError};

/// Configuration for the PrinterTransport
#[derive(Debug, Clone, Default)]
pub struct PrinterConfig {
    /// Show raw hex dump alongside decoded output
    pub show_hex: bool,
    /// Also print pauses
    pub show_pauses: bool,
}

impl PrinterConfig {
    /// Create config with hex output setting
    pub fn with_hex(mut self, show: bool) -> Self {
        self.show_hex = show;
        self
    }

    /// Create config with pause output setting
    pub fn with_pauses(mut self, show: bool) -> Self {
        self.show_pauses = show;
        self
    }
}

/// Transport middleware that prints all outgoing reports
pub struct PrinterTransport {
    inner: Arc<dyn Transport>,
    config: PrinterConfig,
}

impl PrinterTransport {
    /// Wrap a transport with printing middleware
    pub fn wrap(transport: Arc<dyn Transport>, config: PrinterConfig) -> Arc<dyn Transport> {
        Arc::new(Self {
            inner: transport,
            config,
        })
    }

    /// One-line summary of a report
    pub fn describe(report: &[u8]) -> String {
        match decode_report(report) {
            DecodedReport::ModeSwitch => cmd::name(cmd::MODE_SWITCH).to_string(),
            DecodedReport::WriteSlots { address, records } => {
                let lit = records
                    .iter()
                    .filter(|r| r[1] != 0 || r[2] != 0 || r[3] != 0)
                    .count();
                format!(
                    "{} addr=0x{:04x} records={} lit={}",
                    cmd::name(cmd::WRITE_SLOTS),
                    address,
                    records.len(),
                    lit
                )
            }
            DecodedReport::Unknown { cmd: byte } => {
                format!("{} cmd=0x{byte:02x}", cmd::name(byte))
            }
        }
    }

    fn print_report(&self, report: &[u8]) {
        eprintln!(
            "{} {}  {}",
            ">>>".cyan(),
            "OUT".cyan().bold(),
            Self::describe(report)
        );
        if self.config.show_hex {
            eprintln!("    {}  {:02x?}", "HEX".dim(), report);
        }
    }
}

impl Transport for PrinterTransport {
    fn write_report(&self, report: &[u8]) -> Result<(), TransportError> {
        self.print_report(report);
        let result = self.inner.write_report(report);
        if let Err(ref e) = result {
            eprintln!("{} {}  {}", "!!!".red(), "ERR".red().bold(), e);
        }
        result
    }

    fn pause(&self, duration: Duration) -> Result<(), TransportError> {
        if self.config.show_pauses {
            eprintln!("    {}  {} ms", "WAIT".dim(), duration.as_millis());
        }
        self.inner.pause(duration)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        self.inner.device_info()
    }
}
