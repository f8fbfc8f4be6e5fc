//! In-memory transport that records every report
//!
//! Used by `--dry-run` and by tests to observe exactly what a session sends.

use std::time::Duration;

use parking_lot::Mutex;

use crate::error::TransportError;
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// One recorded transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopbackEvent {
    Write(Vec<u8>),
    Pause(Duration),
}

#[derive(Default)]
struct LoopbackState {
    events: Vec<LoopbackEvent>,
    /// Number of upcoming writes to fail
    fail_writes: usize,
    /// Fail every write whose report matches this byte at this offset
    fail_matching: Option<(usize, u8)>,
}

/// Transport that keeps reports in memory instead of sending them
pub struct LoopbackTransport {
    state: Mutex<LoopbackState>,
    info: TransportDeviceInfo,
    /// Whether `pause` actually sleeps
    real_pauses: bool,
}

impl LoopbackTransport {
    /// Create a loopback transport; pauses are recorded but not slept
    pub fn new(info: TransportDeviceInfo) -> Self {
        Self {
            state: Mutex::new(LoopbackState::default()),
            info,
            real_pauses: false,
        }
    }

    /// Sleep on `pause` like a real device would need
    pub fn with_real_pauses(mut self) -> Self {
        self.real_pauses = true;
        self
    }

    /// Make the next `count` writes fail with `Disconnected`
    pub fn fail_next_writes(&self, count: usize) {
        self.state.lock().fail_writes = count;
    }

    /// Fail every write whose byte at `offset` equals `value`
    pub fn fail_writes_matching(&self, offset: usize, value: u8) {
        self.state.lock().fail_matching = Some((offset, value));
    }

    /// Stop injecting failures
    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.fail_writes = 0;
        state.fail_matching = None;
    }

    /// All recorded events in call order
    pub fn events(&self) -> Vec<LoopbackEvent> {
        self.state.lock().events.clone()
    }

    /// Only the written reports, in order
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                LoopbackEvent::Write(report) => Some(report.clone()),
                LoopbackEvent::Pause(_) => None,
            })
            .collect()
    }

    /// Drain recorded events
    pub fn take_events(&self) -> Vec<LoopbackEvent> {
        std::mem::take(&mut self.state.lock().events)
    }
}

impl Transport for LoopbackTransport {
    fn write_report(&self, report: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.fail_writes > 0 {
            state.fail_writes -= 1;
            return Err(TransportError::Disconnected);
        }
        if let Some((offset, value)) = state.fail_matching {
            if report.get(offset) == Some(&value) {
                return Err(TransportError::Disconnected);
            }
        }
        state.events.push(LoopbackEvent::Write(report.to_vec()));
        Ok(())
    }

    fn pause(&self, duration: Duration) -> Result<(), TransportError> {
        self.state.lock().events.push(LoopbackEvent::Pause(duration));
        if self.real_pauses {
            std::thread::sleep(duration);
        }
        Ok(())
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> LoopbackTransport {
        LoopbackTransport::new(TransportDeviceInfo::loopback(0x0C45, 0x8043, 2))
    }

    #[test]
    fn test_records_in_order() {
        let t = loopback();
        t.write_report(&[1, 2]).unwrap();
        t.pause(Duration::from_millis(5)).unwrap();
        t.write_report(&[3]).unwrap();

        assert_eq!(
            t.events(),
            vec![
                LoopbackEvent::Write(vec![1, 2]),
                LoopbackEvent::Pause(Duration::from_millis(5)),
                LoopbackEvent::Write(vec![3]),
            ]
        );
        assert_eq!(t.writes(), vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_fail_next_writes() {
        let t = loopback();
        t.fail_next_writes(1);
        assert!(matches!(
            t.write_report(&[1]),
            Err(TransportError::Disconnected)
        ));
        t.write_report(&[2]).unwrap();
        assert_eq!(t.writes(), vec![vec![2]]);
    }

    #[test]
    fn test_fail_matching() {
        let t = loopback();
        t.fail_writes_matching(0, 7);
        assert!(t.write_report(&[7, 1]).is_err());
        t.write_report(&[8, 1]).unwrap();
        t.clear_failures();
        t.write_report(&[7, 1]).unwrap();
        assert_eq!(t.take_events().len(), 2);
        assert!(t.events().is_empty());
    }
}
