use crate::error::Result;
use std::time::SystemTime;

/// Cumulative counters for one device as reported by the host at `timestamp`.
///
/// Packet counters are optional because not every backend exposes them.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterSample {
    pub timestamp: SystemTime,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub packets_in: Option<u64>,
    pub packets_out: Option<u64>,
}

impl Default for CounterSample {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSample {
    pub fn new() -> Self {
        Self {
            timestamp: SystemTime::now(),
            bytes_in: 0,
            bytes_out: 0,
            packets_in: None,
            packets_out: None,
        }
    }

    pub fn at(timestamp: SystemTime, bytes_in: u64, bytes_out: u64) -> Self {
        Self {
            timestamp,
            bytes_in,
            bytes_out,
            packets_in: None,
            packets_out: None,
        }
    }

    #[must_use]
    pub fn with_packets(mut self, packets_in: u64, packets_out: u64) -> Self {
        self.packets_in = Some(packets_in);
        self.packets_out = Some(packets_out);
        self
    }
}

/// A host mechanism that exposes cumulative per-device traffic counters.
///
/// Implementations must not block: every read is a single file read or
/// syscall. A device that vanished since discovery reports
/// [`NetgaugeError::DeviceUnavailable`](crate::error::NetgaugeError::DeviceUnavailable).
pub trait CounterSource: Send + Sync {
    /// Short backend name used in logs and `--list` output.
    fn backend(&self) -> &'static str;
    fn list_devices(&self) -> Result<Vec<String>>;
    fn read(&self, device: &str) -> Result<CounterSample>;
    fn is_available(&self) -> bool;
}

/// Lifecycle of a tracked device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Active,
    Unavailable,
    Removed,
}

impl DeviceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Unavailable => "unavailable",
            Self::Removed => "removed",
        }
    }
}
