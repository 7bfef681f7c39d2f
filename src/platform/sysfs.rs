use crate::{
    device::{CounterSample, CounterSource},
    error::{NetgaugeError, Result},
};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::SystemTime;

const SYS_CLASS_NET: &str = "/sys/class/net";

/// Reads counters from `/sys/class/net/<device>/statistics`.
///
/// Used when procfs is not mounted but sysfs is, which happens in some
/// minimal containers.
pub struct SysClassNetSource {
    root: PathBuf,
}

impl Default for SysClassNetSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysClassNetSource {
    pub fn new() -> Self {
        Self::with_root(SYS_CLASS_NET)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_counter(&self, device: &str, counter: &str) -> Result<u64> {
        let path = self.root.join(device).join("statistics").join(counter);
        let raw = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => NetgaugeError::DeviceUnavailable(device.to_string()),
            _ => NetgaugeError::Io(e),
        })?;

        raw.trim()
            .parse()
            .map_err(|_| NetgaugeError::Parse(format!("bad counter in {}", path.display())))
    }

    fn read_optional(&self, device: &str, counter: &str) -> Result<Option<u64>> {
        match self.read_counter(device, counter) {
            Ok(value) => Ok(Some(value)),
            Err(NetgaugeError::DeviceUnavailable(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl CounterSource for SysClassNetSource {
    fn backend(&self) -> &'static str {
        "sysfs"
    }

    fn list_devices(&self) -> Result<Vec<String>> {
        let mut devices = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.path().join("statistics").is_dir() {
                devices.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        devices.sort();
        Ok(devices)
    }

    fn read(&self, device: &str) -> Result<CounterSample> {
        Ok(CounterSample {
            timestamp: SystemTime::now(),
            bytes_in: self.read_counter(device, "rx_bytes")?,
            bytes_out: self.read_counter(device, "tx_bytes")?,
            packets_in: self.read_optional(device, "rx_packets")?,
            packets_out: self.read_optional(device, "tx_packets")?,
        })
    }

    fn is_available(&self) -> bool {
        self.root.is_dir()
    }
}
