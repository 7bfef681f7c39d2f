use crate::{
    device::{CounterSample, CounterSource},
    error::{NetgaugeError, Result},
};
use std::sync::Mutex;
use std::time::SystemTime;
use sysinfo::Networks;

/// Fallback backend built on the `sysinfo` network list, for hosts none of
/// the native backends understand.
pub struct PortableSource {
    networks: Mutex<Networks>,
}

impl Default for PortableSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PortableSource {
    pub fn new() -> Self {
        Self {
            networks: Mutex::new(Networks::new_with_refreshed_list()),
        }
    }

    fn with_networks<T>(&self, f: impl FnOnce(&mut Networks) -> T) -> Result<T> {
        let mut networks = self
            .networks
            .lock()
            .map_err(|_| NetgaugeError::Platform("network list lock poisoned".to_string()))?;
        Ok(f(&mut networks))
    }
}

impl CounterSource for PortableSource {
    fn backend(&self) -> &'static str {
        "sysinfo"
    }

    fn list_devices(&self) -> Result<Vec<String>> {
        self.with_networks(|networks| {
            networks.refresh_list();
            let mut devices: Vec<String> = networks.iter().map(|(name, _)| name.clone()).collect();
            devices.sort();
            devices
        })
    }

    fn read(&self, device: &str) -> Result<CounterSample> {
        self.with_networks(|networks| {
            networks.refresh();
            networks
                .iter()
                .find(|(name, _)| name.as_str() == device)
                .map(|(_, data)| CounterSample {
                    timestamp: SystemTime::now(),
                    bytes_in: data.total_received(),
                    bytes_out: data.total_transmitted(),
                    packets_in: Some(data.total_packets_received()),
                    packets_out: Some(data.total_packets_transmitted()),
                })
        })?
        .ok_or_else(|| NetgaugeError::DeviceUnavailable(device.to_string()))
    }

    fn is_available(&self) -> bool {
        sysinfo::IS_SUPPORTED_SYSTEM
    }
}
