//! Host counter backends and the factory that selects one.

use crate::device::CounterSource;
use std::collections::BTreeMap;
use tracing::{debug, info};

#[cfg(target_os = "linux")]
mod procfs;
#[cfg(target_os = "linux")]
pub use procfs::ProcNetDevSource;

#[cfg(target_os = "linux")]
mod sysfs;
#[cfg(target_os = "linux")]
pub use sysfs::SysClassNetSource;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
pub use macos::MacOSSource;

mod portable;
pub use portable::PortableSource;

/// Builds a fresh backend instance. Each tracked device gets its own.
pub type SourceCtor = fn() -> Box<dyn CounterSource>;

/// Discovered devices, each paired with the source that reads it.
pub type Discovery = BTreeMap<String, Box<dyn CounterSource>>;

pub struct SourceFactory {
    backends: Vec<SourceCtor>,
}

impl Default for SourceFactory {
    fn default() -> Self {
        Self::host()
    }
}

impl SourceFactory {
    /// Backends for the running host, in the order they are tried.
    pub fn host() -> Self {
        let mut backends: Vec<SourceCtor> = Vec::new();

        #[cfg(target_os = "linux")]
        {
            backends.push(|| -> Box<dyn CounterSource> { Box::new(ProcNetDevSource::new()) });
            backends.push(|| -> Box<dyn CounterSource> { Box::new(SysClassNetSource::new()) });
        }

        #[cfg(target_os = "macos")]
        backends.push(|| -> Box<dyn CounterSource> { Box::new(MacOSSource::new()) });

        backends.push(|| -> Box<dyn CounterSource> { Box::new(PortableSource::new()) });

        Self { backends }
    }

    pub fn with_backends(backends: Vec<SourceCtor>) -> Self {
        Self { backends }
    }

    /// Returns every device exposed by the first backend that reports
    /// successfully and lists at least one device. An empty map means no
    /// usable counter interface was found.
    pub fn discover(&self) -> Discovery {
        for ctor in &self.backends {
            let candidate = ctor();
            if !candidate.is_available() {
                debug!(backend = candidate.backend(), "backend not available");
                continue;
            }

            let devices = match candidate.list_devices() {
                Ok(devices) if !devices.is_empty() => devices,
                Ok(_) => {
                    debug!(backend = candidate.backend(), "backend lists no devices");
                    continue;
                }
                Err(e) => {
                    debug!(backend = candidate.backend(), error = %e, "device listing failed");
                    continue;
                }
            };

            info!(
                backend = candidate.backend(),
                devices = devices.len(),
                "counter backend selected"
            );
            return devices.into_iter().map(|name| (name, ctor())).collect();
        }

        Discovery::new()
    }
}
