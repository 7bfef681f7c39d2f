use crate::cli::Args;
use crate::controller::{MonitorSettings, Schedule, DEFAULT_GRAPH_WIDTH};
use crate::graph::Deflection;
use crate::units::Unit;
use crate::validation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_AVERAGE_WINDOW: u32 = 300;
const DEFAULT_REFRESH_INTERVAL: u64 = 500;
const DEFAULT_BAR_MAX: u64 = 10240;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "AverageWindow")]
    pub average_window: u32,

    #[serde(rename = "BarMaxIn")]
    pub max_incoming: u64,

    #[serde(rename = "BarMaxOut")]
    pub max_outgoing: u64,

    #[serde(rename = "DataFormat")]
    pub data_format: String,

    #[serde(rename = "Devices")]
    pub devices: String,

    #[serde(rename = "MultipleDevices")]
    pub multiple_devices: bool,

    #[serde(rename = "RefreshInterval")]
    pub refresh_interval: u64,

    #[serde(rename = "TrafficFormat")]
    pub traffic_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            average_window: DEFAULT_AVERAGE_WINDOW,
            max_incoming: DEFAULT_BAR_MAX,
            max_outgoing: DEFAULT_BAR_MAX,
            data_format: "M".to_string(),
            devices: "all".to_string(),
            multiple_devices: false,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            traffic_format: "k".to_string(),
        }
    }
}

impl Config {
    /// `~/.netgauge`, the file written by [`Config::save`].
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".netgauge"))
    }

    pub fn legacy_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".nload"))
    }

    pub fn load() -> anyhow::Result<Self> {
        // Try ~/.netgauge first, then an nload-style ~/.nload
        if let Some(path) = Self::default_path().filter(|p| p.exists()) {
            return Self::load_from(&path);
        }
        if let Some(path) = Self::legacy_path().filter(|p| p.exists()) {
            return Self::parse_nload_format(&path);
        }

        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Writes to [`Config::default_path`] and returns that path.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("no home directory to save settings in"))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Overrides settings with whatever was given on the command line.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(window) = args.average_window {
            self.average_window = window;
        }
        if let Some(max) = args.max_incoming {
            self.max_incoming = max;
        }
        if let Some(max) = args.max_outgoing {
            self.max_outgoing = max;
        }
        if let Some(interval) = args.refresh_interval {
            self.refresh_interval = interval;
        }
        if let Some(unit) = args.traffic_unit {
            self.traffic_format = unit.letter().to_string();
        }
        if let Some(unit) = args.data_unit {
            self.data_format = unit.letter().to_string();
        }
        if args.multiple_devices {
            self.multiple_devices = true;
        }
        if !args.devices.is_empty() {
            self.devices = args.devices.join(" ");
        }
    }

    /// Checks ranges, replacing a zero average window with the default.
    pub fn validate(&mut self) -> anyhow::Result<()> {
        if self.average_window == 0 {
            warn!("average window of 0 s replaced by {DEFAULT_AVERAGE_WINDOW} s");
            self.average_window = DEFAULT_AVERAGE_WINDOW;
        }
        validation::validate_refresh_interval(self.refresh_interval)?;
        validation::validate_bandwidth(self.max_incoming)?;
        validation::validate_bandwidth(self.max_outgoing)?;
        Ok(())
    }

    #[must_use]
    pub fn get_traffic_unit(&self) -> Unit {
        Unit::from_letter(&self.traffic_format).unwrap_or(Unit::KiloBit)
    }

    #[must_use]
    pub fn get_data_unit(&self) -> Unit {
        Unit::from_letter(&self.data_format).unwrap_or(Unit::MegaByte)
    }

    pub fn set_traffic_unit(&mut self, unit: Unit) {
        self.traffic_format = unit.letter().to_string();
    }

    pub fn set_data_unit(&mut self, unit: Unit) {
        self.data_format = unit.letter().to_string();
    }

    /// Requested device names; empty means every device.
    pub fn device_list(&self) -> Vec<String> {
        self.devices.split_whitespace().map(str::to_string).collect()
    }

    /// Whether every discovered device should be tracked: no names, or a
    /// list starting with `all`.
    pub fn wants_all_devices(&self) -> bool {
        self.devices
            .split_whitespace()
            .next()
            .map_or(true, |first| first == "all")
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::from_interval_ms(self.refresh_interval)
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            average_window: Duration::from_secs(u64::from(self.average_window)),
            tick_interval: self.schedule().interval(),
            graph_width: DEFAULT_GRAPH_WIDTH,
            deflection_in: Deflection::from_kbits(self.max_incoming),
            deflection_out: Deflection::from_kbits(self.max_outgoing),
        }
    }

    fn parse_nload_format(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"');

                match key {
                    "AverageWindow" => {
                        config.average_window = value.parse().unwrap_or(DEFAULT_AVERAGE_WINDOW)
                    }
                    "BarMaxIn" => config.max_incoming = value.parse().unwrap_or(DEFAULT_BAR_MAX),
                    "BarMaxOut" => config.max_outgoing = value.parse().unwrap_or(DEFAULT_BAR_MAX),
                    "DataFormat" => config.data_format = value.to_string(),
                    "Devices" => config.devices = value.to_string(),
                    "MultipleDevices" => config.multiple_devices = value == "true" || value == "1",
                    "RefreshInterval" => {
                        config.refresh_interval = value.parse().unwrap_or(DEFAULT_REFRESH_INTERVAL)
                    }
                    "TrafficFormat" => config.traffic_format = value.to_string(),
                    _ => debug!(key, "ignoring unknown nload setting"),
                }
            }
        }

        debug!(path = %path.display(), "loaded nload config");
        Ok(config)
    }
}
