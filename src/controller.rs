//! Per-device orchestration: one counter source, statistics engine and pair
//! of graphs per tracked device, advanced together once per tick.

use crate::device::{CounterSource, DeviceState};
use crate::error::{NetgaugeError, Result};
use crate::graph::{Deflection, TrafficGraphs};
use crate::history::{Append, DEFAULT_TICK_INTERVAL};
use crate::platform::Discovery;
use crate::stats::{DisplayStats, StatisticsEngine};
use std::collections::BTreeSet;
use std::ops::ControlFlow;
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info, warn};

/// Default number of columns kept per graph before the terminal is measured.
pub const DEFAULT_GRAPH_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    pub average_window: Duration,
    pub tick_interval: Duration,
    pub graph_width: usize,
    pub deflection_in: Deflection,
    pub deflection_out: Deflection,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            average_window: Duration::from_secs(300),
            tick_interval: DEFAULT_TICK_INTERVAL,
            graph_width: DEFAULT_GRAPH_WIDTH,
            deflection_in: Deflection::from_kbits(10240),
            deflection_out: Deflection::from_kbits(10240),
        }
    }
}

/// Result of one tick for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// First successful read; baseline stored.
    Primed,
    Sampled,
    /// Clock did not advance; tick discarded.
    ClockSkipped,
    /// Read failed; last values held.
    Unavailable,
    Removed,
}

pub struct TrackedDevice {
    name: String,
    source: Box<dyn CounterSource>,
    engine: StatisticsEngine,
    graphs: TrafficGraphs,
    state: DeviceState,
}

impl TrackedDevice {
    pub fn new(name: String, source: Box<dyn CounterSource>, settings: &MonitorSettings) -> Self {
        Self {
            name,
            source,
            engine: StatisticsEngine::new(settings.average_window, settings.tick_interval),
            graphs: TrafficGraphs::new(
                settings.graph_width,
                settings.deflection_in,
                settings.deflection_out,
            ),
            state: DeviceState::Active,
        }
    }

    pub fn update_at(&mut self, now: SystemTime) -> TickOutcome {
        if self.state == DeviceState::Removed {
            return TickOutcome::Removed;
        }

        let mut sample = match self.source.read(&self.name) {
            Ok(sample) => sample,
            Err(e) => {
                if !e.is_recoverable() {
                    error!(device = %self.name, error = %e, "counter source failed");
                } else if self.state == DeviceState::Active {
                    warn!(device = %self.name, error = %e, "device stopped reporting");
                }
                self.state = DeviceState::Unavailable;
                return TickOutcome::Unavailable;
            }
        };

        if self.state == DeviceState::Unavailable {
            info!(device = %self.name, "device reporting again");
            self.state = DeviceState::Active;
        }

        sample.timestamp = now;
        match self.engine.add_sample(sample) {
            Append::Primed => TickOutcome::Primed,
            Append::Skipped => {
                let anomaly = NetgaugeError::ClockAnomaly {
                    device: self.name.clone(),
                };
                debug!(error = %anomaly, "tick discarded");
                TickOutcome::ClockSkipped
            }
            Append::Advanced { rate, .. } => {
                self.graphs.push(rate.bits_in_per_sec, rate.bits_out_per_sec);
                TickOutcome::Sampled
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn backend(&self) -> &'static str {
        self.source.backend()
    }

    pub fn stats(&self) -> &DisplayStats {
        self.engine.stats()
    }

    pub fn engine(&self) -> &StatisticsEngine {
        &self.engine
    }

    pub fn graphs(&self) -> &TrafficGraphs {
        &self.graphs
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.graphs.incoming.clear();
        self.graphs.outgoing.clear();
    }
}

/// Owns every tracked device for the lifetime of a run.
pub struct DeviceController {
    devices: Vec<TrackedDevice>,
    settings: MonitorSettings,
}

impl DeviceController {
    pub fn new(sources: Discovery, settings: MonitorSettings) -> Self {
        let mut devices: Vec<TrackedDevice> = sources
            .into_iter()
            .map(|(name, source)| TrackedDevice::new(name, source, &settings))
            .collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));

        Self { devices, settings }
    }

    /// Takes the baseline sample for every device.
    pub fn prime(&mut self, now: SystemTime) -> Vec<TickOutcome> {
        self.update_at(now)
    }

    pub fn update(&mut self) -> Vec<TickOutcome> {
        self.update_at(SystemTime::now())
    }

    /// Advances every device by one tick, in identifier order. A failing
    /// device never affects the others.
    pub fn update_at(&mut self, now: SystemTime) -> Vec<TickOutcome> {
        self.devices
            .iter_mut()
            .map(|device| device.update_at(now))
            .collect()
    }

    /// Ends tracking; later ticks are no-ops.
    pub fn shutdown(&mut self) {
        for device in &mut self.devices {
            device.state = DeviceState::Removed;
        }
        debug!(devices = self.devices.len(), "controller shut down");
    }

    pub fn resize_graphs(&mut self, width: usize) {
        if width == self.settings.graph_width {
            return;
        }
        self.settings.graph_width = width;
        for device in &mut self.devices {
            device.graphs.resize(width);
        }
    }

    /// Applies a new averaging window and tick interval to every device.
    /// Accumulated totals and extrema survive the change.
    pub fn set_timing(&mut self, average_window: Duration, tick_interval: Duration) {
        if average_window == self.settings.average_window
            && tick_interval == self.settings.tick_interval
        {
            return;
        }
        self.settings.average_window = average_window;
        self.settings.tick_interval = tick_interval;
        for device in &mut self.devices {
            device.engine.set_window(average_window, tick_interval);
        }
        debug!(?average_window, ?tick_interval, "timing changed");
    }

    pub fn set_deflection(&mut self, deflection_in: Deflection, deflection_out: Deflection) {
        self.settings.deflection_in = deflection_in;
        self.settings.deflection_out = deflection_out;
        for device in &mut self.devices {
            device.graphs.incoming.set_deflection(deflection_in);
            device.graphs.outgoing.set_deflection(deflection_out);
        }
    }

    pub fn devices(&self) -> &[TrackedDevice] {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut [TrackedDevice] {
        &mut self.devices
    }

    pub fn device(&self, name: &str) -> Option<&TrackedDevice> {
        self.devices.iter().find(|d| d.name == name)
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl Drop for DeviceController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Picks the devices to track from a discovery.
///
/// An empty request, or one starting with `"all"`, tracks everything. Any
/// requested name missing from the discovery aborts the whole selection.
pub fn resolve_devices(requested: &[String], mut discovered: Discovery) -> Result<Discovery> {
    if discovered.is_empty() {
        return Err(NetgaugeError::NoDevicesDiscovered);
    }

    if requested.first().map_or(true, |first| first == "all") {
        return Ok(discovered);
    }

    let mut seen = BTreeSet::new();
    let mut missing = Vec::new();
    let mut selected = Discovery::new();

    for name in requested {
        if !seen.insert(name.as_str()) {
            continue;
        }
        match discovered.remove(name) {
            Some(source) => {
                selected.insert(name.clone(), source);
            }
            None => {
                warn!(device = %name, "no such device");
                missing.push(name.clone());
            }
        }
    }

    match missing.first() {
        Some(first) => Err(NetgaugeError::UnknownRequestedDevice {
            name: first.clone(),
            missing,
        }),
        None => Ok(selected),
    }
}

/// How often the render loop ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Single update cycle, then stop.
    Once,
    Every(Duration),
}

impl Schedule {
    pub fn from_interval_ms(interval_ms: u64) -> Self {
        if interval_ms == 0 {
            Self::Once
        } else {
            Self::Every(Duration::from_millis(interval_ms))
        }
    }

    pub fn interval(&self) -> Duration {
        match self {
            Self::Once => DEFAULT_TICK_INTERVAL,
            Self::Every(interval) => *interval,
        }
    }
}

/// The side of the tick loop that talks to the outside world.
pub trait TickDriver {
    type Error;

    /// Timestamp stamped on the next update.
    fn now(&mut self) -> SystemTime {
        SystemTime::now()
    }

    /// Blocks for up to `interval` before the next update. May process
    /// input and ask the loop to stop.
    fn wait(
        &mut self,
        controller: &mut DeviceController,
        interval: Duration,
    ) -> std::result::Result<ControlFlow<()>, Self::Error>;

    /// Consumes the statistics of a finished update.
    fn on_tick(
        &mut self,
        controller: &mut DeviceController,
    ) -> std::result::Result<ControlFlow<()>, Self::Error>;
}

/// Runs the tick loop and returns the number of update cycles executed.
/// A [`Schedule::Once`] run stops after one cycle.
///
/// Periodic runs wait for the controller's current tick interval, so a
/// change made through [`DeviceController::set_timing`] applies from the
/// next cycle on.
pub fn drive<D: TickDriver>(
    controller: &mut DeviceController,
    schedule: Schedule,
    driver: &mut D,
) -> std::result::Result<usize, D::Error> {
    let mut cycles = 0;

    loop {
        let interval = match schedule {
            Schedule::Once => schedule.interval(),
            Schedule::Every(_) => controller.settings().tick_interval,
        };
        if driver.wait(controller, interval)?.is_break() {
            break;
        }

        let now = driver.now();
        controller.update_at(now);
        cycles += 1;

        if driver.on_tick(controller)?.is_break() || schedule == Schedule::Once {
            break;
        }
    }

    Ok(cycles)
}
