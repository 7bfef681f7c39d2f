//! # netgauge
//!
//! Per-interface network traffic monitor in the spirit of nload.
//!
//! Cumulative byte and packet counters are read from the host once per tick,
//! turned into bit rates, windowed averages, lifetime extrema and totals, and
//! fed into fixed-width graphs for the terminal view.
//!
//! ## Example
//!
//! ```rust,no_run
//! use netgauge::cli::Args;
//! use netgauge::run;
//!
//! let args = Args {
//!     devices: vec!["eth0".to_string()],
//!     refresh_interval: Some(0),
//!     ..Default::default()
//! };
//!
//! run(args).expect("Failed to run netgauge");
//! ```

pub mod cli;
pub mod config;
pub mod controller;
pub mod device;
pub mod display;
pub mod error;
pub mod graph;
pub mod history;
pub mod input;
pub mod logger;
pub mod options;
pub mod platform;
pub mod stats;
pub mod units;
pub mod validation;

use anyhow::Result;
use cli::Args;
use config::Config;
use controller::{drive, resolve_devices, DeviceController, Schedule};
use display::TextReport;
use error::NetgaugeError;
use logger::TrafficLogger;
use platform::SourceFactory;
use std::time::SystemTime;
use tracing::info;

/// Main entry point: loads settings, discovers devices and runs either the
/// interactive view or, for a zero refresh interval, a single text report.
///
/// # Example
///
/// ```rust,no_run
/// use netgauge::{cli::Args, run};
///
/// let args = Args::default();
/// run(args).expect("Failed to run netgauge");
/// ```
pub fn run(args: Args) -> Result<()> {
    let factory = SourceFactory::host();

    if args.list {
        return list_devices(&factory);
    }

    let mut config = Config::load()?;
    config.apply_args(&args);
    config.validate()?;

    let requested = config.device_list();
    if !config.wants_all_devices() {
        for name in &requested {
            validation::validate_interface_name(name)?;
        }
    }

    let sources = resolve_devices(&requested, factory.discover())?;
    let logger = args
        .traffic_log
        .as_deref()
        .map(TrafficLogger::new)
        .transpose()?;

    let schedule = config.schedule();
    let mut controller = DeviceController::new(sources, config.monitor_settings());
    info!(
        devices = controller.len(),
        interval_ms = config.refresh_interval,
        "monitoring started"
    );
    controller.prime(SystemTime::now());

    let cycles = match schedule {
        Schedule::Once => {
            let mut report = TextReport::new(std::io::stdout(), &config, logger);
            drive(&mut controller, schedule, &mut report)?
        }
        Schedule::Every(_) => display::run_ui(&mut controller, schedule, config, logger)?,
    };

    controller.shutdown();
    info!(cycles, "monitoring finished");
    Ok(())
}

fn list_devices(factory: &SourceFactory) -> Result<()> {
    let discovery = factory.discover();
    if discovery.is_empty() {
        return Err(NetgaugeError::NoDevicesDiscovered.into());
    }

    for (name, source) in &discovery {
        println!("{name}\t{}", source.backend());
    }

    Ok(())
}
