use crate::units::Unit;
use clap::Parser;
use std::path::PathBuf;

/// Options left unset fall back to the config file, then to built-in defaults.
#[derive(Parser, Default, Debug)]
#[command(name = "netgauge", about = "Per-interface network traffic monitor")]
#[command(version, long_about = None)]
pub struct Args {
    /// Network devices to monitor ("all" or empty: every discovered device)
    pub devices: Vec<String>,

    /// List available network devices and exit
    #[arg(short, long)]
    pub list: bool,

    /// Average window in seconds
    #[arg(short = 'a', long = "average")]
    pub average_window: Option<u32>,

    /// Incoming graph scale (kBit/s, 0 = auto)
    #[arg(short = 'i', long = "incoming")]
    pub max_incoming: Option<u64>,

    /// Outgoing graph scale (kBit/s, 0 = auto)
    #[arg(short = 'o', long = "outgoing")]
    pub max_outgoing: Option<u64>,

    /// Refresh interval in milliseconds (0 = print once and exit)
    #[arg(short = 't', long = "interval")]
    pub refresh_interval: Option<u64>,

    /// Traffic unit (h=human-bit, H=human-byte, b=bit, B=byte, k=kbit, K=kbyte,
    /// m=mbit, M=mbyte, g=gbit, G=gbyte)
    #[arg(short = 'u', long = "unit")]
    pub traffic_unit: Option<Unit>,

    /// Data unit (same letters as -u, used for totals)
    #[arg(short = 'U', long = "data-unit")]
    pub data_unit: Option<Unit>,

    /// Show multiple devices without graphs
    #[arg(short = 'm', long = "multiple")]
    pub multiple_devices: bool,

    /// Log traffic data to file ("-" for stdout)
    #[arg(short = 'f', long = "file")]
    pub traffic_log: Option<String>,

    /// Diagnostic log file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Increase diagnostic verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
