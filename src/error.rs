#[derive(Debug, thiserror::Error)]
pub enum NetgaugeError {
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Clock anomaly on {device}: sample is not newer than the previous one")]
    ClockAnomaly { device: String },

    #[error("No network devices discovered")]
    NoDevicesDiscovered,

    #[error("No such device: {name} (missing: {})", .missing.join(", "))]
    UnknownRequestedDevice { name: String, missing: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Platform error: {0}")]
    Platform(String),
}

impl NetgaugeError {
    /// Per-tick errors that the controller absorbs instead of surfacing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DeviceUnavailable(_) | Self::ClockAnomaly { .. } | Self::Io(_) | Self::Parse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NetgaugeError>;
