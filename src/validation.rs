//! Input validation for device names, paths and numeric settings.
//!
//! Device names end up in filesystem paths (`/sys/class/net/<name>`), so they
//! are checked before any backend sees them.

use crate::error::{NetgaugeError, Result};
use std::path::Path;
use tracing::warn;

/// Maximum allowed length for network device names
pub const MAX_INTERFACE_NAME_LEN: usize = 64;

/// Maximum allowed length for file paths
const MAX_PATH_LEN: usize = 4096;

/// Maximum allowed refresh interval in milliseconds
pub const MAX_REFRESH_INTERVAL: u64 = 60_000;

/// Maximum bar scale: 1 Tbit/s expressed in kbit/s
pub const MAX_BANDWIDTH: u64 = 1_000_000_000;

/// Validates a device identifier before it reaches a counter source.
///
/// # Examples
/// ```
/// use netgauge::validation::validate_interface_name;
///
/// assert!(validate_interface_name("eth0").is_ok());
/// assert!(validate_interface_name("br-docker0").is_ok());
/// assert!(validate_interface_name("../etc/passwd").is_err());
/// ```
pub fn validate_interface_name(name: &str) -> Result<()> {
    let problem = if name.is_empty() {
        Some("Interface name cannot be empty".to_string())
    } else if name.len() > MAX_INTERFACE_NAME_LEN {
        Some(format!(
            "Interface name too long (max {MAX_INTERFACE_NAME_LEN} characters)"
        ))
    } else if name.contains("..") || name.contains('/') || name.contains('\\') {
        Some("Path separators not allowed in interface name".to_string())
    } else if name.chars().any(char::is_control) {
        Some("Control characters not allowed in interface name".to_string())
    } else if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        Some("Invalid characters in interface name".to_string())
    } else {
        None
    };

    match problem {
        Some(message) => {
            warn!(name = %name.escape_debug(), "rejected interface name: {message}");
            Err(NetgaugeError::Parse(message))
        }
        None => Ok(()),
    }
}

/// Validates file paths for logging and configuration
///
/// # Examples
/// ```
/// use netgauge::validation::validate_file_path;
///
/// assert!(validate_file_path("/tmp/netgauge.log", Some("log")).is_ok());
/// assert!(validate_file_path("../../../etc/passwd", None).is_err());
/// ```
pub fn validate_file_path(path: &str, expected_extension: Option<&str>) -> Result<()> {
    if path.is_empty() {
        return Err(NetgaugeError::Config(
            "File path cannot be empty".to_string(),
        ));
    }

    if path.len() > MAX_PATH_LEN {
        return Err(NetgaugeError::Config(format!(
            "File path too long (max {MAX_PATH_LEN} characters)"
        )));
    }

    if path.chars().any(char::is_control) {
        return Err(NetgaugeError::Config(
            "Control characters not allowed in file path".to_string(),
        ));
    }

    if path.contains("..") {
        return Err(NetgaugeError::Config("Path traversal detected".to_string()));
    }

    let sensitive_dirs = [
        "/etc", "/boot", "/proc", "/sys", "/dev", "/usr/bin", "/usr/sbin", "/bin", "/sbin",
    ];
    // Component-wise, so `/devel` is not mistaken for `/dev`
    if sensitive_dirs
        .iter()
        .any(|dir| Path::new(path).starts_with(dir))
    {
        return Err(NetgaugeError::Config(
            "Access to system directory denied".to_string(),
        ));
    }

    if let Some(expected_ext) = expected_extension {
        match Path::new(path).extension() {
            Some(ext) if ext.to_string_lossy().eq_ignore_ascii_case(expected_ext) => {}
            Some(_) => {
                return Err(NetgaugeError::Config(format!(
                    "Invalid file extension, expected: {expected_ext}"
                )))
            }
            None => {
                return Err(NetgaugeError::Config(format!(
                    "Missing file extension, expected: {expected_ext}"
                )))
            }
        }
    }

    Ok(())
}

/// Zero is accepted and selects a single update cycle.
pub fn validate_refresh_interval(interval_ms: u64) -> Result<()> {
    if interval_ms > MAX_REFRESH_INTERVAL {
        return Err(NetgaugeError::Config(format!(
            "Refresh interval too large (maximum {MAX_REFRESH_INTERVAL} ms)"
        )));
    }

    Ok(())
}

pub fn validate_bandwidth(bandwidth_kbps: u64) -> Result<()> {
    if bandwidth_kbps > MAX_BANDWIDTH {
        return Err(NetgaugeError::Config(format!(
            "Bandwidth value too large (maximum {MAX_BANDWIDTH} kbps)"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_name_validation() {
        // Valid interface names
        assert!(validate_interface_name("eth0").is_ok());
        assert!(validate_interface_name("wlan0").is_ok());
        assert!(validate_interface_name("en0").is_ok());
        assert!(validate_interface_name("lo").is_ok());
        assert!(validate_interface_name("br-docker0").is_ok());
        assert!(validate_interface_name("veth_1.100").is_ok());
        assert!(validate_interface_name(&"x".repeat(MAX_INTERFACE_NAME_LEN)).is_ok());

        // Invalid interface names
        assert!(validate_interface_name("").is_err());
        assert!(validate_interface_name("../../../etc/passwd").is_err());
        assert!(validate_interface_name(&"x".repeat(MAX_INTERFACE_NAME_LEN + 1)).is_err());
        assert!(validate_interface_name("interface with spaces").is_err());
        assert!(validate_interface_name("interface\x00null").is_err());
        assert!(validate_interface_name("interface\nwith\nnewlines").is_err());
        assert!(validate_interface_name("net\\dev").is_err());
    }

    #[test]
    fn test_file_path_validation() {
        // Valid file paths
        assert!(validate_file_path("/tmp/netgauge.log", Some("log")).is_ok());
        assert!(validate_file_path("/home/user/traffic.LOG", Some("log")).is_ok());
        assert!(validate_file_path("./traffic.txt", None).is_ok());

        // Invalid file paths
        assert!(validate_file_path("", None).is_err());
        assert!(validate_file_path("../../../etc/passwd", None).is_err());
        assert!(validate_file_path("/etc/shadow", None).is_err());
        assert!(validate_file_path("/proc/version", None).is_err());
        assert!(validate_file_path("file\x00with\x00nulls", None).is_err());
        assert!(validate_file_path("/tmp/file.txt", Some("log")).is_err());
        assert!(validate_file_path("/tmp/file", Some("log")).is_err());
    }

    #[test]
    fn test_system_directories_match_whole_components() {
        assert!(validate_file_path("/devel/traffic.log", None).is_ok());
        assert!(validate_file_path("/etcetera/traffic.log", None).is_ok());
        assert!(validate_file_path("/binaries/traffic.log", None).is_ok());
        assert!(validate_file_path("/dev/null", None).is_err());
        assert!(validate_file_path("/dev", None).is_err());
        assert!(validate_file_path("//etc/shadow", None).is_err());
        assert!(validate_file_path("/usr/bin/env", None).is_err());
    }

    #[test]
    fn test_refresh_interval_validation() {
        assert!(validate_refresh_interval(0).is_ok());
        assert!(validate_refresh_interval(500).is_ok());
        assert!(validate_refresh_interval(60_000).is_ok());
        assert!(validate_refresh_interval(120_000).is_err());
    }

    #[test]
    fn test_bandwidth_validation() {
        assert!(validate_bandwidth(0).is_ok());
        assert!(validate_bandwidth(10240).is_ok());
        assert!(validate_bandwidth(MAX_BANDWIDTH).is_ok());
        assert!(validate_bandwidth(u64::MAX).is_err());
        assert!(validate_bandwidth(2_000_000_000).is_err());
    }
}
