use crate::{
    device::{CounterSample, CounterSource},
    error::{NetgaugeError, Result},
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const PROC_NET_DEV: &str = "/proc/net/dev";

/// Reads counters from the Linux `/proc/net/dev` table.
pub struct ProcNetDevSource {
    path: PathBuf,
}

impl Default for ProcNetDevSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcNetDevSource {
    pub fn new() -> Self {
        Self::with_path(PROC_NET_DEV)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn rows(content: &str) -> impl Iterator<Item = (&str, &str)> {
        // Two header lines, then "  name: counters..."
        content
            .lines()
            .skip(2)
            .filter_map(|line| line.split_once(':'))
            .map(|(name, rest)| (name.trim(), rest))
            .filter(|(name, _)| !name.is_empty())
    }

    pub fn parse_proc_net_dev(&self, content: &str, device: &str) -> Result<CounterSample> {
        let (_, counters) = Self::rows(content)
            .find(|(name, _)| *name == device)
            .ok_or_else(|| NetgaugeError::DeviceUnavailable(device.to_string()))?;

        let fields: Vec<&str> = counters.split_whitespace().collect();
        if fields.len() < 10 {
            return Err(NetgaugeError::Parse(format!(
                "short /proc/net/dev row for {device}: {} fields",
                fields.len()
            )));
        }

        let field = |index: usize| -> Result<u64> {
            fields[index].parse().map_err(|_| {
                NetgaugeError::Parse(format!(
                    "bad counter '{}' for {device} in column {index}",
                    fields[index]
                ))
            })
        };

        Ok(CounterSample {
            timestamp: SystemTime::now(),
            bytes_in: field(0)?,
            packets_in: Some(field(1)?),
            bytes_out: field(8)?,
            packets_out: Some(field(9)?),
        })
    }

    pub fn parse_device_names(content: &str) -> Vec<String> {
        Self::rows(content)
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

impl CounterSource for ProcNetDevSource {
    fn backend(&self) -> &'static str {
        "procfs"
    }

    fn list_devices(&self) -> Result<Vec<String>> {
        let content = fs::read_to_string(&self.path)?;
        Ok(Self::parse_device_names(&content))
    }

    fn read(&self, device: &str) -> Result<CounterSample> {
        let content = fs::read_to_string(&self.path)?;
        self.parse_proc_net_dev(&content, device)
    }

    fn is_available(&self) -> bool {
        Path::new(&self.path).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1234567      100    0    0    0     0          0         0  1234567      100    0    0    0     0       0          0
  eth0: 9876543210   5000    0    0    0     0          0         0  1234567890   3000    0    0    0     0       0          0
wlan0:42 7 0 0 0 0 0 0 84 9 0 0 0 0 0 0
"#;

    #[test]
    fn test_parse_proc_net_dev() {
        let source = ProcNetDevSource::new();
        let sample = source.parse_proc_net_dev(SAMPLE, "eth0").unwrap();
        assert_eq!(sample.bytes_in, 9876543210);
        assert_eq!(sample.bytes_out, 1234567890);
        assert_eq!(sample.packets_in, Some(5000));
        assert_eq!(sample.packets_out, Some(3000));
    }

    #[test]
    fn test_parse_row_without_space_after_colon() {
        // Older kernels glue large counters to the interface name
        let source = ProcNetDevSource::new();
        let sample = source.parse_proc_net_dev(SAMPLE, "wlan0").unwrap();
        assert_eq!(sample.bytes_in, 42);
        assert_eq!(sample.bytes_out, 84);
    }

    #[test]
    fn test_device_not_found() {
        let source = ProcNetDevSource::new();
        let result = source.parse_proc_net_dev(SAMPLE, "nonexistent");
        assert!(matches!(
            result.unwrap_err(),
            NetgaugeError::DeviceUnavailable(_)
        ));
    }

    #[test]
    fn test_truncated_row_is_parse_error() {
        let source = ProcNetDevSource::new();
        let content = "h1\nh2\n  eth0: 1 2 3\n";
        assert!(matches!(
            source.parse_proc_net_dev(content, "eth0").unwrap_err(),
            NetgaugeError::Parse(_)
        ));
    }

    #[test]
    fn test_list_devices_keeps_loopback() {
        assert_eq!(
            ProcNetDevSource::parse_device_names(SAMPLE),
            vec!["lo", "eth0", "wlan0"]
        );
    }

    #[test]
    fn test_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = ProcNetDevSource::with_path(file.path());
        assert!(source.is_available());
        assert_eq!(source.read("lo").unwrap().bytes_in, 1234567);
        assert_eq!(source.list_devices().unwrap().len(), 3);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let source = ProcNetDevSource::with_path("/nonexistent/net/dev");
        assert!(!source.is_available());
        assert!(source.list_devices().is_err());
    }
}
