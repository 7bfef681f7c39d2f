use crate::stats::DisplayStats;
use crate::validation;
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::Write;

const HEADER: &str = concat!(
    "Date Time DeviceName DataInTotal DataOutTotal DataInPerSecond DataOutPerSecond ",
    "DataInAverage DataOutAverage DataInMin DataOutMin DataInMax DataOutMax ",
    "TimeSeconds TimeMicroSeconds\n",
);

enum Sink {
    File(File),
    Stdout,
}

/// Appends one line of traffic figures per device and tick. Rates are
/// written in bits per second, totals in bytes.
pub struct TrafficLogger {
    sink: Sink,
}

impl TrafficLogger {
    /// Opens `path` for appending, or stdout for `"-"`.
    pub fn new(path: &str) -> anyhow::Result<Self> {
        let sink = if path == "-" {
            Sink::Stdout
        } else {
            validation::validate_file_path(path, None)?;
            Sink::File(OpenOptions::new().create(true).append(true).open(path)?)
        };

        let mut logger = Self { sink };

        // Header only on a fresh file
        let fresh = match &logger.sink {
            Sink::File(f) => f.metadata()?.len() == 0,
            Sink::Stdout => true,
        };
        if fresh {
            logger.write(HEADER)?;
        }

        Ok(logger)
    }

    fn write(&mut self, line: &str) -> anyhow::Result<()> {
        match &mut self.sink {
            Sink::File(f) => {
                f.write_all(line.as_bytes())?;
                f.flush()?;
            }
            Sink::Stdout => print!("{line}"),
        }
        Ok(())
    }

    pub fn log_traffic(&mut self, device: &str, stats: &DisplayStats) -> anyhow::Result<()> {
        let line = format_line(Local::now(), device, stats);
        self.write(&line)
    }
}

fn format_line(now: DateTime<Local>, device: &str, stats: &DisplayStats) -> String {
    format!(
        "{} {} {} {} {} {:.0} {:.0} {:.0} {:.0} {:.0} {:.0} {:.0} {:.0} {} {}\n",
        now.format("%Y-%m-%d"),
        now.format("%H:%M:%S"),
        device,
        stats.total_in,
        stats.total_out,
        stats.current_in,
        stats.current_out,
        stats.average_in,
        stats.average_out,
        stats.min_in,
        stats.min_out,
        stats.max_in,
        stats.max_out,
        now.timestamp(),
        now.timestamp_subsec_micros()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_stats() -> DisplayStats {
        DisplayStats {
            current_in: 8000.0,
            current_out: 4000.0,
            average_in: 6000.0,
            average_out: 2000.5,
            max_in: 8000.0,
            max_out: 4000.0,
            total_in: 1500,
            total_out: 700,
            ..DisplayStats::default()
        }
    }

    #[test]
    fn test_line_layout() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let line = format_line(now, "eth0", &sample_stats());
        let fields: Vec<&str> = line.split_whitespace().collect();

        assert_eq!(fields.len(), HEADER.split_whitespace().count());
        assert_eq!(fields[0], "2024-03-01");
        assert_eq!(fields[1], "12:30:05");
        assert_eq!(&fields[2..7], &["eth0", "1500", "700", "8000", "4000"]);
        assert_eq!(fields[13], now.timestamp().to_string());
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traffic.log");
        let path = path.to_str().unwrap();

        let mut logger = TrafficLogger::new(path).unwrap();
        logger.log_traffic("eth0", &sample_stats()).unwrap();
        drop(logger);

        let mut logger = TrafficLogger::new(path).unwrap();
        logger.log_traffic("lo", &DisplayStats::default()).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Date Time DeviceName"));
        assert!(lines[1].contains(" eth0 "));
        assert!(lines[2].contains(" lo "));
    }

    #[test]
    fn test_rejects_system_paths() {
        assert!(TrafficLogger::new("/proc/traffic.log").is_err());
    }
}
