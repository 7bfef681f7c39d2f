use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary run with an empty home directory so no user config leaks in.
fn netgauge(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("netgauge").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("RUST_LOG")
        .arg("--log-file")
        .arg(home.path().join("netgauge.log"));
    cmd
}

fn loopback() -> &'static str {
    if cfg!(target_os = "macos") {
        "lo0"
    } else {
        "lo"
    }
}

#[test]
fn test_help_flag() {
    let mut cmd = Command::cargo_bin("netgauge").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("netgauge"))
        .stdout(predicate::str::contains("network traffic monitor"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("netgauge").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("netgauge"));
}

#[test]
fn test_list_flag() {
    let home = TempDir::new().unwrap();
    netgauge(&home)
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains(loopback()));
}

#[test]
fn test_invalid_argument() {
    let mut cmd = Command::cargo_bin("netgauge").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_invalid_unit_letter() {
    let mut cmd = Command::cargo_bin("netgauge").unwrap();
    cmd.args(["-u", "x", "--list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_missing_device_aborts() {
    let home = TempDir::new().unwrap();
    netgauge(&home)
        .args(["-t", "0", "ghost0"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No such device: ghost0"));
}

#[test]
fn test_missing_device_aborts_even_with_valid_ones() {
    let home = TempDir::new().unwrap();
    netgauge(&home)
        .args(["-t", "0", loopback(), "ghost0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost0"));
}

#[test]
fn test_path_like_device_rejected() {
    let home = TempDir::new().unwrap();
    netgauge(&home)
        .args(["-t", "0", "../../etc/passwd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path separators"));
}

#[test]
fn test_single_shot_report() {
    let home = TempDir::new().unwrap();
    netgauge(&home)
        .args(["-t", "0", "-u", "b", "-U", "B", loopback()])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Device {}", loopback())))
        .stdout(predicate::str::contains("Incoming: Curr:"))
        .stdout(predicate::str::contains("bit/s"))
        .stdout(predicate::str::contains("Outgoing:"));
}

#[test]
fn test_refresh_interval_upper_bound() {
    let home = TempDir::new().unwrap();
    netgauge(&home)
        .args(["-t", "120000", loopback()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Refresh interval too large"));
}

#[test]
fn test_bandwidth_scale_upper_bound() {
    let home = TempDir::new().unwrap();
    netgauge(&home)
        .args(["-t", "0", "-i", "2000000000", loopback()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Bandwidth value too large"));
}

#[test]
fn test_traffic_log_file() {
    let home = TempDir::new().unwrap();
    let log = home.path().join("traffic.log");
    netgauge(&home)
        .args(["-t", "0", "-f"])
        .arg(&log)
        .arg(loopback())
        .assert()
        .success();

    let content = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Date Time DeviceName"));
    assert!(lines[1].contains(&format!(" {} ", loopback())));
}

#[test]
fn test_diagnostic_log_written() {
    let home = TempDir::new().unwrap();
    netgauge(&home)
        .args(["-v", "-t", "0", loopback()])
        .assert()
        .success();

    let log = std::fs::read_to_string(home.path().join("netgauge.log")).unwrap();
    assert!(log.contains("monitoring started"));
}

#[test]
fn test_config_file_supplies_settings() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join(".netgauge"),
        format!("RefreshInterval = 0\nDevices = \"{}\"\nTrafficFormat = \"B\"\n", loopback()),
    )
    .unwrap();

    netgauge(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Device {}", loopback())))
        .stdout(predicate::str::contains("B/s"));
}

#[test]
fn test_legacy_nload_config() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join(".nload"),
        "RefreshInterval=\"0\"\nDevices=\"ghost1\"\n",
    )
    .unwrap();

    netgauge(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No such device: ghost1"));
}

#[test]
fn test_command_line_overrides_config() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join(".netgauge"), "Devices = \"ghost2\"\n").unwrap();

    netgauge(&home)
        .args(["-t", "0", loopback()])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Device {}", loopback())));
}
