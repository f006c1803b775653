//! Config file loading

use std::fs;
use std::path::PathBuf;

use epaper_host::{Error, HostConfig};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("epaper-{}-{name}", std::process::id()))
}

#[test]
fn test_load_file() {
    let path = temp_path("epaper.toml");
    fs::write(
        &path,
        "log_level = \"trace\"\n[serial]\ndevice = \"/dev/ttyAMA0\"\nbaudrate = 57600\n",
    )
    .unwrap();

    let config = HostConfig::load(&path).unwrap();
    assert_eq!(config.log_level.as_deref(), Some("trace"));
    assert_eq!(config.serial.device, Some(PathBuf::from("/dev/ttyAMA0")));
    assert_eq!(config.uart_config().baudrate, 57600);
    assert!(config.serial.hangup_on_close);

    assert_eq!(HostConfig::load_or_default(&path).unwrap(), config);
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_file() {
    let path = temp_path("missing.toml");
    assert!(matches!(HostConfig::load(&path), Err(Error::Config(_))));
    assert_eq!(
        HostConfig::load_or_default(&path).unwrap(),
        HostConfig::default()
    );
}

#[test]
fn test_malformed_file() {
    let path = temp_path("broken.toml");
    fs::write(&path, "[serial\nbaudrate = 9600\n").unwrap();

    let err = HostConfig::load_or_default(&path).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    fs::remove_file(&path).unwrap();
}
