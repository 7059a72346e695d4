use std::io::Write;

use flashforge_rs::config::{ConfigError, load_config};
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[server]
port = 9000

[[printers]]
id = "workshop"
host = "192.168.1.50"
timeout_ms = 1500
"#
    )
    .unwrap();

    let config = load_config(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.server.bind_address(), "0.0.0.0:9000");
    let printer = config.printer("workshop").unwrap();
    assert_eq!(printer.host, "192.168.1.50");
    assert_eq!(printer.port, 8899);
    assert_eq!(printer.timeout_ms, 1500);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = load_config(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_malformed_file_is_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[[printers]\nhost = ").unwrap();
    let err = load_config(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}
