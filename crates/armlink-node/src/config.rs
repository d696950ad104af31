use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NodeError, Result};

/// Device opened when none is configured.
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB2";

/// Line rate used when none is configured.
pub const DEFAULT_BAUDRATE: u32 = 9600;

const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

/// Startup configuration for an [`ArmNode`](crate::ArmNode).
///
/// Read once; missing keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// Device path or `serial://path[:baud]` URL.
    pub serial_port: String,
    pub baudrate: u32,
    /// Cap on accumulated receive bytes. `None` keeps everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_limit: Option<usize>,
    /// How often the reader wakes up to check for shutdown.
    pub read_timeout_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            serial_port: DEFAULT_SERIAL_PORT.to_string(),
            baudrate: DEFAULT_BAUDRATE,
            receive_limit: None,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl NodeConfig {
    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| NodeError::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|err| NodeError::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Reader poll interval; never zero, which would spin.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(tag: &str, body: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "armlink-config-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        let path = dir.join("node.json");
        std::fs::write(&path, body).expect("config should be writable");
        path
    }

    #[test]
    fn defaults_match_board_wiring() {
        let config = NodeConfig::default();
        assert_eq!(config.serial_port, "/dev/ttyUSB2");
        assert_eq!(config.baudrate, 9600);
        assert_eq!(config.receive_limit, None);
        assert_eq!(config.read_timeout(), Duration::from_millis(100));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = temp_config("partial", r#"{ "baudrate": 57600 }"#);
        let config = NodeConfig::from_json_file(&path).expect("config should load");
        assert_eq!(config.serial_port, DEFAULT_SERIAL_PORT);
        assert_eq!(config.baudrate, 57600);
        let _ = std::fs::remove_dir_all(path.parent().expect("config has a parent"));
    }

    #[test]
    fn full_file_round_trips_every_key() {
        let path = temp_config(
            "full",
            r#"{
                "serial_port": "serial:///dev/ttyACM0:115200",
                "baudrate": 19200,
                "receive_limit": 4096,
                "read_timeout_ms": 0
            }"#,
        );
        let config = NodeConfig::from_json_file(&path).expect("config should load");
        assert_eq!(config.serial_port, "serial:///dev/ttyACM0:115200");
        assert_eq!(config.baudrate, 19200);
        assert_eq!(config.receive_limit, Some(4096));
        assert_eq!(config.read_timeout(), Duration::from_millis(1));
        let _ = std::fs::remove_dir_all(path.parent().expect("config has a parent"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let path = temp_config("unknown", r#"{ "serial": "/dev/ttyUSB0" }"#);
        let err = NodeConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, NodeError::Config { .. }));
        let _ = std::fs::remove_dir_all(path.parent().expect("config has a parent"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = NodeConfig::from_json_file("/nonexistent/armlink/node.json").unwrap_err();
        assert!(matches!(err, NodeError::Config { .. }));
    }
}
