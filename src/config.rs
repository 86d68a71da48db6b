//! Configuration for the teleoperation daemon
//!
//! Loads configuration from a TOML file. The parsed struct is built once at
//! startup and passed by reference into the components that need it; there is
//! no process-wide mutable state.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub actuator: ActuatorConfig,
    pub camera: CameraConfig,
    pub logging: LoggingConfig,
}

/// Link selection for the pilot connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// TCP sockets, one listener per channel
    Tcp,
    /// RFCOMM radio sockets (Linux only)
    Radio,
}

/// Network configuration (control + media channels)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Which link carries the session
    pub mode: LinkMode,

    /// TCP bind address for the control channel
    ///
    /// Examples:
    /// - `0.0.0.0:9495` - all interfaces
    /// - `127.0.0.1:9495` - localhost only
    pub control_address: String,

    /// TCP bind address for the media channel
    pub media_address: String,

    /// RFCOMM channel for control when `mode = "radio"`
    pub radio_control_channel: u8,

    /// RFCOMM channel for media when `mode = "radio"`
    pub radio_media_channel: u8,
}

/// Actuator link configuration (chassis controller serial port)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActuatorConfig {
    /// Serial port path, e.g. `/dev/ttyUSB0`
    pub port: String,
    /// Baud rate, e.g. 115200
    pub baud: u32,
}

/// Camera and pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraConfig {
    /// Frame source: currently `pattern` (built-in synthetic source).
    /// Hardware sources plug in behind the `FrameSource` trait.
    pub device: String,
    /// Resize target width
    pub target_width: u32,
    /// Resize target height
    pub target_height: u32,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration for bench testing
    ///
    /// Listens on the historical control/media ports with the synthetic
    /// frame source. Production deployments should use a TOML file.
    pub fn bench_defaults() -> Self {
        Self {
            network: NetworkConfig {
                mode: LinkMode::Tcp,
                control_address: "0.0.0.0:9495".to_string(),
                media_address: "0.0.0.0:9494".to_string(),
                radio_control_channel: 2,
                radio_media_channel: 1,
            },
            actuator: ActuatorConfig {
                port: "/dev/ttyUSB0".to_string(),
                baud: 115_200,
            },
            camera: CameraConfig {
                device: "pattern".to_string(),
                target_width: 640,
                target_height: 480,
                jpeg_quality: 80,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::bench_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::bench_defaults();
        assert_eq!(config.network.mode, LinkMode::Tcp);
        assert_eq!(config.network.control_address, "0.0.0.0:9495");
        assert_eq!(config.network.media_address, "0.0.0.0:9494");
        assert_eq!(config.actuator.baud, 115_200);
        assert_eq!(config.camera.target_width, 640);
        assert_eq!(config.camera.target_height, 480);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::bench_defaults();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[network]"));
        assert!(toml_string.contains("[actuator]"));
        assert!(toml_string.contains("[camera]"));
        assert!(toml_string.contains("[logging]"));

        let parsed: AppConfig = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.network.control_address, config.network.control_address);
        assert_eq!(parsed.camera.jpeg_quality, config.camera.jpeg_quality);
    }

    #[test]
    fn test_from_file() {
        let toml_content = r#"
[network]
mode = "radio"
control_address = "127.0.0.1:9495"
media_address = "127.0.0.1:9494"
radio_control_channel = 4
radio_media_channel = 3

[actuator]
port = "/dev/ftdi"
baud = 57600

[camera]
device = "pattern"
target_width = 320
target_height = 240
jpeg_quality = 70

[logging]
level = "debug"
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.network.mode, LinkMode::Radio);
        assert_eq!(config.network.radio_control_channel, 4);
        assert_eq!(config.actuator.port, "/dev/ftdi");
        assert_eq!(config.camera.target_width, 320);
        assert_eq!(config.logging.level, "debug");
    }
}
