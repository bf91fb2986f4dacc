use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub unix_socket: Option<String>,
    pub host: Option<String>,
    pub path: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    30
}

/// Pauses of the blink sequence: released for `release_ms`, engaged for `hold_ms`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct BlinkTiming {
    pub release_ms: u64,
    pub hold_ms: u64,
}

impl BlinkTiming {
    pub fn release(&self) -> Duration {
        Duration::from_millis(self.release_ms)
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

impl Default for BlinkTiming {
    fn default() -> Self {
        Self {
            release_ms: 200,
            hold_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GpioConfig {
    #[serde(default = "default_chip")]
    pub chip: String,
    #[serde(default)]
    pub blink: BlinkTiming,
}

fn default_chip() -> String {
    "/dev/gpiochip0".to_string()
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            chip: default_chip(),
            blink: BlinkTiming::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PinEntryConfig {
    #[serde(default)]
    pub name: String,
    pub number: Option<u32>,
    #[serde(default = "default_active")]
    pub active: String,
}

fn default_active() -> String {
    "low".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KeyPinControlConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub pins: Vec<PinEntryConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    #[serde(default)]
    pub gpio: GpioConfig,
    #[serde(default)]
    pub key_pin_control: Vec<KeyPinControlConfig>,
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let contents = fs::read_to_string(&path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Invalid config json: {e}")))
    }
}
