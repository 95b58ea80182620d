//! Host configuration
//!
//! All fields have defaults, so an empty JSON object is a valid config.
//!
//! ```
//! use smartpt_host::HostConfig;
//!
//! let config = HostConfig::from_json(r#"{ "ack_timeout_ms": 2000 }"#).unwrap();
//! assert_eq!(config.ack_timeout_ms, 2000);
//! assert_eq!(config.device_name, "SmartPT_Device");
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use smartpt_core::align::DEFAULT_TOLERANCE_MS;
use smartpt_core::protocol::service::DEVICE_NAME;

use crate::error::HostError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Advertised name to scan for
    pub device_name: String,
    /// How long to wait for the node's ACK after Start
    pub ack_timeout_ms: u64,
    /// How long to wait for outstanding inference results after Stop
    pub results_timeout_ms: u64,
    /// Jitter allowance around the video window
    pub alignment_tolerance_ms: u64,
    /// Capacity of the notification channel fed by the transport
    pub notification_buffer: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            device_name: DEVICE_NAME.to_string(),
            ack_timeout_ms: 5000,
            results_timeout_ms: 10_000,
            alignment_tolerance_ms: DEFAULT_TOLERANCE_MS,
            notification_buffer: 64,
        }
    }
}

impl HostConfig {
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| HostError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), HostError> {
        if self.device_name.is_empty() {
            return Err(HostError::Config("device_name must not be empty".into()));
        }
        if self.ack_timeout_ms == 0 {
            return Err(HostError::Config("ack_timeout_ms must be positive".into()));
        }
        if self.notification_buffer == 0 {
            return Err(HostError::Config(
                "notification_buffer must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    pub fn results_timeout(&self) -> Duration {
        Duration::from_millis(self.results_timeout_ms)
    }
}
