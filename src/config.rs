//! Driver configuration parameters
//!
//! All tunable parameters for the relay board driver.
//! Values can be overridden from a JSON file passed to the CLI.

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Core driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    // --- Bus identity ---
    /// USB vendor ID of the CH341A bridge on the board
    pub vendor_id: u16,
    /// USB product ID of the CH341A bridge in EPP/MEM/I2C mode
    pub product_id: u16,
    /// Interface number to claim
    pub interface: u8,
    /// Bulk OUT endpoint address that receives command frames
    pub bulk_out_endpoint: u8,

    // --- Timing ---
    /// Timeout for a single frame send (milliseconds)
    pub frame_timeout_ms: u32,
    /// Minimum interval between two status reads on one handle (milliseconds)
    pub min_read_interval_ms: u32,

    // --- Registration ---
    /// First minor number handed out to an attached board
    pub minor_base: u8,
    /// Maximum number of simultaneously registered boards
    pub max_boards: u8,
    /// Device node stem; boards appear as `usb/<node_name><minor>`
    pub node_name: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            // Bus identity
            vendor_id: 0x1a86,
            product_id: 0x5512,
            interface: 0,
            bulk_out_endpoint: 0x02,

            // Timing
            frame_timeout_ms: 2000,    // 2 s per frame
            min_read_interval_ms: 500, // 2 reads/s per handle

            // Registration
            minor_base: 0,
            max_boards: 16,
            node_name: String::from("relayboard"),
        }
    }
}

/// Errors from [`DriverConfig`] loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    /// The document could not be parsed.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl DriverConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the driver cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("frame_timeout_ms must be > 0"));
        }
        if self.bulk_out_endpoint & 0x80 != 0 {
            return Err(ConfigError::ValidationFailed(
                "bulk_out_endpoint must be an OUT endpoint",
            ));
        }
        if self.max_boards == 0 {
            return Err(ConfigError::ValidationFailed("max_boards must be > 0"));
        }
        if u16::from(self.minor_base) + u16::from(self.max_boards) > 256 {
            return Err(ConfigError::ValidationFailed(
                "minor_base + max_boards exceeds the minor range",
            ));
        }
        if self.node_name.is_empty() {
            return Err(ConfigError::ValidationFailed("node_name must not be empty"));
        }
        Ok(())
    }

    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.frame_timeout_ms))
    }

    pub fn min_read_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.min_read_interval_ms))
    }
}
