//! Raspberry Pi hardware health

use serde::{Deserialize, Serialize};

/// Model reported when the device tree has no model node
pub const UNKNOWN_MODEL: &str = "unknown";

/// Decoded `vcgencmd get_throttled` bit field
///
/// Low bits describe the current state, bits 16-19 record whether the
/// same condition has happened since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleState {
    pub raw: u32,
    pub under_voltage: bool,
    pub frequency_capped: bool,
    pub throttled: bool,
    pub soft_temperature_limit: bool,
    pub under_voltage_occurred: bool,
    pub frequency_capped_occurred: bool,
    pub throttled_occurred: bool,
    pub soft_temperature_limit_occurred: bool,
}

impl ThrottleState {
    pub fn from_bits(raw: u32) -> Self {
        let bit = |n: u32| raw & (1 << n) != 0;
        Self {
            raw,
            under_voltage: bit(0),
            frequency_capped: bit(1),
            throttled: bit(2),
            soft_temperature_limit: bit(3),
            under_voltage_occurred: bit(16),
            frequency_capped_occurred: bit(17),
            throttled_occurred: bit(18),
            soft_temperature_limit_occurred: bit(19),
        }
    }

    /// True if any current or historical condition is flagged
    pub fn has_issues(&self) -> bool {
        self.raw != 0
    }
}

/// Result of a hardware scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareScan {
    /// Board model from the device tree, e.g. "Raspberry Pi 4 Model B Rev 1.4"
    pub model: String,
    /// GPU temperature in degrees Celsius
    pub gpu_temperature: f64,
    /// Core voltage in volts
    pub core_voltage: f64,
    pub arm_frequency_hz: u64,
    pub throttle: ThrottleState,
}

impl Default for HardwareScan {
    fn default() -> Self {
        Self {
            model: UNKNOWN_MODEL.to_string(),
            gpu_temperature: 0.0,
            core_voltage: 0.0,
            arm_frequency_hz: 0,
            throttle: ThrottleState::default(),
        }
    }
}

impl HardwareScan {
    pub fn arm_frequency_mhz(&self) -> u64 {
        self.arm_frequency_hz / 1_000_000
    }
}
