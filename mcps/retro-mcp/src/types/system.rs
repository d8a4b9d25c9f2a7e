//! Core system telemetry

use serde::{Deserialize, Serialize};

/// Hostname reported when the host did not tell us its name
pub const UNKNOWN_HOSTNAME: &str = "unknown";

/// System load averaged over 1, 5 and 15 minutes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

impl LoadAverage {
    pub fn new(one: f64, five: f64, fifteen: f64) -> Self {
        Self { one, five, fifteen }
    }
}

/// Memory figures in bytes, as reported by `free -b`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

/// Root filesystem figures in bytes, as reported by `df -B1 /`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

/// Snapshot of the host's vital signs
///
/// Every field has a default (`"unknown"` or zero) that stands in when its
/// source command fails or prints something unexpected, so a partially
/// failed fetch still yields a complete record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: String,
    /// SoC temperature in degrees Celsius
    pub cpu_temperature: f64,
    pub memory_total: u64,
    pub memory_used: u64,
    pub memory_free: u64,
    pub disk_total: u64,
    pub disk_used: u64,
    pub disk_free: u64,
    pub load_average: LoadAverage,
    /// Seconds since boot
    pub uptime: u64,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            hostname: UNKNOWN_HOSTNAME.to_string(),
            cpu_temperature: 0.0,
            memory_total: 0,
            memory_used: 0,
            memory_free: 0,
            disk_total: 0,
            disk_used: 0,
            disk_free: 0,
            load_average: LoadAverage::default(),
            uptime: 0,
        }
    }
}

impl SystemInfo {
    /// Memory usage percentage (0-100)
    pub fn memory_usage_percent(&self) -> f64 {
        percent(self.memory_used, self.memory_total)
    }

    /// Root filesystem usage percentage (0-100)
    pub fn disk_usage_percent(&self) -> f64 {
        percent(self.disk_used, self.disk_total)
    }
}

fn percent(used: u64, total: u64) -> f64 {
    if total > 0 {
        (used as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
