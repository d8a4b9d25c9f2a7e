//! systemd service types

use serde::{Deserialize, Serialize};

/// Service state derived from the unit's ACTIVE column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Running,
    Stopped,
    Failed,
    Unknown,
}

impl ServiceStatus {
    pub fn from_active_state(active: &str) -> Self {
        match active {
            "active" => ServiceStatus::Running,
            "inactive" => ServiceStatus::Stopped,
            "failed" => ServiceStatus::Failed,
            _ => ServiceStatus::Unknown,
        }
    }

    /// Inverse of [`as_str`](Self::as_str)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "running" => Some(ServiceStatus::Running),
            "stopped" => Some(ServiceStatus::Stopped),
            "failed" => Some(ServiceStatus::Failed),
            "unknown" => Some(ServiceStatus::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Running => "running",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::Failed => "failed",
            ServiceStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Unit name without its `.service` suffix
    pub name: String,
    pub description: String,
    pub status: ServiceStatus,
}
