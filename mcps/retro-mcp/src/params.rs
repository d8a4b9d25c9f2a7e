//! Parameter types for RetroPie MCP tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListPackagesParams {
    #[schemars(description = "Only return installed packages (default: false)")]
    #[serde(default)]
    pub installed_only: Option<bool>,

    #[schemars(description = "Filter by package name (substring match)")]
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListServicesParams {
    #[schemars(description = "Only return services in this state: running, stopped, failed or unknown")]
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PackagesParams {
    #[schemars(description = "Debian package names, e.g. [\"retroarch\", \"lr-snes9x\"]")]
    pub packages: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RestartServiceParams {
    #[schemars(description = "systemd unit name without the .service suffix, e.g. \"emulationstation\"")]
    pub service: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ClearCacheParams {
    #[schemars(
        description = "Resource to invalidate: system_info, hardware_scan, network_scan, service_status or package_list. Omit to clear everything."
    )]
    #[serde(default)]
    pub resource: Option<String>,
}
