//! Handler implementations for RetroPie MCP tools

use mcp_common::{invalid_params, json_failure, json_success, text_success, CallToolResult, McpError};
use serde::Serialize;

use crate::cache::{CacheStats, CacheTtls, Resource};
use crate::params::*;
use crate::repository::{MutationError, TelemetryRepository};
use crate::types::{CommandResult, ServiceStatus, SystemInfo};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
struct SystemInfoResponse {
    #[serde(flatten)]
    info: SystemInfo,
    memory_usage_percent: f64,
    disk_usage_percent: f64,
}

#[derive(Serialize)]
struct CacheStatsResponse {
    #[serde(flatten)]
    stats: CacheStats,
    hit_rate: f64,
    ttls: CacheTtls,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Successful mutations return the command record; failures return the
/// structured report with `is_error` set
fn mutation_response(outcome: Result<CommandResult, MutationError>) -> Result<CallToolResult, McpError> {
    match outcome {
        Ok(result) => json_success(&result),
        Err(MutationError::InvalidArgument(message)) => Err(invalid_params(message)),
        Err(e) => json_failure(&e.report()),
    }
}

// ============================================================================
// Read Handlers
// ============================================================================

pub async fn get_system_info(repo: &TelemetryRepository) -> Result<CallToolResult, McpError> {
    let info = repo.get_system_info().await;
    json_success(&SystemInfoResponse {
        memory_usage_percent: info.memory_usage_percent(),
        disk_usage_percent: info.disk_usage_percent(),
        info,
    })
}

pub async fn get_hardware_scan(repo: &TelemetryRepository) -> Result<CallToolResult, McpError> {
    json_success(&repo.get_hardware_scan().await)
}

pub async fn get_network_interfaces(repo: &TelemetryRepository) -> Result<CallToolResult, McpError> {
    json_success(&repo.get_network_interfaces().await)
}

pub async fn list_packages(
    repo: &TelemetryRepository,
    params: ListPackagesParams,
) -> Result<CallToolResult, McpError> {
    let installed_only = params.installed_only.unwrap_or(false);
    let filter = params.filter.map(|f| f.to_lowercase());

    let packages: Vec<_> = repo
        .get_packages()
        .await
        .into_iter()
        .filter(|p| !installed_only || p.installed)
        .filter(|p| {
            filter
                .as_deref()
                .is_none_or(|f| p.name.to_lowercase().contains(f))
        })
        .collect();
    json_success(&packages)
}

pub async fn list_services(
    repo: &TelemetryRepository,
    params: ListServicesParams,
) -> Result<CallToolResult, McpError> {
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => match ServiceStatus::from_name(s) {
            Some(status) => Some(status),
            None => return Err(invalid_params(format!("unknown service status: {s}"))),
        },
    };

    let services: Vec<_> = repo
        .get_services()
        .await
        .into_iter()
        .filter(|s| status.is_none_or(|wanted| s.status == wanted))
        .collect();
    json_success(&services)
}

pub async fn list_bios_files(repo: &TelemetryRepository) -> Result<CallToolResult, McpError> {
    json_success(&repo.get_bios_files().await)
}

// ============================================================================
// Mutation Handlers
// ============================================================================

pub async fn install_packages(
    repo: &TelemetryRepository,
    params: PackagesParams,
) -> Result<CallToolResult, McpError> {
    mutation_response(repo.install_packages(&params.packages).await)
}

pub async fn remove_packages(
    repo: &TelemetryRepository,
    params: PackagesParams,
) -> Result<CallToolResult, McpError> {
    mutation_response(repo.remove_packages(&params.packages).await)
}

pub async fn update_system(repo: &TelemetryRepository) -> Result<CallToolResult, McpError> {
    mutation_response(repo.update_system().await)
}

pub async fn restart_service(
    repo: &TelemetryRepository,
    params: RestartServiceParams,
) -> Result<CallToolResult, McpError> {
    mutation_response(repo.restart_service(&params.service).await)
}

// ============================================================================
// Cache Handlers
// ============================================================================

pub fn get_cache_stats(repo: &TelemetryRepository) -> Result<CallToolResult, McpError> {
    let cache = repo.cache();
    let stats = cache.get_cache_stats();
    json_success(&CacheStatsResponse {
        hit_rate: stats.hit_rate(),
        stats,
        ttls: cache.ttls(),
    })
}

pub fn clear_cache(
    repo: &TelemetryRepository,
    params: ClearCacheParams,
) -> Result<CallToolResult, McpError> {
    let cache = repo.cache();
    match params.resource.as_deref().map(str::trim) {
        None | Some("") => {
            cache.clear_all();
            Ok(text_success("Cleared all cached telemetry"))
        }
        Some(name) => {
            let resource = Resource::from_name(name)
                .ok_or_else(|| invalid_params(format!("unknown cache resource: {name}")))?;
            cache.invalidate(resource);
            Ok(text_success(format!("Invalidated {resource}")))
        }
    }
}
