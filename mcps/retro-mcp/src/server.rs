//! MCP Server implementation for RetroPie host management

use std::sync::Arc;

use mcp_common::{async_trait, EmbeddableError, EmbeddableMcp, EmbeddableResult, McpError};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ServerCapabilities, ServerInfo, Tool},
    tool, tool_handler, tool_router,
};
use serde_json::Value;

use crate::cache::TelemetryCache;
use crate::config::{ConfigError, RetroConfig};
use crate::handlers;
use crate::params::*;
use crate::remote::SshClient;
use crate::repository::TelemetryRepository;

const DESCRIPTION: &str = "RetroPie MCP Server - cached system telemetry, hardware health, \
     package and service management for a RetroPie host over SSH.";

/// The main RetroPie MCP Server
#[derive(Clone)]
pub struct RetroMcpServer {
    repository: Arc<TelemetryRepository>,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool Router Implementation
// ============================================================================

#[tool_router]
impl RetroMcpServer {
    pub fn new(repository: TelemetryRepository) -> Self {
        Self {
            repository: Arc::new(repository),
            tool_router: Self::tool_router(),
        }
    }

    /// Build a server talking to the host named by the loaded config
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = RetroConfig::load()?;
        tracing::info!(
            host = %config.connection.host,
            username = %config.connection.username,
            port = config.connection.port,
            "Connecting to RetroPie host"
        );

        let bios_dir = config.bios_dir();
        let cache = TelemetryCache::with_ttls(config.cache);
        let client = Arc::new(SshClient::new(config.connection));
        let repository = TelemetryRepository::new(client, cache).with_bios_dir(bios_dir);
        Ok(Self::new(repository))
    }

    pub fn repository(&self) -> &TelemetryRepository {
        &self.repository
    }

    #[tool(
        description = "Get host vital signs: hostname, CPU temperature, memory and root disk usage, load average and uptime. Served from cache for 30s; stale data is returned if the host is unreachable."
    )]
    async fn get_system_info(&self) -> Result<CallToolResult, McpError> {
        handlers::get_system_info(&self.repository).await
    }

    #[tool(
        description = "Get Raspberry Pi hardware health: board model, GPU temperature, core voltage, ARM clock and decoded throttling flags (under-voltage, frequency capping, thermal throttling)"
    )]
    async fn get_hardware_scan(&self) -> Result<CallToolResult, McpError> {
        handlers::get_hardware_scan(&self.repository).await
    }

    #[tool(description = "List IPv4 addresses bound to the host's network interfaces")]
    async fn get_network_interfaces(&self) -> Result<CallToolResult, McpError> {
        handlers::get_network_interfaces(&self.repository).await
    }

    #[tool(description = "List Debian packages known to dpkg with version and install state")]
    async fn list_packages(
        &self,
        Parameters(params): Parameters<ListPackagesParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::list_packages(&self.repository, params).await
    }

    #[tool(description = "List systemd services with description and status")]
    async fn list_services(
        &self,
        Parameters(params): Parameters<ListServicesParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::list_services(&self.repository, params).await
    }

    #[tool(
        description = "List BIOS images (.bin, .rom, .bios, .zip) in the RetroPie BIOS directory with size and guessed platform"
    )]
    async fn list_bios_files(&self) -> Result<CallToolResult, McpError> {
        handlers::list_bios_files(&self.repository).await
    }

    #[tool(
        description = "Install packages with apt (runs apt-get update first, requires sudo). Failures report which packages were not found."
    )]
    async fn install_packages(
        &self,
        Parameters(params): Parameters<PackagesParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::install_packages(&self.repository, params).await
    }

    #[tool(description = "Remove packages with apt (requires sudo)")]
    async fn remove_packages(
        &self,
        Parameters(params): Parameters<PackagesParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::remove_packages(&self.repository, params).await
    }

    #[tool(description = "Update the package index and upgrade all packages (requires sudo)")]
    async fn update_system(&self) -> Result<CallToolResult, McpError> {
        handlers::update_system(&self.repository).await
    }

    #[tool(description = "Restart a systemd service, e.g. emulationstation (requires sudo)")]
    async fn restart_service(
        &self,
        Parameters(params): Parameters<RestartServiceParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::restart_service(&self.repository, params).await
    }

    #[tool(description = "Get telemetry cache hit/miss counters, entry count and configured TTLs")]
    async fn get_cache_stats(&self) -> Result<CallToolResult, McpError> {
        handlers::get_cache_stats(&self.repository)
    }

    #[tool(description = "Invalidate one cached resource, or all cached telemetry if none is given")]
    async fn clear_cache(
        &self,
        Parameters(params): Parameters<ClearCacheParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::clear_cache(&self.repository, params)
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for RetroMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(DESCRIPTION.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ============================================================================
// EmbeddableMcp Implementation
// ============================================================================

#[async_trait]
impl EmbeddableMcp for RetroMcpServer {
    fn server_name(&self) -> &str {
        "retropie"
    }

    fn server_description(&self) -> Option<&str> {
        Some(DESCRIPTION)
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        match name {
            "get_system_info" => self.get_system_info().await.map_err(Into::into),
            "get_hardware_scan" => self.get_hardware_scan().await.map_err(Into::into),
            "get_network_interfaces" => self.get_network_interfaces().await.map_err(Into::into),

            "list_packages" => {
                let params: ListPackagesParams = serde_json::from_value(params)?;
                self.list_packages(Parameters(params)).await.map_err(Into::into)
            }

            "list_services" => {
                let params: ListServicesParams = serde_json::from_value(params)?;
                self.list_services(Parameters(params)).await.map_err(Into::into)
            }

            "list_bios_files" => self.list_bios_files().await.map_err(Into::into),

            "install_packages" => {
                let params: PackagesParams = serde_json::from_value(params)?;
                self.install_packages(Parameters(params)).await.map_err(Into::into)
            }

            "remove_packages" => {
                let params: PackagesParams = serde_json::from_value(params)?;
                self.remove_packages(Parameters(params)).await.map_err(Into::into)
            }

            "update_system" => self.update_system().await.map_err(Into::into),

            "restart_service" => {
                let params: RestartServiceParams = serde_json::from_value(params)?;
                self.restart_service(Parameters(params)).await.map_err(Into::into)
            }

            "get_cache_stats" => self.get_cache_stats().await.map_err(Into::into),

            "clear_cache" => {
                let params: ClearCacheParams = serde_json::from_value(params)?;
                self.clear_cache(Parameters(params)).await.map_err(Into::into)
            }

            _ => Err(EmbeddableError::ToolNotFound(name.to_string())),
        }
    }
}
