//! RetroPie MCP Server
//!
//! Telemetry, hardware health and package/service management for a
//! RetroPie host over SSH.
//!
//! # Usage
//!
//! Run directly: `RETROPIE_HOST=retropie.local retro-mcp`
//!
//! Connection settings come from `retro-mcp.toml` (or `RETRO_CONFIG_PATH`)
//! and the `RETROPIE_HOST`, `RETROPIE_USERNAME`, `RETROPIE_PORT` and
//! `RETROPIE_KEY_PATH` environment variables.

use retro_mcp::RetroMcpServer;

mcp_common::serve_stdio!(RetroMcpServer::from_env, "retro_mcp");
