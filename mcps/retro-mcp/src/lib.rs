//! RetroPie MCP Library
//!
//! Cached system telemetry and package/service management for a RetroPie
//! host reached over SSH.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use retro_mcp::{RetroConfig, SshClient, TelemetryCache, TelemetryRepository};
//!
//! let config = RetroConfig::load()?;
//! let cache = TelemetryCache::with_ttls(config.cache);
//! let repo = TelemetryRepository::new(Arc::new(SshClient::new(config.connection)), cache);
//! let info = repo.get_system_info().await;
//! ```
//!
//! The `test-support` feature exports `ScriptedClient`, an in-memory
//! [`RemoteCommandClient`] that answers from a fixed table.
//!
//! # Usage as Binary
//!
//! Run directly: `RETROPIE_HOST=retropie.local retro-mcp`
//!
//! Or configure in `.mcp.json`:
//! ```json
//! { "mcpServers": { "retropie": { "command": "./retro-mcp", "env": { "RETROPIE_HOST": "retropie.local" } } } }
//! ```

pub mod cache;
pub mod config;
pub mod handlers;
pub mod params;
pub mod parse;
pub mod remote;
pub mod repository;
pub mod server;
pub mod types;

// Re-export main server type
pub use server::RetroMcpServer;

pub use cache::{CacheStats, CacheTtls, Lookup, Resource, TelemetryCache, TtlCache};
pub use config::{ConfigError, RetroConfig};
pub use remote::{RemoteCommandClient, SshClient, TransportError};
#[cfg(any(test, feature = "test-support"))]
pub use remote::{RecordedCall, ScriptedClient};
pub use repository::{MutationError, TargetBreakdown, TelemetryRepository};

// Re-export EmbeddableMcp trait for in-process usage
pub use mcp_common::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
