//! MCP Common - Shared plumbing for MCP servers
//!
//! Everything an MCP server binary needs around its tools:
//!
//! - **Initialization**: [`init_tracing`] and the `serve_stdio!` macro
//! - **Results**: helpers that turn serializable data into `CallToolResult`
//! - **Errors**: conversions into `rmcp::ErrorData`
//! - **Embeddable**: [`EmbeddableMcp`] for calling tools in-process
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{serve_stdio, json_success};
//!
//! // In main.rs
//! serve_stdio!(MyServer::from_env, "my_mcp");
//!
//! // In a tool
//! fn my_tool(&self) -> Result<CallToolResult, McpError> {
//!     json_success(&self.collect())
//! }
//! ```

pub mod embeddable;
pub mod error;
pub mod init;
pub mod result;

pub use embeddable::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use error::{invalid_params, IntoMcpError};
pub use init::init_tracing;
pub use result::{json_failure, json_success, text_success};

pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

pub use async_trait::async_trait;
