//! In-process tool execution
//!
//! [`EmbeddableMcp`] lets a host (or a test) list and call a server's tools
//! directly, without a stdio transport in between.
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//!
//! let tools = server.list_tools();
//! let result = server.call_tool("get_system_info", serde_json::json!({})).await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;

/// Errors from in-process tool calls
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// The tool handler returned an MCP error
    #[error("mcp error: {0}")]
    McpError(String),
}

impl From<rmcp::ErrorData> for EmbeddableError {
    fn from(err: rmcp::ErrorData) -> Self {
        EmbeddableError::McpError(err.message.to_string())
    }
}

pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// A tool server that can be driven in-process
///
/// Servers built on rmcp's `#[tool_router]` implement `list_tools` by
/// delegating to `tool_router.list_all()` and `call_tool` by matching on
/// the tool name and deserializing `params` into the tool's parameter type.
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Name used in MCP configuration files
    fn server_name(&self) -> &str;

    fn list_tools(&self) -> Vec<Tool>;

    /// Call a tool by name with a JSON object of parameters
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;

    fn server_description(&self) -> Option<&str> {
        None
    }
}
