//! Error conversions for MCP tool handlers

use rmcp::ErrorData as McpError;

/// Conversion of foreign error types into MCP errors
pub trait IntoMcpError {
    fn into_mcp_error(self) -> McpError;
}

impl IntoMcpError for serde_json::Error {
    fn into_mcp_error(self) -> McpError {
        McpError::internal_error(format!("JSON error: {}", self), None)
    }
}

/// Invalid-params error, for arguments rejected before any work is done
pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}
