//! `CallToolResult` builders

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;

use crate::error::IntoMcpError;

fn to_pretty_json<T: Serialize>(data: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(data).map_err(IntoMcpError::into_mcp_error)
}

/// Successful response carrying pretty-printed JSON
///
/// ```rust,ignore
/// fn get_system_info(&self) -> Result<CallToolResult, McpError> {
///     json_success(&info)
/// }
/// ```
pub fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(to_pretty_json(data)?)]))
}

/// Tool-level failure carrying pretty-printed JSON
///
/// Unlike returning `Err(McpError)`, the caller receives the full payload
/// (exit code, stderr, per-target breakdown) with `is_error` set, so it can
/// tell one kind of failure from another.
pub fn json_failure<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(to_pretty_json(data)?)]))
}

/// Successful plain-text response
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}
