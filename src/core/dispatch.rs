//! The single translation boundary between taxonomy errors and the strings
//! returned to the MCP client.
//!
//! Every tool handler wraps its body in [`dispatch`]: the returned
//! `CallToolResult` always carries exactly one text content, and no error of
//! any kind crosses this boundary as a protocol error.

use std::future::Future;

use rmcp::model::{CallToolResult, Content};

use crate::core::error::AdoError;

/// Render a taxonomy error as its boundary string.
///
/// `action` is a short static phrase ("getting work item") used only for
/// unclassified failures; taxonomy kinds already carry a self-describing
/// message.
pub fn error_string(action: &str, err: &AdoError) -> String {
    match err {
        AdoError::Configuration(_) | AdoError::Client(_) | AdoError::Validation(_) => {
            format!("Error: {err}")
        }
        AdoError::Unclassified(_) => format!("Error {action}: {err}"),
    }
}

/// Run one tool invocation to completion and return its text result.
pub async fn dispatch<F>(action: &str, op: F) -> CallToolResult
where
    F: Future<Output = Result<String, AdoError>>,
{
    let text = match op.await {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(action, error = %err, "tool call failed");
            error_string(action, &err)
        }
    };
    CallToolResult::success(vec![Content::text(text)])
}
