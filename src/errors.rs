use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::config::ErrorCodeMode;
use crate::mcp::rpc::{
    RpcResponse, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid request: {0}")]
    MalformedRequest(String),
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Tool not found: {name}")]
    ToolNotFound { name: String },
    #[error("Invalid arguments for tool {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
    #[error("Tool {tool} timed out after {timeout_ms}ms")]
    ToolTimeout { tool: String, timeout_ms: u128 },
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRequest(reason.into())
    }

    pub fn invalid_params(reason: impl Into<String>) -> Self {
        Self::InvalidParams(reason.into())
    }

    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// JSON-RPC error code reported for this failure.
    pub fn rpc_code(&self, mode: ErrorCodeMode) -> i64 {
        match mode {
            ErrorCodeMode::Lenient => INTERNAL_ERROR,
            ErrorCodeMode::Strict => match self {
                Self::Parse(_) => PARSE_ERROR,
                Self::MalformedRequest(_) => INVALID_REQUEST,
                Self::MethodNotFound(_) | Self::ToolNotFound { .. } => METHOD_NOT_FOUND,
                Self::InvalidParams(_) | Self::InvalidArguments { .. } => INVALID_PARAMS,
                Self::ToolTimeout { .. } | Self::Internal(_) => INTERNAL_ERROR,
            },
        }
    }

    /// Renders the failure as the single JSON-RPC error envelope clients see.
    ///
    /// The request id is never echoed here: the body may not have parsed far
    /// enough to recover it.
    pub fn into_rpc_response(self, mode: ErrorCodeMode) -> Response {
        match &self {
            Self::Internal(_) | Self::ToolTimeout { .. } => {
                tracing::error!(error = %self, "message handling failed with internal error");
            }
            _ => tracing::warn!(error = %self, "message handling failed"),
        }

        let code = self.rpc_code(mode);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RpcResponse::failure(code, self.to_string())),
        )
            .into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("serialization failed: {err}"))
    }
}
