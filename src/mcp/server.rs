//! The central Model Context Protocol engine
//!
//! Decodes JSON-RPC envelopes, routes them over the closed set of supported
//! methods, and builds the result payloads for capability negotiation
//! (`initialize`), tool discovery and tool invocation.

use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, ListToolsResult, ProtocolVersion, ServerCapabilities,
    ServerCapabilitiesTools,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::config::ErrorCodeMode;
use crate::errors::AppError;
use crate::mcp::rpc::{RpcRequest, RpcResponse};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    Initialized,
    ToolsList,
    ToolsCall,
    Ping,
    /// Anything else; tolerated so newer clients keep working.
    Unknown,
}

impl Method {
    pub fn parse(name: &str) -> Self {
        match name {
            "initialize" => Self::Initialize,
            "notifications/initialized" => Self::Initialized,
            "tools/list" => Self::ToolsList,
            "tools/call" => Self::ToolsCall,
            "ping" => Self::Ping,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Reply(RpcResponse),
    /// Notification accepted; nothing is written back.
    Acknowledged,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

pub async fn handle_message(
    state: &AppState,
    body: &[u8],
    session_id: Option<&str>,
) -> Result<Dispatch, AppError> {
    let request = RpcRequest::from_slice(body)?;
    let method = Method::parse(&request.method);
    let session_id = session_id.unwrap_or("-");

    if request.is_notification() || method == Method::Initialized {
        info!(
            method = %request.method,
            session_id = %session_id,
            outcome = "acknowledged",
            "mcp action audited"
        );
        return Ok(Dispatch::Acknowledged);
    }

    let RpcRequest {
        id,
        method: method_name,
        params,
        ..
    } = request;
    let outcome = dispatch(state, method, &method_name, params).await;

    info!(
        method = %method_name,
        session_id = %session_id,
        outcome = if outcome.is_ok() { "success" } else { "failure" },
        "mcp action audited"
    );

    Ok(Dispatch::Reply(RpcResponse::success(
        id.unwrap_or(Value::Null),
        outcome?,
    )))
}

async fn dispatch(
    state: &AppState,
    method: Method,
    method_name: &str,
    params: Option<Value>,
) -> Result<Option<Value>, AppError> {
    match method {
        Method::Initialize => initialize_result().map(Some),
        Method::ToolsList => list_tools(state).map(Some),
        Method::ToolsCall => call_tool(state, params).await.map(Some),
        Method::Ping => Ok(Some(json!({}))),
        Method::Initialized => Ok(None),
        Method::Unknown => match state.error_codes {
            ErrorCodeMode::Lenient => Ok(None),
            ErrorCodeMode::Strict => Err(AppError::MethodNotFound(method_name.to_string())),
        },
    }
}

pub fn initialize_result() -> Result<Value, AppError> {
    let initialize_result = InitializeResult {
        server_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: None,
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            resources: None,
            prompts: None,
            ..Default::default()
        },
        protocol_version: ProtocolVersion::V2024_11_05.into(),
        instructions: None,
        meta: None,
    };

    Ok(serde_json::to_value(initialize_result)?)
}

fn list_tools(state: &AppState) -> Result<Value, AppError> {
    Ok(serde_json::to_value(ListToolsResult {
        meta: None,
        next_cursor: None,
        tools: state.registry.describe(),
    })?)
}

async fn call_tool(state: &AppState, params: Option<Value>) -> Result<Value, AppError> {
    let params = params.ok_or_else(|| AppError::invalid_params("tools/call requires params"))?;
    let tool_call: ToolCallParams = serde_json::from_value(params)
        .map_err(|err| AppError::invalid_params(format!("invalid tools/call params: {err}")))?;

    let result = state
        .registry
        .invoke(&tool_call.name, tool_call.arguments, state.tool_timeout)
        .await?;

    Ok(serde_json::to_value(result)?)
}
