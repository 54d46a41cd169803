//! JSON-RPC 2.0 envelope representations
//!
//! Inbound requests are decoded into [`RpcRequest`]; every reply the server
//! writes is an [`RpcResponse`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    /// Absent (or `null`) for notifications.
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl RpcRequest {
    /// Decodes a raw POST body into a request envelope.
    pub fn from_slice(body: &[u8]) -> Result<Self, AppError> {
        let payload: Value =
            serde_json::from_slice(body).map_err(|err| AppError::Parse(err.to_string()))?;
        if !payload.is_object() {
            return Err(AppError::malformed("request must be a JSON object"));
        }

        let request: RpcRequest = serde_json::from_value(payload)
            .map_err(|err| AppError::malformed(err.to_string()))?;
        if request.jsonrpc != JSONRPC_VERSION {
            return Err(AppError::malformed("jsonrpc must be \"2.0\""));
        }
        if request.method.trim().is_empty() {
            return Err(AppError::malformed("method must not be empty"));
        }

        Ok(request)
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Success envelope. A `None` result is left out of the body entirely,
    /// which is how unknown methods are answered in lenient mode.
    pub fn success(id: Value, result: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
            error: None,
        }
    }

    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: Value::Null,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_without_id_is_notification() {
        let request =
            RpcRequest::from_slice(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .expect("valid request");
        assert!(request.is_notification());
        assert!(request.params.is_none());
    }

    #[test]
    fn string_ids_are_preserved() {
        let request = RpcRequest::from_slice(br#"{"jsonrpc":"2.0","id":"abc","method":"ping"}"#)
            .expect("valid request");
        assert_eq!(request.id, Some(json!("abc")));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let error = RpcRequest::from_slice(b"{").expect_err("parse error");
        assert!(matches!(error, AppError::Parse(_)));
    }

    #[test]
    fn wrong_version_is_malformed() {
        let error = RpcRequest::from_slice(br#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#)
            .expect_err("malformed");
        assert!(matches!(error, AppError::MalformedRequest(_)));
    }

    #[test]
    fn batch_payloads_are_rejected() {
        let error = RpcRequest::from_slice(br#"[{"jsonrpc":"2.0","id":1,"method":"ping"}]"#)
            .expect_err("malformed");
        assert!(matches!(error, AppError::MalformedRequest(_)));
    }

    #[test]
    fn missing_method_is_malformed() {
        let error =
            RpcRequest::from_slice(br#"{"jsonrpc":"2.0","id":1}"#).expect_err("malformed");
        assert!(matches!(error, AppError::MalformedRequest(_)));
    }

    #[test]
    fn empty_result_is_omitted_from_body() {
        let response = RpcResponse::success(json!(7), None);
        assert_eq!(
            serde_json::to_value(response).expect("serialize"),
            json!({"jsonrpc": "2.0", "id": 7})
        );
    }

    #[test]
    fn failure_carries_null_id() {
        let response = RpcResponse::failure(INTERNAL_ERROR, "Tool not found: nope");
        assert_eq!(
            serde_json::to_value(response).expect("serialize"),
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": {"code": -32603, "message": "Tool not found: nope"}
            })
        );
    }
}
