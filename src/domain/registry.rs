//! Immutable tool registry
//!
//! Tools are registered once through [`ToolRegistryBuilder`] and the finished
//! [`ToolRegistry`] is shared read-only across requests. Each entry keeps the
//! advertised [`Tool`] descriptor together with a validator compiled from that
//! same descriptor's input schema, so what `tools/list` reports is exactly
//! what `tools/call` enforces.

use std::{collections::HashMap, sync::Arc, time::Duration};

use jsonschema::Validator;
use rust_mcp_sdk::schema::{CallToolResult, Tool};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;

/// A named operation with a typed input.
///
/// `Input` is only ever built from arguments that already passed the schema
/// in [`ToolHandler::descriptor`].
pub trait ToolHandler: Send + Sync + 'static {
    type Input: DeserializeOwned + Send + 'static;

    fn descriptor(&self) -> Tool;

    fn call(&self, input: Self::Input) -> Result<CallToolResult, AppError>;
}

type ErasedHandler = Arc<dyn Fn(Value) -> Result<CallToolResult, AppError> + Send + Sync>;

struct RegisteredTool {
    tool: Tool,
    validator: Validator,
    handler: ErasedHandler,
}

impl RegisteredTool {
    fn validate(&self, arguments: &Value) -> Result<(), AppError> {
        if self.validator.is_valid(arguments) {
            return Ok(());
        }

        let message = self
            .validator
            .iter_errors(arguments)
            .map(|error| error.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(AppError::invalid_arguments(&self.tool.name, message))
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("tool {0} is registered more than once")]
    DuplicateTool(String),
    #[error("tool {name} has an invalid input schema: {message}")]
    InvalidSchema { name: String, message: String },
}

#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H: ToolHandler>(mut self, handler: H) -> Result<Self, RegistryError> {
        let tool = handler.descriptor();
        let name = tool.name.clone();
        if self.tools.iter().any(|entry| entry.tool.name == name) {
            return Err(RegistryError::DuplicateTool(name));
        }

        let schema = serde_json::to_value(&tool.input_schema).map_err(|err| {
            RegistryError::InvalidSchema {
                name: name.clone(),
                message: err.to_string(),
            }
        })?;
        let validator =
            jsonschema::validator_for(&schema).map_err(|err| RegistryError::InvalidSchema {
                name: name.clone(),
                message: err.to_string(),
            })?;

        let handler = Arc::new(handler);
        let handler: ErasedHandler = Arc::new(move |arguments: Value| {
            let input: H::Input = serde_json::from_value(arguments)
                .map_err(|err| AppError::invalid_arguments(&name, err.to_string()))?;
            handler.call(input)
        });

        self.tools.push(RegisteredTool {
            tool,
            validator,
            handler,
        });
        Ok(self)
    }

    pub fn build(self) -> ToolRegistry {
        let index = self
            .tools
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.tool.name.clone(), position))
            .collect();

        ToolRegistry {
            tools: self.tools,
            index,
        }
    }
}

pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    /// Descriptors in registration order.
    pub fn describe(&self) -> Vec<Tool> {
        self.tools.iter().map(|entry| entry.tool.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolves `name`, validates `arguments` against its schema, then runs
    /// the handler on the blocking pool bounded by `timeout`.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Value,
        timeout: Duration,
    ) -> Result<CallToolResult, AppError> {
        let entry = self
            .index
            .get(name)
            .and_then(|position| self.tools.get(*position))
            .ok_or_else(|| AppError::tool_not_found(name))?;

        entry.validate(&arguments)?;
        debug!(tool = %name, "arguments validated");

        let handler = Arc::clone(&entry.handler);
        let task = tokio::task::spawn_blocking(move || handler(arguments));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(AppError::internal(format!(
                "tool {name} failed to complete: {join_error}"
            ))),
            Err(_) => Err(AppError::ToolTimeout {
                tool: name.to_string(),
                timeout_ms: timeout.as_millis(),
            }),
        }
    }
}
