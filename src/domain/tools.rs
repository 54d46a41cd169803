//! Arithmetic tools exposed via Model Context Protocol
//!
//! Each tool's argument struct doubles as its MCP descriptor: the `mcp_tool`
//! attribute derives the advertised input schema from the same fields the
//! handler deserializes.

use rust_mcp_sdk::{
    macros,
    schema::{CallToolResult, Tool},
};
use serde::{Deserialize, Serialize};

use crate::domain::registry::{RegistryError, ToolHandler, ToolRegistry};
use crate::domain::utils::{format_number, text_result};
use crate::errors::AppError;

#[macros::mcp_tool(name = "add", description = "Add two numbers")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct AddTool {
    pub a: f64,
    pub b: f64,
}

#[macros::mcp_tool(name = "subtract", description = "Subtract two numbers")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct SubtractTool {
    pub a: f64,
    pub b: f64,
}

pub struct Add;

impl ToolHandler for Add {
    type Input = AddTool;

    fn descriptor(&self) -> Tool {
        AddTool::tool()
    }

    fn call(&self, input: AddTool) -> Result<CallToolResult, AppError> {
        Ok(text_result(format_number(input.a + input.b)))
    }
}

pub struct Subtract;

impl ToolHandler for Subtract {
    type Input = SubtractTool;

    fn descriptor(&self) -> Tool {
        SubtractTool::tool()
    }

    fn call(&self, input: SubtractTool) -> Result<CallToolResult, AppError> {
        Ok(text_result(format_number(input.a - input.b)))
    }
}

/// Registry holding the bundled tools, in the order `tools/list` reports them.
pub fn default_registry() -> Result<ToolRegistry, RegistryError> {
    Ok(ToolRegistry::builder()
        .register(Add)?
        .register(Subtract)?
        .build())
}
