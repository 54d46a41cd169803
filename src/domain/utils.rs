//! Result formatting shared by the bundled tools

use rust_mcp_sdk::schema::{CallToolResult, ContentBlock, TextContent};

/// Renders an `f64` with ECMAScript `Number#toString` rules: integral values
/// carry no fractional part, negative zero collapses to `0`, infinities are
/// spelled out and magnitudes outside `[1e-7, 1e21)` use exponent notation.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    ryu_js::Buffer::new().format(value).to_string()
}

pub fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(text.into(), None, None))],
        is_error: None,
        meta: None,
        structured_content: None,
    }
}
