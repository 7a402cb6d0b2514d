//! JSON reading and pretty rendering.

use confdiff_types::ConfigValue;

use crate::error::{FormatError, FormatResult};

/// Parse a JSON document. Object keys keep their document order.
pub fn parse(content: &str) -> FormatResult<ConfigValue> {
    Ok(serde_json::from_str(content)?)
}

/// Render with 2-space indentation.
pub fn render(value: &ConfigValue) -> FormatResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| FormatError::Serialize(e.to_string()))
}

/// How a scalar appears in rendered output. `None` for composites.
pub fn scalar_literal(value: &ConfigValue) -> Option<String> {
    if value.is_composite() {
        return None;
    }
    serde_json::to_string(value).ok()
}

/// A key as it appears quoted in front of its `:`.
pub fn key_literal(key: &str) -> String {
    serde_json::to_string(key).unwrap_or_else(|_| format!("\"{key}\""))
}
