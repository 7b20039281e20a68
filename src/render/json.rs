//! JSON rendering for layout plans.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::LayoutPlan;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a layout plan to JSON.
pub fn to_json(plan: &LayoutPlan, format: JsonFormat) -> Result<String> {
    to_json_value(plan, format)
}

/// Convert any serializable report (stats, expansion report) to JSON.
pub fn to_json_value<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
