//! Rendering module for layout plans and their summaries.

mod json;
mod stats;

pub use json::{to_json, to_json_value, JsonFormat};
pub use stats::PlanStats;
