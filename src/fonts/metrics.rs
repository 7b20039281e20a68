//! Font metrics lookup.

use crate::error::{Error, Result};
use crate::model::{FontCatalog, FontId, FontMetrics};

/// Resolves a font id to its metrics table.
///
/// Implementations must be pure lookups: the same id always yields the same
/// table for the lifetime of a job.
pub trait MetricsProvider: Send + Sync {
    /// Get the metrics of a usable font.
    ///
    /// Fails with [`Error::FontNotFound`] when the font is unknown, marked
    /// unavailable, or has no metrics table.
    fn metrics(&self, id: &FontId) -> Result<&FontMetrics>;
}

impl MetricsProvider for FontCatalog {
    fn metrics(&self, id: &FontId) -> Result<&FontMetrics> {
        self.get(id)
            .filter(|font| font.available)
            .and_then(|font| font.metrics.as_ref())
            .ok_or_else(|| Error::FontNotFound(id.to_string()))
    }
}
