//! Data model for layout reconciliation.
//!
//! Documents, pages, blocks, runs and the font catalog are read-only inputs;
//! the plan types are the engine's output. Everything here is plain data that
//! serializes to JSON so collaborators on either side can exchange it.

mod document;
mod font;
mod geometry;
mod page;
mod plan;
mod run;

pub use document::Document;
pub use font::{
    Font, FontCatalog, FontId, FontMapping, FontMetrics, FontStyle, LicenseClass, ScoreBreakdown,
};
pub use geometry::{BoundingBox, EPSILON};
pub use page::{Block, BlockKind, Page};
pub use plan::{
    AdjustmentPlan, ConflictReason, LayoutPlan, LineBreak, PagePlan, Strategy,
    UnresolvedConflict,
};
pub use run::{TextRun, TextStyle};
