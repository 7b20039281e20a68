//! Layout plan types produced by the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BoundingBox, FontMapping};

/// Remediation strategy chosen for a block, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Content fits the original box at the original size
    Unchanged,
    /// Content fits the original box at a reduced size
    FontShrink,
    /// Content fits at the original size in an enlarged box
    BoxGrowth,
    /// Nothing fits; content is kept and overflows
    OverflowAccept,
}

impl Strategy {
    /// All strategies in attempt order.
    pub const ALL: [Strategy; 4] = [
        Strategy::Unchanged,
        Strategy::FontShrink,
        Strategy::BoxGrowth,
        Strategy::OverflowAccept,
    ];

    /// Kebab-case name, as used in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Unchanged => "unchanged",
            Strategy::FontShrink => "font-shrink",
            Strategy::BoxGrowth => "box-growth",
            Strategy::OverflowAccept => "overflow-accept",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position where a new line starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBreak {
    /// Index of the run within the block
    pub run: usize,
    /// Byte offset into that run's effective text
    pub offset: usize,
}

impl LineBreak {
    /// Create a new line break.
    pub fn new(run: usize, offset: usize) -> Self {
        Self { run, offset }
    }
}

/// The decision taken for one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentPlan {
    /// Id of the block this plan belongs to
    pub block_id: String,

    /// Chosen strategy
    pub strategy: Strategy,

    /// Font-size multiplier applied to every run (1.0 = unchanged)
    pub scale: f32,

    /// Resulting box (differs from the original only after growth)
    pub bbox: BoundingBox,

    /// Where each line after the first begins
    pub line_breaks: Vec<LineBreak>,

    /// Height of the laid-out content at `scale`
    pub measured_height: f32,

    /// How far content exceeds `bbox` (0 when fitted)
    pub overflow: f32,

    /// True when no strategy fully resolved the overflow
    pub residual_overflow: bool,

    /// Some text had no known script and was broken at grapheme boundaries
    #[serde(default)]
    pub degraded: bool,
}

impl AdjustmentPlan {
    /// Number of laid-out lines.
    pub fn line_count(&self) -> usize {
        if self.measured_height > 0.0 {
            self.line_breaks.len() + 1
        } else {
            0
        }
    }

    /// Check if the plan changes anything about the block.
    pub fn is_identity(&self) -> bool {
        self.strategy == Strategy::Unchanged
    }
}

/// Plans for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePlan {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width, copied from the input
    pub width: f32,

    /// Page height, copied from the input
    pub height: f32,

    /// One plan per block, in processing order
    pub blocks: Vec<AdjustmentPlan>,
}

impl PagePlan {
    /// Get the plan for a block.
    pub fn get(&self, block_id: &str) -> Option<&AdjustmentPlan> {
        self.blocks.iter().find(|p| p.block_id == block_id)
    }
}

/// Why a block is still overflowing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "kebab-case")]
pub enum ConflictReason {
    /// Growth was clamped to avoid another block
    NeighborCollision {
        /// The block that limited growth
        neighbor: String,
    },
    /// Growth reached the page boundary
    PageBoundary,
    /// The block kind may not grow
    GrowthDisallowed,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::NeighborCollision { neighbor } => {
                write!(f, "growth clamped by neighbor {}", neighbor)
            }
            ConflictReason::PageBoundary => f.write_str("growth reached the page boundary"),
            ConflictReason::GrowthDisallowed => f.write_str("block kind may not grow"),
        }
    }
}

/// A block left in overflow, for the caller to surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedConflict {
    /// Page number (1-indexed)
    pub page: u32,

    /// Block id
    pub block_id: String,

    /// Reason code
    pub reason: ConflictReason,

    /// Remaining overflow in document units
    pub overflow: f32,
}

/// The complete output of one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    /// Completed pages, in document order
    pub pages: Vec<PagePlan>,

    /// Blocks that still overflow
    pub unresolved: Vec<UnresolvedConflict>,

    /// Font substitutions used, ordered by missing font id
    pub font_mappings: Vec<FontMapping>,

    /// True when the job was cancelled before every page completed
    pub cancelled: bool,
}

impl LayoutPlan {
    /// Get a page plan by number.
    pub fn get_page(&self, number: u32) -> Option<&PagePlan> {
        self.pages.iter().find(|p| p.number == number)
    }

    /// Iterate over every block plan.
    pub fn block_plans(&self) -> impl Iterator<Item = &AdjustmentPlan> {
        self.pages.iter().flat_map(|p| p.blocks.iter())
    }

    /// Check if every block fitted.
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }
}
