//! Summary statistics for a layout plan.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{LayoutPlan, Strategy};

/// Counts collected from a finished plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanStats {
    /// Number of completed pages
    pub page_count: u32,

    /// Number of planned blocks
    pub block_count: u32,

    /// Blocks kept as they were
    pub unchanged_count: u32,

    /// Blocks fitted by shrinking the font
    pub shrink_count: u32,

    /// Blocks fitted by growing the box
    pub growth_count: u32,

    /// Blocks left overflowing
    pub overflow_count: u32,

    /// Conflicts reported for the UI
    pub unresolved_count: u32,

    /// Font substitutions in use
    pub substitution_count: u32,

    /// Substitutions below the reliability cutoff
    pub unreliable_substitution_count: u32,

    /// Blocks whose line breaks fell back to grapheme boundaries
    pub degraded_count: u32,

    /// Smallest font scale in the plan (1.0 when nothing shrank)
    pub smallest_scale: f32,

    /// Whether the job was cancelled
    pub cancelled: bool,
}

impl PlanStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self {
            smallest_scale: 1.0,
            ..Self::default()
        }
    }

    /// Collect statistics from a plan.
    pub fn from_plan(plan: &LayoutPlan) -> Self {
        let mut stats = Self::new();
        stats.page_count = plan.pages.len() as u32;

        for block in plan.block_plans() {
            stats.add_strategy(block.strategy);
            stats.smallest_scale = stats.smallest_scale.min(block.scale);
            if block.degraded {
                stats.degraded_count += 1;
            }
        }

        stats.unresolved_count = plan.unresolved.len() as u32;
        stats.substitution_count = plan.font_mappings.len() as u32;
        stats.unreliable_substitution_count =
            plan.font_mappings.iter().filter(|m| !m.reliable).count() as u32;
        stats.cancelled = plan.cancelled;
        stats
    }

    /// Count one block plan.
    pub fn add_strategy(&mut self, strategy: Strategy) {
        self.block_count += 1;
        match strategy {
            Strategy::Unchanged => self.unchanged_count += 1,
            Strategy::FontShrink => self.shrink_count += 1,
            Strategy::BoxGrowth => self.growth_count += 1,
            Strategy::OverflowAccept => self.overflow_count += 1,
        }
    }

    /// Number of blocks with the given strategy.
    pub fn count(&self, strategy: Strategy) -> u32 {
        match strategy {
            Strategy::Unchanged => self.unchanged_count,
            Strategy::FontShrink => self.shrink_count,
            Strategy::BoxGrowth => self.growth_count,
            Strategy::OverflowAccept => self.overflow_count,
        }
    }

    /// Share of blocks that fit without residual overflow.
    pub fn resolved_ratio(&self) -> f32 {
        if self.block_count == 0 {
            return 1.0;
        }
        (self.block_count - self.overflow_count) as f32 / self.block_count as f32
    }
}

impl fmt::Display for PlanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pages:          {}", self.page_count)?;
        writeln!(f, "Blocks:         {}", self.block_count)?;
        for strategy in Strategy::ALL {
            writeln!(f, "  {:<14}{}", strategy.as_str(), self.count(strategy))?;
        }
        writeln!(f, "Unresolved:     {}", self.unresolved_count)?;
        writeln!(
            f,
            "Substitutions:  {} ({} unreliable)",
            self.substitution_count, self.unreliable_substitution_count
        )?;
        if self.degraded_count > 0 {
            writeln!(f, "Degraded:       {}", self.degraded_count)?;
        }
        write!(f, "Smallest scale: {:.3}", self.smallest_scale)?;
        if self.cancelled {
            write!(f, "\n(cancelled before every page completed)")?;
        }
        Ok(())
    }
}
