//! Per-block fit solver.
//!
//! Strategies are tried in a fixed order and the first one that fits wins:
//! keep everything as is, shrink the font, grow the box, and finally accept
//! the overflow. The solver never fails; it always returns a plan.

use crate::measure::{Measurement, PreparedText};
use crate::model::{AdjustmentPlan, Block, BoundingBox, ConflictReason, Page, Strategy, EPSILON};

use super::LayoutOptions;

/// Scale search stops once the interval is this narrow.
const SCALE_PRECISION: f32 = 0.005;

/// Width search stops once the interval is this narrow.
const WIDTH_PRECISION: f32 = 0.5;

/// How far a block may grow, and what set each bound.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthLimit {
    /// Lowest bottom edge the box may reach
    pub max_bottom: f32,
    /// Rightmost right edge the box may reach
    pub max_right: f32,
    /// Block whose top edge set `max_bottom`, if any
    pub bottom_by: Option<String>,
    /// Block whose left edge set `max_right`, if any
    pub right_by: Option<String>,
}

impl GrowthLimit {
    /// Page boundary inset by `margin`, never inside the original box.
    pub fn page(page: &Page, margin: f32, bbox: &BoundingBox) -> Self {
        Self {
            max_bottom: (page.height - margin).max(bbox.bottom()),
            max_right: (page.width - margin).max(bbox.right()),
            bottom_by: None,
            right_by: None,
        }
    }

    /// Lower the bottom bound to `edge`, set by `neighbor`. Returns whether
    /// the bound moved.
    pub fn clamp_bottom(&mut self, edge: f32, neighbor: &str, bbox: &BoundingBox) -> bool {
        let edge = edge.max(bbox.bottom());
        if edge >= self.max_bottom {
            return false;
        }
        self.max_bottom = edge;
        self.bottom_by = Some(neighbor.to_string());
        true
    }

    /// Lower the right bound to `edge`, set by `neighbor`. Returns whether
    /// the bound moved.
    pub fn clamp_right(&mut self, edge: f32, neighbor: &str, bbox: &BoundingBox) -> bool {
        let edge = edge.max(bbox.right());
        if edge >= self.max_right {
            return false;
        }
        self.max_right = edge;
        self.right_by = Some(neighbor.to_string());
        true
    }

    /// Why growth stopped at this limit.
    fn reason(&self) -> ConflictReason {
        match self.bottom_by.as_ref().or(self.right_by.as_ref()) {
            Some(neighbor) => ConflictReason::NeighborCollision {
                neighbor: neighbor.clone(),
            },
            None => ConflictReason::PageBoundary,
        }
    }
}

/// A plan and, for overflow-accept, the reason nothing fitted.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub plan: AdjustmentPlan,
    pub conflict: Option<ConflictReason>,
}

/// Chooses a strategy for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSolver {
    min_scale: f32,
    tolerance: f32,
}

impl FitSolver {
    /// Create a solver.
    pub fn new(min_scale: f32, tolerance: f32) -> Self {
        Self {
            min_scale,
            tolerance,
        }
    }

    /// Create a solver from layout options.
    pub fn from_options(options: &LayoutOptions) -> Self {
        Self::new(options.min_scale, options.fit_tolerance)
    }

    fn fits(&self, m: &Measurement, bbox: &BoundingBox) -> bool {
        m.fits(bbox.width, bbox.height, self.tolerance)
    }

    /// Plan for a block whose text and fonts are untouched.
    pub fn unchanged(&self, block: &Block, text: &PreparedText) -> AdjustmentPlan {
        let m = text.wrap(1.0, block.bbox.width);
        plan(block, Strategy::Unchanged, 1.0, block.bbox, m, false)
    }

    /// Fit `text` into `block`, growing up to `limit` when growth is allowed
    /// (`None` forbids growth).
    pub fn solve(
        &self,
        block: &Block,
        text: &PreparedText,
        limit: Option<&GrowthLimit>,
    ) -> FitOutcome {
        let bbox = block.bbox;

        let full = text.wrap(1.0, bbox.width);
        if self.fits(&full, &bbox) {
            return fitted(plan(block, Strategy::Unchanged, 1.0, bbox, full, false));
        }

        let smallest = text.wrap(self.min_scale, bbox.width);
        if self.fits(&smallest, &bbox) {
            let (scale, m) = self.search_scale(text, &bbox, smallest);
            log::debug!("Block {}: shrink to scale {:.3}", block.id, scale);
            return fitted(plan(block, Strategy::FontShrink, scale, bbox, m, false));
        }

        let Some(limit) = limit else {
            log::debug!("Block {}: overflow, growth not allowed", block.id);
            return self.overflow(block, text, bbox, ConflictReason::GrowthDisallowed);
        };

        match self.grow(text, &bbox, full, limit) {
            Ok((grown, m)) => {
                log::debug!(
                    "Block {}: grow to {:.1}x{:.1}",
                    block.id,
                    grown.width,
                    grown.height
                );
                fitted(plan(block, Strategy::BoxGrowth, 1.0, grown, m, false))
            }
            Err(partial) => {
                log::debug!("Block {}: overflow after growth to limit", block.id);
                self.overflow(block, text, partial, limit.reason())
            }
        }
    }

    /// Largest scale in [min_scale, 1.0] that fits, to within the search
    /// precision. `lower` is the fitting measurement at `min_scale`.
    fn search_scale(
        &self,
        text: &PreparedText,
        bbox: &BoundingBox,
        lower: Measurement,
    ) -> (f32, Measurement) {
        let mut lo = self.min_scale;
        let mut hi = 1.0_f32;
        let mut best = lower;

        while hi - lo > SCALE_PRECISION {
            let mid = (lo + hi) / 2.0;
            let m = text.wrap(mid, bbox.width);
            if self.fits(&m, bbox) {
                lo = mid;
                best = m;
            } else {
                hi = mid;
            }
        }

        (lo, best)
    }

    /// Smallest enlargement at full size, vertical first. Returns the box
    /// grown to the limit when even that is not enough.
    fn grow(
        &self,
        text: &PreparedText,
        bbox: &BoundingBox,
        full: Measurement,
        limit: &GrowthLimit,
    ) -> std::result::Result<(BoundingBox, Measurement), BoundingBox> {
        let max_height = (limit.max_bottom - bbox.y).max(bbox.height);
        let max_width = (limit.max_right - bbox.x).max(bbox.width);

        if full.width <= bbox.width + EPSILON && full.height <= max_height + EPSILON {
            let grown = bbox.with_height(full.height.max(bbox.height));
            return Ok((grown, full));
        }

        let fits_width = |width: f32| {
            let m = text.wrap(1.0, width);
            let ok = m.width <= width + EPSILON && m.height <= max_height + EPSILON;
            (ok, m)
        };

        let (ok, mut best) = fits_width(max_width);
        if !ok {
            return Err(bbox.with_width(max_width).with_height(max_height));
        }

        let mut lo = bbox.width;
        let mut hi = max_width;
        while hi - lo > WIDTH_PRECISION {
            let mid = (lo + hi) / 2.0;
            let (ok, m) = fits_width(mid);
            if ok {
                hi = mid;
                best = m;
            } else {
                lo = mid;
            }
        }

        let grown = bbox.with_width(hi).with_height(best.height.max(bbox.height));
        Ok((grown, best))
    }

    /// Overflow plan at `min_scale`. A box partially grown at full size may
    /// hold the text at `min_scale`; the plan then stays at full size, where
    /// growth already failed, so the overflow it reports is real.
    fn overflow(
        &self,
        block: &Block,
        text: &PreparedText,
        bbox: BoundingBox,
        reason: ConflictReason,
    ) -> FitOutcome {
        let mut scale = self.min_scale;
        let mut m = text.wrap(scale, bbox.width);
        if self.fits(&m, &bbox) {
            scale = 1.0;
            m = text.wrap(scale, bbox.width);
        }
        FitOutcome {
            plan: plan(block, Strategy::OverflowAccept, scale, bbox, m, true),
            conflict: Some(reason),
        }
    }
}

fn fitted(plan: AdjustmentPlan) -> FitOutcome {
    FitOutcome {
        plan,
        conflict: None,
    }
}

fn plan(
    block: &Block,
    strategy: Strategy,
    scale: f32,
    bbox: BoundingBox,
    m: Measurement,
    residual_overflow: bool,
) -> AdjustmentPlan {
    let overflow = if strategy == Strategy::Unchanged || residual_overflow {
        (m.height - bbox.height)
            .max(m.width - bbox.width)
            .max(0.0)
    } else {
        0.0
    };
    AdjustmentPlan {
        block_id: block.id.clone(),
        strategy,
        scale,
        bbox,
        line_breaks: m.line_breaks,
        measured_height: m.height,
        overflow,
        residual_overflow,
        degraded: m.degraded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::Segment;
    use crate::model::FontMetrics;

    // 5pt per glyph and a 10pt line at size 10.
    fn metrics() -> FontMetrics {
        FontMetrics::new(1000.0, 800.0, 200.0, 0.0, 500.0)
    }

    fn words(n: usize) -> String {
        vec!["aaaa"; n].join(" ")
    }

    fn block() -> Block {
        Block::paragraph("b1", BoundingBox::new(0.0, 0.0, 100.0, 10.0))
    }

    fn limit(max_bottom: f32, max_right: f32) -> GrowthLimit {
        GrowthLimit {
            max_bottom,
            max_right,
            bottom_by: None,
            right_by: None,
        }
    }

    fn solve(text: &str, limit: Option<&GrowthLimit>) -> FitOutcome {
        let m = metrics();
        let prepared = PreparedText::new(&[Segment::new(text, &m, 10.0)]);
        FitSolver::new(0.6, 0.02).solve(&block(), &prepared, limit)
    }

    #[test]
    fn test_fits_unchanged() {
        let outcome = solve("aaaa", None);
        assert_eq!(outcome.plan.strategy, Strategy::Unchanged);
        assert_eq!(outcome.plan.scale, 1.0);
        assert!(outcome.conflict.is_none());
    }

    #[test]
    fn test_shrink_finds_largest_scale() {
        // 120pt on one line at full size; fits one line below 100/120.
        let outcome = solve(&words(5), None);
        assert_eq!(outcome.plan.strategy, Strategy::FontShrink);
        let scale = outcome.plan.scale;
        assert!(scale > 0.82 && scale <= 0.8334, "scale {}", scale);
        assert_eq!(outcome.plan.bbox, block().bbox);
        assert!(!outcome.plan.residual_overflow);
    }

    #[test]
    fn test_vertical_growth() {
        let outcome = solve(&words(20), Some(&limit(200.0, 100.0)));
        assert_eq!(outcome.plan.strategy, Strategy::BoxGrowth);
        assert_eq!(outcome.plan.scale, 1.0);
        assert!((outcome.plan.bbox.height - 50.0).abs() < 1e-3);
        assert_eq!(outcome.plan.bbox.width, 100.0);
    }

    #[test]
    fn test_horizontal_growth() {
        // No room below; one 495pt line is needed.
        let outcome = solve(&words(20), Some(&limit(10.0, 600.0)));
        assert_eq!(outcome.plan.strategy, Strategy::BoxGrowth);
        let width = outcome.plan.bbox.width;
        assert!(width >= 495.0 - 1e-3 && width <= 496.0, "width {}", width);
        assert_eq!(outcome.plan.bbox.height, 10.0);
    }

    #[test]
    fn test_growth_limit_reached() {
        let outcome = solve(&words(20), Some(&limit(20.0, 100.0)));
        assert_eq!(outcome.plan.strategy, Strategy::OverflowAccept);
        assert_eq!(outcome.plan.scale, 0.6);
        assert!((outcome.plan.bbox.height - 20.0).abs() < 1e-3);
        assert!(outcome.plan.residual_overflow);
        assert!((outcome.plan.overflow - 4.0).abs() < 1e-3);
        assert_eq!(outcome.conflict, Some(ConflictReason::PageBoundary));
    }

    #[test]
    fn test_partial_growth_reports_real_overflow() {
        // 40pt at full size in at most 30pt; 18pt would fit at 0.6.
        let outcome = solve(&words(16), Some(&limit(30.0, 100.0)));
        assert_eq!(outcome.plan.strategy, Strategy::OverflowAccept);
        assert_eq!(outcome.plan.scale, 1.0);
        assert!((outcome.plan.bbox.height - 30.0).abs() < 1e-3);
        assert!((outcome.plan.measured_height - 40.0).abs() < 1e-3);
        assert!((outcome.plan.overflow - 10.0).abs() < 1e-3);
        assert!(outcome.plan.residual_overflow);
        assert_eq!(outcome.conflict, Some(ConflictReason::PageBoundary));
    }

    #[test]
    fn test_growth_clamped_by_neighbor() {
        let mut bound = limit(200.0, 100.0);
        assert!(bound.clamp_bottom(20.0, "b2", &block().bbox));
        let outcome = solve(&words(20), Some(&bound));
        assert_eq!(outcome.plan.strategy, Strategy::OverflowAccept);
        assert_eq!(
            outcome.conflict,
            Some(ConflictReason::NeighborCollision {
                neighbor: "b2".into()
            })
        );
    }

    #[test]
    fn test_growth_disallowed() {
        let outcome = solve(&words(20), None);
        assert_eq!(outcome.plan.strategy, Strategy::OverflowAccept);
        assert_eq!(outcome.plan.bbox, block().bbox);
        assert_eq!(outcome.conflict, Some(ConflictReason::GrowthDisallowed));
        // Content is never dropped: every line is still laid out.
        assert_eq!(outcome.plan.line_count(), 4);
    }

    #[test]
    fn test_clamp_never_inside_original() {
        let bbox = BoundingBox::new(0.0, 50.0, 100.0, 10.0);
        let mut bound = limit(200.0, 300.0);
        bound.clamp_bottom(40.0, "above", &bbox);
        assert_eq!(bound.max_bottom, 60.0);
        bound.clamp_right(80.0, "left", &bbox);
        assert_eq!(bound.max_right, 100.0);
        assert!(!bound.clamp_bottom(90.0, "below", &bbox));
    }
}
