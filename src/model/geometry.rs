//! Geometry primitives shared by the model and the solver.

use serde::{Deserialize, Serialize};

/// Fixed comparison epsilon in document units.
///
/// Every width/height comparison in the solver goes through this value so that
/// floating-point noise never flips a fit decision.
pub const EPSILON: f32 = 1e-3;

/// An axis-aligned rectangle. Origin is the top-left corner of the page and
/// `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width in document units
    pub width: f32,
    /// Height in document units
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check that all coordinates are finite and the box is non-degenerate.
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Check if the interiors of two boxes overlap by more than [`EPSILON`].
    ///
    /// Boxes that merely touch along an edge do not intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        let overlap_x = self.right().min(other.right()) - self.x.max(other.x);
        let overlap_y = self.bottom().min(other.bottom()) - self.y.max(other.y);
        overlap_x > EPSILON && overlap_y > EPSILON
    }

    /// Same box with a different height, top-left corner unchanged.
    pub fn with_height(&self, height: f32) -> Self {
        Self { height, ..*self }
    }

    /// Same box with a different width, top-left corner unchanged.
    pub fn with_width(&self, width: f32) -> Self {
        Self { width, ..*self }
    }

    /// Check if this box differs from `other` by more than [`EPSILON`] on any edge.
    pub fn differs_from(&self, other: &BoundingBox) -> bool {
        (self.x - other.x).abs() > EPSILON
            || (self.y - other.y).abs() > EPSILON
            || (self.width - other.width).abs() > EPSILON
            || (self.height - other.height).abs() > EPSILON
    }
}
