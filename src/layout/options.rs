//! Layout options and configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{BlockKind, FontId};

/// Options for reconciling a document's layout.
///
/// Every field has a default, so a configuration file only needs the values
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Smallest font-size multiplier the solver may use (0, 1]
    pub min_scale: f32,

    /// Extra height allowed before a block counts as overflowing, as a
    /// fraction of the box height
    pub fit_tolerance: f32,

    /// Distance from the page edge that growth may not cross
    pub page_margin: f32,

    /// Which block kinds may grow
    pub growth: GrowthPolicy,

    /// Confidence below which a substitution is flagged unreliable
    pub min_substitution_confidence: f32,

    /// Substitution distance above which the best candidate is forced
    /// unreliable
    pub max_substitution_distance: f32,

    /// Explicit substitutes, keyed by missing font id
    pub font_overrides: BTreeMap<FontId, FontId>,

    /// Whether pages are processed in parallel
    pub parallel: bool,

    /// Worker thread count (None = one per core)
    pub threads: Option<usize>,
}

impl LayoutOptions {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Set the minimum font scale.
    pub fn with_min_scale(mut self, scale: f32) -> Self {
        self.min_scale = scale;
        self
    }

    /// Set the fit tolerance.
    pub fn with_fit_tolerance(mut self, tolerance: f32) -> Self {
        self.fit_tolerance = tolerance;
        self
    }

    /// Set the page margin growth may not cross.
    pub fn with_page_margin(mut self, margin: f32) -> Self {
        self.page_margin = margin;
        self
    }

    /// Set the growth policy.
    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    /// Allow or forbid growth for one block kind.
    pub fn allow_growth(mut self, kind: BlockKind, allowed: bool) -> Self {
        self.growth.set(kind, allowed);
        self
    }

    /// Forbid growth for every block kind.
    pub fn without_growth(mut self) -> Self {
        self.growth = GrowthPolicy::none();
        self
    }

    /// Set the substitution reliability cutoff.
    pub fn with_min_confidence(mut self, confidence: f32) -> Self {
        self.min_substitution_confidence = confidence;
        self
    }

    /// Set the maximum acceptable substitution distance.
    pub fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_substitution_distance = distance;
        self
    }

    /// Force a substitute for a missing font.
    pub fn with_font_override(
        mut self,
        missing: impl Into<FontId>,
        substitute: impl Into<FontId>,
    ) -> Self {
        self.font_overrides.insert(missing.into(), substitute.into());
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the number of worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_scale > 0.0 && self.min_scale <= 1.0) {
            return Err(Error::InvalidOptions(format!(
                "min_scale must be in (0, 1], got {}",
                self.min_scale
            )));
        }
        if !(self.fit_tolerance >= 0.0 && self.fit_tolerance.is_finite()) {
            return Err(Error::InvalidOptions(format!(
                "fit_tolerance must be a non-negative number, got {}",
                self.fit_tolerance
            )));
        }
        if !(self.page_margin >= 0.0 && self.page_margin.is_finite()) {
            return Err(Error::InvalidOptions(format!(
                "page_margin must be a non-negative number, got {}",
                self.page_margin
            )));
        }
        if !(0.0..=1.0).contains(&self.min_substitution_confidence) {
            return Err(Error::InvalidOptions(format!(
                "min_substitution_confidence must be in [0, 1], got {}",
                self.min_substitution_confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.max_substitution_distance) {
            return Err(Error::InvalidOptions(format!(
                "max_substitution_distance must be in [0, 1], got {}",
                self.max_substitution_distance
            )));
        }
        if self.threads == Some(0) {
            return Err(Error::InvalidOptions("threads must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            min_scale: 0.6,
            fit_tolerance: 0.02,
            page_margin: 0.0,
            growth: GrowthPolicy::default(),
            min_substitution_confidence: 0.5,
            max_substitution_distance: 0.5,
            font_overrides: BTreeMap::new(),
            parallel: true,
            threads: None,
        }
    }
}

/// Growth permission per block kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GrowthPolicy {
    pub heading: bool,
    pub paragraph: bool,
    pub list_item: bool,
    pub table_cell: bool,
    pub caption: bool,
}

impl GrowthPolicy {
    /// Every kind may grow.
    pub fn all() -> Self {
        Self {
            heading: true,
            paragraph: true,
            list_item: true,
            table_cell: true,
            caption: true,
        }
    }

    /// No kind may grow.
    pub fn none() -> Self {
        Self {
            heading: false,
            paragraph: false,
            list_item: false,
            table_cell: false,
            caption: false,
        }
    }

    /// Check if a block kind may grow.
    pub fn allows(&self, kind: BlockKind) -> bool {
        match kind {
            BlockKind::Heading => self.heading,
            BlockKind::Paragraph => self.paragraph,
            BlockKind::ListItem => self.list_item,
            BlockKind::TableCell => self.table_cell,
            BlockKind::Caption => self.caption,
        }
    }

    /// Allow or forbid growth for a block kind.
    pub fn set(&mut self, kind: BlockKind, allowed: bool) {
        let slot = match kind {
            BlockKind::Heading => &mut self.heading,
            BlockKind::Paragraph => &mut self.paragraph,
            BlockKind::ListItem => &mut self.list_item,
            BlockKind::TableCell => &mut self.table_cell,
            BlockKind::Caption => &mut self.caption,
        };
        *slot = allowed;
    }
}

impl Default for GrowthPolicy {
    /// Table cells keep their grid; everything else may grow.
    fn default() -> Self {
        Self {
            table_cell: false,
            ..Self::all()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_options_builder() {
        let options = LayoutOptions::new()
            .with_min_scale(0.7)
            .with_page_margin(36.0)
            .allow_growth(BlockKind::TableCell, true)
            .with_font_override("Arial-Bold", "Helvetica-Bold")
            .sequential();

        assert_eq!(options.min_scale, 0.7);
        assert_eq!(options.page_margin, 36.0);
        assert!(options.growth.allows(BlockKind::TableCell));
        assert_eq!(options.font_overrides.len(), 1);
        assert!(!options.parallel);
    }

    #[test]
    fn test_default_options() {
        let options = LayoutOptions::default();
        assert_eq!(options.min_scale, 0.6);
        assert_eq!(options.fit_tolerance, 0.02);
        assert!(options.parallel);
        assert!(options.growth.allows(BlockKind::Paragraph));
        assert!(!options.growth.allows(BlockKind::TableCell));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let options =
            LayoutOptions::from_json_str(r#"{"min_scale": 0.8, "growth": {"heading": false}}"#)
                .unwrap();
        assert_eq!(options.min_scale, 0.8);
        assert!(!options.growth.allows(BlockKind::Heading));
        // Unnamed kinds keep their defaults.
        assert!(options.growth.allows(BlockKind::Paragraph));
        assert!(!options.growth.allows(BlockKind::TableCell));
        assert_eq!(options.fit_tolerance, 0.02);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(LayoutOptions::new().with_min_scale(0.0).validate().is_err());
        assert!(LayoutOptions::new().with_min_scale(1.5).validate().is_err());
        assert!(LayoutOptions::new()
            .with_fit_tolerance(-0.1)
            .validate()
            .is_err());
        assert!(LayoutOptions::new().with_threads(0).validate().is_err());
        assert!(matches!(
            LayoutOptions::from_json_str(r#"{"min_scale": 2.0}"#),
            Err(Error::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(&path, r#"{"parallel": false, "threads": 2}"#).unwrap();
        let options = LayoutOptions::from_path(&path).unwrap();
        assert!(!options.parallel);
        assert_eq!(options.threads, Some(2));
    }
}
