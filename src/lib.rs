//! # relayout
//!
//! Layout reconciliation for translated documents.
//!
//! Given a document extracted with its geometry, a catalog of fonts, and
//! translated text for its runs, this library decides how every block keeps
//! its content readable: unchanged, with a smaller font, in a larger box, or
//! flagged as overflowing. Missing fonts are replaced with the closest
//! available substitute.
//!
//! ## Quick Start
//!
//! ```no_run
//! use relayout::{plan_file, render};
//!
//! fn main() -> relayout::Result<()> {
//!     // Plan a job file (document + fonts + translations + options)
//!     let plan = plan_file("job.json")?;
//!
//!     // Summarize it
//!     let stats = render::PlanStats::from_plan(&plan);
//!     println!("{}", stats);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Fit strategies**: unchanged, font shrink, box growth, overflow accept
//! - **Neighbor-aware growth**: enlarged boxes never cover other blocks
//! - **Font substitution**: scored by family, weight, style and metrics
//! - **Script-aware wrapping**: CJK and Thai break between graphemes
//! - **Parallel processing**: Uses Rayon for multi-page documents
//! - **Deterministic output**: identical JSON for identical inputs

pub mod error;
pub mod fonts;
pub mod job;
pub mod layout;
pub mod measure;
pub mod model;
pub mod render;
pub mod translation;

// Re-export commonly used types
pub use error::{Error, Result};
pub use fonts::{MetricsProvider, SubstitutionCache, SubstitutionResolver};
pub use job::Job;
pub use layout::{CancellationToken, Engine, GrowthPolicy, LayoutOptions, PageEvent};
pub use measure::{measure, measure_segments, Measurement, Segment};
pub use model::{
    AdjustmentPlan, Block, BlockKind, BoundingBox, ConflictReason, Document, Font, FontCatalog,
    FontId, FontMapping, FontMetrics, LayoutPlan, Page, PagePlan, Strategy, TextRun,
    UnresolvedConflict,
};
pub use render::{JsonFormat, PlanStats};
pub use translation::{ExpansionReport, Translations};

use std::path::Path;

/// Plan the layout of a translated document with default options.
///
/// # Arguments
///
/// * `document` - The extracted document
/// * `catalog` - Fonts referenced by the document
/// * `translations` - Translated text keyed by run id
///
/// # Example
///
/// ```no_run
/// use relayout::{reconcile, Document, FontCatalog, Translations};
///
/// let plan = reconcile(&Document::new(), &FontCatalog::new(), &Translations::new()).unwrap();
/// assert!(plan.is_fully_resolved());
/// ```
pub fn reconcile(
    document: &Document,
    catalog: &FontCatalog,
    translations: &Translations,
) -> Result<LayoutPlan> {
    reconcile_with_options(document, catalog, translations, LayoutOptions::default())
}

/// Plan the layout of a translated document with custom options.
///
/// # Example
///
/// ```no_run
/// use relayout::{reconcile_with_options, Document, FontCatalog, LayoutOptions, Translations};
///
/// let options = LayoutOptions::new().with_min_scale(0.75).sequential();
/// let plan = reconcile_with_options(
///     &Document::new(),
///     &FontCatalog::new(),
///     &Translations::new(),
///     options,
/// )
/// .unwrap();
/// ```
pub fn reconcile_with_options(
    document: &Document,
    catalog: &FontCatalog,
    translations: &Translations,
    options: LayoutOptions,
) -> Result<LayoutPlan> {
    Engine::new(options).run(document, catalog, translations)
}

/// Load a job file and plan it with the options it carries.
pub fn plan_file<P: AsRef<Path>>(path: P) -> Result<LayoutPlan> {
    Job::from_path(path)?.run()
}

/// Load a job file, plan it, and render the plan as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let plan = plan_file(path)?;
    render::to_json(&plan, format)
}

/// Builder for configuring a reconciliation.
///
/// # Example
///
/// ```no_run
/// use relayout::{BlockKind, Relayout};
///
/// let json = Relayout::new()
///     .with_min_scale(0.7)
///     .allow_growth(BlockKind::TableCell, true)
///     .with_font_override("ABCDEF+Garamond", "Times-Roman")
///     .sequential()
///     .plan_file("job.json")?
///     .to_json(relayout::JsonFormat::Pretty)?;
/// # Ok::<(), relayout::Error>(())
/// ```
pub struct Relayout {
    options: LayoutOptions,
    cancel: CancellationToken,
}

impl Relayout {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: LayoutOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace all options.
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the minimum font scale.
    pub fn with_min_scale(mut self, scale: f32) -> Self {
        self.options = self.options.with_min_scale(scale);
        self
    }

    /// Set the fit tolerance.
    pub fn with_fit_tolerance(mut self, tolerance: f32) -> Self {
        self.options = self.options.with_fit_tolerance(tolerance);
        self
    }

    /// Set the page margin.
    pub fn with_page_margin(mut self, margin: f32) -> Self {
        self.options = self.options.with_page_margin(margin);
        self
    }

    /// Allow or forbid growth for a block kind.
    pub fn allow_growth(mut self, kind: BlockKind, allowed: bool) -> Self {
        self.options = self.options.allow_growth(kind, allowed);
        self
    }

    /// Force a substitute for a missing font.
    pub fn with_font_override(
        mut self,
        missing: impl Into<FontId>,
        substitute: impl Into<FontId>,
    ) -> Self {
        self.options = self.options.with_font_override(missing, substitute);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Use a cancellation token shared with the caller.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    fn engine(&self) -> Engine {
        Engine::new(self.options.clone()).with_cancellation(self.cancel.clone())
    }

    /// Plan a document.
    pub fn plan(
        self,
        document: &Document,
        catalog: &FontCatalog,
        translations: &Translations,
    ) -> Result<RelayoutResult> {
        let plan = self.engine().run(document, catalog, translations)?;
        Ok(RelayoutResult { plan })
    }

    /// Plan a job file. The builder's options replace the file's.
    pub fn plan_file<P: AsRef<Path>>(self, path: P) -> Result<RelayoutResult> {
        let job = Job::from_path(path)?;
        let plan = job.run_with(&self.engine())?;
        Ok(RelayoutResult { plan })
    }
}

impl Default for Relayout {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a reconciliation.
pub struct RelayoutResult {
    /// The layout plan
    pub plan: LayoutPlan,
}

impl RelayoutResult {
    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.plan, format)
    }

    /// Summary statistics.
    pub fn stats(&self) -> PlanStats {
        PlanStats::from_plan(&self.plan)
    }

    /// Blocks left overflowing.
    pub fn conflicts(&self) -> &[UnresolvedConflict] {
        &self.plan.unresolved
    }

    /// Get the plan.
    pub fn plan(&self) -> &LayoutPlan {
        &self.plan
    }
}
