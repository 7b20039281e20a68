//! Document-level reconciliation.
//!
//! Pages are independent and may be planned in parallel. Within a page,
//! blocks are visited top to bottom, then left to right, and each block's
//! growth is limited by the blocks around it: later blocks at their original
//! position, earlier blocks at their final one. A block is never revisited
//! once planned.

use rayon::prelude::*;

use crossbeam_channel::Sender;

use crate::error::{Error, Result};
use crate::fonts::{MetricsProvider, SubstitutionCache, SubstitutionResolver};
use crate::measure::{PreparedText, Segment};
use crate::model::{
    Block, BoundingBox, Document, FontCatalog, LayoutPlan, Page, PagePlan, UnresolvedConflict,
    EPSILON,
};
use crate::translation::Translations;

use super::fit::{FitOutcome, FitSolver, GrowthLimit};
use super::progress::{PageEvent, Progress};
use super::validate::validate;
use super::{CancellationToken, LayoutOptions};

/// Plans the layout of translated documents.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: LayoutOptions,
    cancel: CancellationToken,
    progress: Progress,
}

/// State shared by every page of one job.
struct JobContext<'a> {
    catalog: &'a FontCatalog,
    translations: &'a Translations,
    cache: &'a SubstitutionCache,
    solver: FitSolver,
}

struct PageOutcome {
    plan: PagePlan,
    unresolved: Vec<UnresolvedConflict>,
}

impl Engine {
    /// Create an engine with the given options.
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Use an existing cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Send per-page progress events to `sender`.
    pub fn with_progress(mut self, sender: Sender<PageEvent>) -> Self {
        self.progress = Progress::new(Some(sender));
        self
    }

    /// Token that cancels this engine's jobs.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The options in use.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Plan the layout of `document` with `translations` applied.
    ///
    /// Inputs are validated before any page is processed. If the job is
    /// cancelled, completed pages are returned and the plan is marked
    /// cancelled.
    pub fn run(
        &self,
        document: &Document,
        catalog: &FontCatalog,
        translations: &Translations,
    ) -> Result<LayoutPlan> {
        self.options.validate()?;
        validate(document, catalog, translations)?;

        log::info!(
            "Reconciling {} pages ({} blocks)",
            document.page_count(),
            document.block_count()
        );

        let resolver = SubstitutionResolver::new(
            self.options.max_substitution_distance,
            self.options.min_substitution_confidence,
        )
        .with_overrides(self.options.font_overrides.clone());
        let cache = SubstitutionCache::new(resolver);
        let ctx = JobContext {
            catalog,
            translations,
            cache: &cache,
            solver: FitSolver::from_options(&self.options),
        };

        let outcomes = self.plan_pages(&document.pages, &ctx)?;

        let mut plan = LayoutPlan::default();
        for outcome in outcomes {
            match outcome? {
                Some(page) => {
                    plan.pages.push(page.plan);
                    plan.unresolved.extend(page.unresolved);
                }
                None => plan.cancelled = true,
            }
        }
        plan.font_mappings = cache.mappings();

        if plan.cancelled {
            log::info!(
                "Cancelled after {} of {} pages",
                plan.pages.len(),
                document.page_count()
            );
        } else {
            log::info!(
                "Planned {} pages, {} unresolved conflicts, {} substitutions",
                plan.pages.len(),
                plan.unresolved.len(),
                plan.font_mappings.len()
            );
        }

        Ok(plan)
    }

    fn plan_pages(
        &self,
        pages: &[Page],
        ctx: &JobContext<'_>,
    ) -> Result<Vec<Result<Option<PageOutcome>>>> {
        if !self.options.parallel {
            return Ok(pages.iter().map(|p| self.plan_page(p, ctx)).collect());
        }

        let run = || {
            pages
                .par_iter()
                .map(|p| self.plan_page(p, ctx))
                .collect::<Vec<_>>()
        };

        match self.options.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| Error::InvalidOptions(format!("thread pool: {}", e)))?;
                Ok(pool.install(run))
            }
            None => Ok(run()),
        }
    }

    /// Plan one page, or return `None` if cancelled before it completed.
    fn plan_page(&self, page: &Page, ctx: &JobContext<'_>) -> Result<Option<PageOutcome>> {
        if self.cancel.is_cancelled() {
            self.progress.emit(PageEvent::Skipped { page: page.number });
            return Ok(None);
        }
        self.progress.emit(PageEvent::Started { page: page.number });

        let mut order: Vec<&Block> = page.blocks.iter().collect();
        order.sort_by(|a, b| {
            a.bbox
                .y
                .total_cmp(&b.bbox.y)
                .then(a.bbox.x.total_cmp(&b.bbox.x))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut finals: Vec<BoundingBox> = Vec::with_capacity(order.len());
        let mut plans = Vec::with_capacity(order.len());
        let mut unresolved = Vec::new();

        for (index, block) in order.iter().enumerate() {
            if self.cancel.is_cancelled() {
                self.progress.emit(PageEvent::Skipped { page: page.number });
                return Ok(None);
            }

            let (text, needs_fitting) = self.prepare(block, ctx)?;
            let outcome = if !needs_fitting {
                FitOutcome {
                    plan: ctx.solver.unchanged(block, &text),
                    conflict: None,
                }
            } else if self.options.growth.allows(block.kind) {
                self.fit_among_neighbors(page, &order, &finals, index, &text, ctx)
            } else {
                ctx.solver.solve(block, &text, None)
            };

            if let Some(reason) = outcome.conflict {
                log::warn!(
                    "Page {} block {}: unresolved overflow of {:.1} ({})",
                    page.number,
                    block.id,
                    outcome.plan.overflow,
                    reason
                );
                unresolved.push(UnresolvedConflict {
                    page: page.number,
                    block_id: block.id.clone(),
                    reason,
                    overflow: outcome.plan.overflow,
                });
            }
            finals.push(outcome.plan.bbox);
            plans.push(outcome.plan);
        }

        self.progress.emit(PageEvent::Finished {
            page: page.number,
            blocks: plans.len(),
            unresolved: unresolved.len(),
        });

        Ok(Some(PageOutcome {
            plan: PagePlan {
                number: page.number,
                width: page.width,
                height: page.height,
                blocks: plans,
            },
            unresolved,
        }))
    }

    /// Solve with growth, clamping against every block the grown box would
    /// newly overlap, until the result overlaps nothing new.
    fn fit_among_neighbors(
        &self,
        page: &Page,
        order: &[&Block],
        finals: &[BoundingBox],
        index: usize,
        text: &PreparedText,
        ctx: &JobContext<'_>,
    ) -> FitOutcome {
        let block = order[index];
        let mut limit = GrowthLimit::page(page, self.options.page_margin, &block.bbox);

        loop {
            let outcome = ctx.solver.solve(block, text, Some(&limit));
            let grown = outcome.plan.bbox;
            if !grown.differs_from(&block.bbox) {
                return outcome;
            }

            let mut clamped = false;
            for (other_index, other) in order.iter().enumerate() {
                if other_index == index {
                    continue;
                }
                let obstacle = finals.get(other_index).copied().unwrap_or(other.bbox);
                // Overlaps present in the source layout are not ours to fix.
                if !grown.intersects(&obstacle) || block.bbox.intersects(&obstacle) {
                    continue;
                }
                clamped |= if obstacle.y >= block.bbox.bottom() - EPSILON {
                    limit.clamp_bottom(obstacle.y, &other.id, &block.bbox)
                } else {
                    limit.clamp_right(obstacle.x, &other.id, &block.bbox)
                };
            }

            if !clamped {
                return outcome;
            }
            log::debug!(
                "Block {}: growth clamped to bottom {:.1}, right {:.1}",
                block.id,
                limit.max_bottom,
                limit.max_right
            );
        }
    }

    /// Build the block's text with translations and substitutes applied.
    ///
    /// The flag is false when nothing differs from the source, in which case
    /// the block keeps its original layout.
    fn prepare(&self, block: &Block, ctx: &JobContext<'_>) -> Result<(PreparedText, bool)> {
        let mut needs_fitting = false;
        let mut segments = Vec::with_capacity(block.runs.len());

        for run in &block.runs {
            let text = ctx.translations.text_for(run);
            needs_fitting |= text != run.text;

            let metrics = match ctx.catalog.get(&run.font) {
                Some(font) if font.is_usable() => ctx.catalog.metrics(&run.font)?,
                _ => {
                    needs_fitting = true;
                    let mapping = ctx.cache.get_or_resolve(&run.font, ctx.catalog)?;
                    ctx.catalog.metrics(&mapping.substitute)?
                }
            };
            segments.push(Segment::new(text, metrics, run.font_size));
        }

        Ok((PreparedText::new(&segments), needs_fitting))
    }
}
