//! Substitution of unavailable fonts.
//!
//! Every usable font in the catalog is scored against the missing font by a
//! weighted distance; the closest one wins. A substitute is always produced
//! when the catalog has at least one usable font, because unrendered text is
//! worse than an imperfect match. Low-quality matches are flagged through the
//! mapping's confidence instead.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use super::names::{family_distance, family_key, COMPATIBLE_FAMILY_DISTANCE};
use crate::error::{Error, Result};
use crate::model::{Font, FontCatalog, FontId, FontMapping, ScoreBreakdown};

const FAMILY_WEIGHT: f32 = 0.5;
const WEIGHT_WEIGHT: f32 = 0.2;
const STYLE_WEIGHT: f32 = 0.15;
const METRICS_WEIGHT: f32 = 0.15;

/// Distances closer than this are ties.
const TIE_EPSILON: f32 = 1e-6;

/// Scores candidates and picks a substitute for one missing font.
#[derive(Debug, Clone)]
pub struct SubstitutionResolver {
    max_distance: f32,
    min_confidence: f32,
    overrides: BTreeMap<FontId, FontId>,
}

impl SubstitutionResolver {
    /// Create a resolver.
    ///
    /// * `max_distance` - best distances above this are unreliable
    /// * `min_confidence` - confidence cutoff for a reliable mapping
    pub fn new(max_distance: f32, min_confidence: f32) -> Self {
        Self {
            max_distance,
            min_confidence,
            overrides: BTreeMap::new(),
        }
    }

    /// Use caller-chosen substitutes for some fonts.
    pub fn with_overrides(mut self, overrides: BTreeMap<FontId, FontId>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Pick a substitute for `missing` among the catalog's usable fonts.
    ///
    /// Fails only when the catalog has no usable font at all.
    pub fn resolve(&self, missing: &FontId, catalog: &FontCatalog) -> Result<FontMapping> {
        let target = catalog
            .get(missing)
            .cloned()
            .unwrap_or_else(|| Font::missing(missing.clone()));

        if let Some(mapping) = self.resolve_override(&target, catalog) {
            return Ok(mapping);
        }

        let best = catalog
            .usable()
            .map(|candidate| Candidate::score(&target, candidate))
            .min_by(Candidate::compare)
            .ok_or_else(|| Error::FontNotFound(missing.to_string()))?;

        let mut confidence = (1.0 - best.score.total).clamp(0.0, 1.0);
        if best.score.total > self.max_distance {
            confidence = confidence.min(self.min_confidence / 2.0);
        }
        let reliable = confidence >= self.min_confidence;

        let mut rationale = describe(&best.score, &target, best.font);
        if !reliable {
            rationale.push_str("; below reliability cutoff");
            log::warn!(
                "Unreliable substitute for {}: {} (confidence {:.2})",
                missing,
                best.font.id,
                confidence
            );
        } else {
            log::debug!(
                "Substitute for {}: {} (confidence {:.2})",
                missing,
                best.font.id,
                confidence
            );
        }

        Ok(FontMapping {
            missing: missing.clone(),
            substitute: best.font.id.clone(),
            confidence,
            reliable,
            rationale,
            score: best.score,
        })
    }

    fn resolve_override(&self, target: &Font, catalog: &FontCatalog) -> Option<FontMapping> {
        let substitute_id = self.overrides.get(&target.id)?;
        match catalog.get(substitute_id).filter(|f| f.is_usable()) {
            Some(substitute) => Some(FontMapping {
                missing: target.id.clone(),
                substitute: substitute.id.clone(),
                confidence: 1.0,
                reliable: true,
                rationale: "explicit override".to_string(),
                score: Candidate::score(target, substitute).score,
            }),
            None => {
                log::warn!(
                    "Override {} -> {} ignored: substitute is not usable",
                    target.id,
                    substitute_id
                );
                None
            }
        }
    }
}

/// A scored substitution candidate.
struct Candidate<'a> {
    font: &'a Font,
    score: ScoreBreakdown,
    same_family: bool,
}

impl<'a> Candidate<'a> {
    fn score(target: &Font, font: &'a Font) -> Self {
        let family = family_distance(&target.family, &font.family);
        let weight = (f32::from(target.weight.abs_diff(font.weight)) / 800.0).min(1.0);
        let style = if target.style.is_slanted() == font.style.is_slanted() {
            0.0
        } else {
            1.0
        };
        let metrics = metrics_distance(target, font);
        let total = FAMILY_WEIGHT * family
            + WEIGHT_WEIGHT * weight
            + STYLE_WEIGHT * style
            + METRICS_WEIGHT * metrics;

        Self {
            font,
            score: ScoreBreakdown {
                family,
                weight,
                style,
                metrics,
                total,
            },
            same_family: family_key(&target.family) == family_key(&font.family),
        }
    }

    /// Lower distance first, then same family, then font id.
    fn compare(a: &Self, b: &Self) -> Ordering {
        if (a.score.total - b.score.total).abs() > TIE_EPSILON {
            return a.score.total.total_cmp(&b.score.total);
        }
        b.same_family
            .cmp(&a.same_family)
            .then_with(|| a.font.id.cmp(&b.font.id))
    }
}

/// Difference of x-height and ascent/descent ratios, clamped to [0, 1].
///
/// Zero when the missing font carries no metrics to compare against.
fn metrics_distance(target: &Font, candidate: &Font) -> f32 {
    let (Some(tm), Some(cm)) = (&target.metrics, &candidate.metrics) else {
        return 0.0;
    };
    let x_height = match (tm.x_height_ratio(), cm.x_height_ratio()) {
        (Some(a), Some(b)) => (a - b).abs(),
        _ => 0.0,
    };
    let (ra, rb) = (tm.ascent_descent_ratio(), cm.ascent_descent_ratio());
    let ratio = if ra.max(rb) > 0.0 {
        (ra - rb).abs() / ra.max(rb)
    } else {
        0.0
    };
    (x_height + ratio).min(1.0)
}

fn describe(score: &ScoreBreakdown, target: &Font, substitute: &Font) -> String {
    let family = if score.family == 0.0 {
        "same family".to_string()
    } else if score.family <= COMPATIBLE_FAMILY_DISTANCE {
        format!("metric-compatible family {}", substitute.family)
    } else {
        format!("different family {}", substitute.family)
    };
    let weight = if target.weight == substitute.weight {
        "same weight".to_string()
    } else {
        format!("weight {} instead of {}", substitute.weight, target.weight)
    };
    let style = if score.style == 0.0 {
        "same style"
    } else {
        "style differs"
    };
    format!(
        "{}, {}, {} (distance {:.3})",
        family, weight, style, score.total
    )
}

type Slot = Arc<OnceLock<Option<FontMapping>>>;

/// Per-job memo of substitutions with single-flight computation.
///
/// The first caller for a missing font computes the mapping; concurrent
/// callers for the same font block on the same slot and reuse the result.
#[derive(Debug)]
pub struct SubstitutionCache {
    resolver: SubstitutionResolver,
    slots: Mutex<HashMap<FontId, Slot>>,
    computations: AtomicUsize,
}

impl SubstitutionCache {
    /// Create an empty cache around a resolver.
    pub fn new(resolver: SubstitutionResolver) -> Self {
        Self {
            resolver,
            slots: Mutex::new(HashMap::new()),
            computations: AtomicUsize::new(0),
        }
    }

    /// Get the mapping for `missing`, computing it at most once per job.
    pub fn get_or_resolve(&self, missing: &FontId, catalog: &FontCatalog) -> Result<FontMapping> {
        let slot = {
            let mut slots = self.slots.lock();
            slots.entry(missing.clone()).or_default().clone()
        };
        let mapping = slot.get_or_init(|| {
            self.computations.fetch_add(1, AtomicOrdering::SeqCst);
            match self.resolver.resolve(missing, catalog) {
                Ok(mapping) => Some(mapping),
                Err(e) => {
                    log::warn!("No substitute for {}: {}", missing, e);
                    None
                }
            }
        });
        mapping
            .clone()
            .ok_or_else(|| Error::FontNotFound(missing.to_string()))
    }

    /// Number of mappings actually computed (not served from the cache).
    pub fn computations(&self) -> usize {
        self.computations.load(AtomicOrdering::SeqCst)
    }

    /// Every resolved mapping, ordered by missing font id.
    pub fn mappings(&self) -> Vec<FontMapping> {
        let slots = self.slots.lock();
        let mut mappings: Vec<FontMapping> = slots
            .values()
            .filter_map(|slot| slot.get().cloned().flatten())
            .collect();
        mappings.sort_by(|a, b| a.missing.cmp(&b.missing));
        mappings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FontMetrics;

    fn catalog() -> FontCatalog {
        FontCatalog::new()
            .with_font(Font::available("Helvetica", FontMetrics::estimated()))
            .with_font(Font::available("Helvetica-Bold", FontMetrics::estimated()))
            .with_font(Font::available("Times-Roman", FontMetrics::estimated()))
            .with_font(Font::available("Courier", FontMetrics::estimated()))
            .with_font(Font::missing("Arial-Bold"))
    }

    fn resolver() -> SubstitutionResolver {
        SubstitutionResolver::new(0.5, 0.5)
    }

    #[test]
    fn test_compatible_family_same_weight() {
        let mapping = resolver()
            .resolve(&FontId::from("Arial-Bold"), &catalog())
            .unwrap();
        assert_eq!(mapping.substitute, FontId::from("Helvetica-Bold"));
        assert!(mapping.reliable);
        assert!(mapping.confidence > 0.9);
        assert!(mapping.score.family <= COMPATIBLE_FAMILY_DISTANCE);
    }

    #[test]
    fn test_same_family_wins_tie() {
        // Compatible family at equal weight scores the same as the same
        // family one weight step away.
        let catalog = FontCatalog::new()
            .with_font(Font::available("Arial-Bold", FontMetrics::estimated()))
            .with_font(Font::available("Helvetica-SemiBold", FontMetrics::estimated()));
        let mapping = resolver()
            .resolve(&FontId::from("Helvetica-Bold"), &catalog)
            .unwrap();
        assert_eq!(mapping.substitute, FontId::from("Helvetica-SemiBold"));
    }

    #[test]
    fn test_lexicographic_tie_break() {
        let catalog = FontCatalog::new()
            .with_font(Font::available("Zeta", FontMetrics::estimated()))
            .with_font(Font::available("Alpha", FontMetrics::estimated()));
        let mapping = resolver()
            .resolve(&FontId::from("Qqqq"), &catalog)
            .unwrap();
        assert_eq!(mapping.substitute, FontId::from("Alpha"));
    }

    #[test]
    fn test_unreliable_match_still_returned() {
        let catalog =
            FontCatalog::new().with_font(Font::available("Wingdings", FontMetrics::estimated()));
        let mapping = resolver()
            .resolve(&FontId::from("Garamond-Italic"), &catalog)
            .unwrap();
        assert_eq!(mapping.substitute, FontId::from("Wingdings"));
        assert!(!mapping.reliable);
        assert!(mapping.confidence < 0.5);
        assert!(mapping.rationale.contains("below reliability cutoff"));
    }

    #[test]
    fn test_override() {
        let overrides = BTreeMap::from([(FontId::from("Arial-Bold"), FontId::from("Courier"))]);
        let mapping = resolver()
            .with_overrides(overrides)
            .resolve(&FontId::from("Arial-Bold"), &catalog())
            .unwrap();
        assert_eq!(mapping.substitute, FontId::from("Courier"));
        assert_eq!(mapping.confidence, 1.0);
        assert_eq!(mapping.rationale, "explicit override");
    }

    #[test]
    fn test_empty_catalog_fails() {
        let result = resolver().resolve(&FontId::from("Arial"), &FontCatalog::new());
        assert!(matches!(result, Err(Error::FontNotFound(_))));
    }

    #[test]
    fn test_cache_computes_once() {
        let cache = SubstitutionCache::new(resolver());
        let catalog = catalog();
        let id = FontId::from("Arial-Bold");
        let first = cache.get_or_resolve(&id, &catalog).unwrap();
        let second = cache.get_or_resolve(&id, &catalog).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.computations(), 1);
        assert_eq!(cache.mappings().len(), 1);
    }
}
