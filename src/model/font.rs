//! Font catalog types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fonts::names::FontDescriptor;

/// Identifier of a font in the catalog (e.g., "Helvetica-Bold").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontId(pub String);

impl FontId {
    /// Create a new font id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FontId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FontId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Slant of a font.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright
    #[default]
    Normal,
    /// True italic
    Italic,
    /// Slanted roman
    Oblique,
}

impl FontStyle {
    /// Check if the style is slanted (italic or oblique).
    pub fn is_slanted(&self) -> bool {
        !matches!(self, FontStyle::Normal)
    }
}

/// Licensing class of a font.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LicenseClass {
    /// May be embedded in the output document
    Embeddable,
    /// May only be used as a rendering substitute
    SubstituteOnly,
    /// License not known
    #[default]
    Unknown,
}

/// A font known to the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Font {
    /// Catalog key
    pub id: FontId,

    /// Family name (derived from the id when empty)
    #[serde(default)]
    pub family: String,

    /// Weight on the CSS scale (derived from the id when 0)
    #[serde(default)]
    pub weight: u16,

    /// Slant
    #[serde(default)]
    pub style: FontStyle,

    /// Whether the font can be used for rendering
    #[serde(default)]
    pub available: bool,

    /// Glyph and line metrics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<FontMetrics>,

    /// Licensing class
    #[serde(default)]
    pub license: LicenseClass,
}

impl Font {
    /// Create an available font; family, weight and style are parsed from the id.
    pub fn available(id: impl Into<FontId>, metrics: FontMetrics) -> Self {
        Self {
            metrics: Some(metrics),
            available: true,
            ..Self::missing(id)
        }
    }

    /// Create a font that is referenced by the document but not installed.
    pub fn missing(id: impl Into<FontId>) -> Self {
        let id = id.into();
        let descriptor = FontDescriptor::parse(id.as_str());
        Self {
            id,
            family: descriptor.family,
            weight: descriptor.weight,
            style: descriptor.style,
            available: false,
            metrics: None,
            license: LicenseClass::Unknown,
        }
    }

    /// Set the license class.
    pub fn with_license(mut self, license: LicenseClass) -> Self {
        self.license = license;
        self
    }

    /// Attach metrics to a missing font (used for ratio comparison only).
    pub fn with_metrics(mut self, metrics: FontMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Fill empty descriptor fields from the id.
    fn normalized(mut self) -> Self {
        let descriptor = FontDescriptor::parse(self.id.as_str());
        if self.family.trim().is_empty() {
            self.family = descriptor.family;
        }
        if self.weight == 0 {
            self.weight = descriptor.weight;
        }
        if self.style == FontStyle::Normal {
            self.style = descriptor.style;
        }
        self
    }

    /// Check if the font can render text: available and carrying metrics.
    pub fn is_usable(&self) -> bool {
        self.available && self.metrics.is_some()
    }
}

/// Glyph-width and line metrics for one font.
///
/// Values are in font units; `units_per_em` converts them to points at a
/// given size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontMetrics {
    /// Font units per em
    pub units_per_em: f32,

    /// Ascender height (positive)
    pub ascent: f32,

    /// Descender depth (positive)
    pub descent: f32,

    /// Extra spacing between lines
    #[serde(default)]
    pub line_gap: f32,

    /// Height of lowercase letters, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_height: Option<f32>,

    /// Advance used for glyphs missing from `advances`
    pub default_advance: f32,

    /// Per-glyph advance widths
    #[serde(default)]
    pub advances: BTreeMap<char, f32>,
}

impl FontMetrics {
    /// Create metrics with an empty advance table.
    pub fn new(
        units_per_em: f32,
        ascent: f32,
        descent: f32,
        line_gap: f32,
        default_advance: f32,
    ) -> Self {
        Self {
            units_per_em,
            ascent,
            descent,
            line_gap,
            x_height: None,
            default_advance,
            advances: BTreeMap::new(),
        }
    }

    /// Rough metrics for when no real font is known: 0.6 em glyphs and a
    /// 1.2 em line.
    pub fn estimated() -> Self {
        Self::new(1000.0, 800.0, 200.0, 200.0, 600.0)
    }

    /// Set the x-height.
    pub fn with_x_height(mut self, x_height: f32) -> Self {
        self.x_height = Some(x_height);
        self
    }

    /// Set one glyph advance.
    pub fn with_advance(mut self, ch: char, advance: f32) -> Self {
        self.advances.insert(ch, advance);
        self
    }

    /// Set many glyph advances.
    pub fn with_advances(mut self, advances: impl IntoIterator<Item = (char, f32)>) -> Self {
        self.advances.extend(advances);
        self
    }

    /// Whether these metrics can size text: a positive em, line height and
    /// default advance, with finite vertical values.
    pub fn is_valid(&self) -> bool {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        positive(self.units_per_em)
            && self.ascent.is_finite()
            && self.descent.is_finite()
            && self.line_gap.is_finite()
            && positive(self.ascent + self.descent + self.line_gap)
            && positive(self.default_advance)
    }

    fn scale(&self, size: f32) -> f32 {
        if self.units_per_em > 0.0 {
            size / self.units_per_em
        } else {
            0.0
        }
    }

    /// Advance of `ch` in points at `size`.
    pub fn advance(&self, ch: char, size: f32) -> f32 {
        self.advances
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance)
            * self.scale(size)
    }

    /// Advance of `ch` only when the glyph is in the table.
    pub fn mapped_advance(&self, ch: char, size: f32) -> Option<f32> {
        self.advances.get(&ch).map(|a| a * self.scale(size))
    }

    /// Width of a single-line string in points at `size`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.advance(c, size)).sum()
    }

    /// Baseline-to-baseline distance in points at `size`.
    pub fn line_height(&self, size: f32) -> f32 {
        (self.ascent + self.descent + self.line_gap) * self.scale(size)
    }

    /// x-height as a fraction of the em.
    pub fn x_height_ratio(&self) -> Option<f32> {
        match self.x_height {
            Some(x) if self.units_per_em > 0.0 => Some(x / self.units_per_em),
            _ => None,
        }
    }

    /// Ascent divided by descent.
    pub fn ascent_descent_ratio(&self) -> f32 {
        self.ascent / self.descent.max(1.0)
    }
}

/// The set of fonts known to a job, keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Font>", into = "Vec<Font>")]
pub struct FontCatalog {
    fonts: BTreeMap<FontId, Font>,
}

impl FontCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a font, replacing any font with the same id.
    pub fn insert(&mut self, font: Font) {
        let font = font.normalized();
        self.fonts.insert(font.id.clone(), font);
    }

    /// Add a font, builder style.
    pub fn with_font(mut self, font: Font) -> Self {
        self.insert(font);
        self
    }

    /// Get a font by id.
    pub fn get(&self, id: &FontId) -> Option<&Font> {
        self.fonts.get(id)
    }

    /// Check if the catalog knows the id (available or not).
    pub fn contains(&self, id: &FontId) -> bool {
        self.fonts.contains_key(id)
    }

    /// All fonts, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Font> {
        self.fonts.values()
    }

    /// Fonts that can render text, ordered by id.
    pub fn usable(&self) -> impl Iterator<Item = &Font> {
        self.fonts.values().filter(|f| f.is_usable())
    }

    /// Check if at least one font can render text.
    pub fn has_usable(&self) -> bool {
        self.usable().next().is_some()
    }

    /// Number of fonts in the catalog.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl From<Vec<Font>> for FontCatalog {
    fn from(fonts: Vec<Font>) -> Self {
        let mut catalog = Self::new();
        for font in fonts {
            catalog.insert(font);
        }
        catalog
    }
}

impl From<FontCatalog> for Vec<Font> {
    fn from(catalog: FontCatalog) -> Self {
        catalog.fonts.into_values().collect()
    }
}

/// Substitute chosen for a font that is not available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontMapping {
    /// The unavailable font
    pub missing: FontId,

    /// The font used in its place
    pub substitute: FontId,

    /// Match quality in [0, 1]
    pub confidence: f32,

    /// Whether confidence reaches the configured reliability cutoff
    pub reliable: bool,

    /// Human-readable explanation
    pub rationale: String,

    /// Distance components behind the choice
    pub score: ScoreBreakdown,
}

/// Weighted distance components of a substitution candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Family-name distance in [0, 1]
    pub family: f32,
    /// Weight distance in [0, 1]
    pub weight: f32,
    /// Style mismatch, 0 or 1
    pub style: f32,
    /// Metric-ratio distance in [0, 1]
    pub metrics: f32,
    /// Weighted sum
    pub total: f32,
}
